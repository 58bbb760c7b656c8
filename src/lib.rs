//! A journal that reads your mood.
//!
//! Entries are stored in SQLite. Each entry is sent to a chat model with a
//! prompt that embeds the JSON schema of [`journal::types::Analysis`]; the
//! reply is decoded into a sentiment score, mood, summary, subject, negativity
//! flag and color. Questions about past entries are answered by embedding the
//! entries into a throwaway in-memory index, retrieving the closest ones and
//! refining an answer over them one entry at a time.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema and migrations
//! - [`journal`] — Entry and analysis records, persistence and sentiment history
//! - [`ai`] — Prompt building, output parsing, model/embedding clients, analysis and Q&A
//! - [`server`] — JSON HTTP API
//! - [`form`] — Headless question form with loading state

pub mod ai;
pub mod config;
pub mod db;
pub mod form;
pub mod journal;
pub mod server;
