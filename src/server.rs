//! HTTP API.
//!
//! Exposes journal entries, their analyses and the ask-question endpoint as a
//! JSON API over axum. Successful responses wrap their payload in
//! `{"data": ...}`; failures are `{"error": "..."}`.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::ai::Assistant;
use crate::config::MoodJournalConfig;
use crate::db;
use crate::journal::history::{self, SentimentHistory};
use crate::journal::store;
use crate::journal::types::{EntryWithAnalysis, JournalEntry};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    assistant: Assistant,
}

impl AppState {
    pub fn new(db: Arc<Mutex<Connection>>, assistant: Assistant) -> Self {
        Self { db, assistant }
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            f(&*conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("db task failed: {e}")))?
        .map_err(ApiError::from)
    }

    /// Analyse an entry and store the result. Analysis failure leaves the
    /// entry without an analysis rather than failing the request, and drops
    /// any analysis of earlier content.
    async fn analyze_and_store(&self, entry: JournalEntry) -> Result<EntryWithAnalysis, ApiError> {
        let entry_id = entry.id.clone();
        match self.assistant.analyze(&entry.content).await {
            Ok(analysis) => {
                let stored = analysis.clone();
                let model = self.assistant.model().to_string();
                self.with_db(move |conn| {
                    store::upsert_analysis(conn, &entry_id, &stored, Some(model.as_str()))
                })
                .await?;
                Ok(EntryWithAnalysis { entry, analysis: Some(analysis) })
            }
            Err(e) => {
                tracing::warn!(id = %entry.id, error = %e, "entry stored without analysis");
                let cleared = self
                    .with_db(move |conn| store::delete_analysis(conn, &entry_id))
                    .await?;
                if cleared {
                    tracing::debug!(id = %entry.id, "stale analysis removed");
                }
                Ok(EntryWithAnalysis { entry, analysis: None })
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ContentBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionBody {
    pub question: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Upstream(String),
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(format!("{e:#}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m),
            ApiError::Internal(m) => {
                tracing::error!(error = %m, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/journal", post(create_entry).get(list_entries))
        .route(
            "/api/journal/{id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
        .route("/api/question", post(ask_question))
        .route("/api/history", get(get_history))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn create_entry(
    State(state): State<AppState>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<EntryWithAnalysis>>), ApiError> {
    let Json(body) = body?;
    if body.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be empty".into()));
    }
    tracing::info!(content_len = body.content.len(), "create entry");

    let content = body.content;
    let entry = state
        .with_db(move |conn| store::create_entry(conn, &content))
        .await?;
    let item = state.analyze_and_store(entry).await?;

    Ok((StatusCode::CREATED, Json(Data { data: item })))
}

async fn list_entries(
    State(state): State<AppState>,
) -> Result<Json<Data<Vec<EntryWithAnalysis>>>, ApiError> {
    let items = state.with_db(store::list_entries_with_analysis).await?;
    Ok(Json(Data { data: items }))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Data<EntryWithAnalysis>>, ApiError> {
    let lookup = id.clone();
    let item = state
        .with_db(move |conn| store::get_entry_with_analysis(conn, &lookup))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;
    Ok(Json(Data { data: item }))
}

async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> Result<Json<Data<EntryWithAnalysis>>, ApiError> {
    let Json(body) = body?;
    if body.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be empty".into()));
    }
    tracing::info!(id = %id, content_len = body.content.len(), "update entry");

    let lookup = id.clone();
    let content = body.content;
    let entry = state
        .with_db(move |conn| store::update_entry(conn, &lookup, &content))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;
    let item = state.analyze_and_store(entry).await?;

    Ok(Json(Data { data: item }))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let lookup = id.clone();
    let deleted = state
        .with_db(move |conn| store::delete_entry(conn, &lookup))
        .await?;
    if deleted {
        tracing::info!(id = %id, "entry deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("entry {id} not found")))
    }
}

async fn ask_question(
    State(state): State<AppState>,
    body: Result<Json<QuestionBody>, JsonRejection>,
) -> Result<Json<Data<String>>, ApiError> {
    let Json(body) = body?;
    tracing::info!(question_len = body.question.len(), "ask question");

    let entries = state.with_db(store::list_entries).await?;
    let answer = state
        .assistant
        .qa(&body.question, &entries)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(Data { data: answer }))
}

async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<Data<SentimentHistory>>, ApiError> {
    let history = state.with_db(history::sentiment_history).await?;
    Ok(Json(Data { data: history }))
}

/// Open the database, build the assistant and serve the API until ctrl-c.
pub async fn serve(config: MoodJournalConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let assistant = Assistant::from_config(&config)?;
    let state = AppState::new(Arc::new(Mutex::new(conn)), assistant);
    let app = router(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "journal API listening at http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
