pub mod history;
pub mod store;
pub mod types;
