use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MoodJournalConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Chat-completion provider settings. Decoding temperature is fixed at 0 and
/// is not configurable.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    /// Usually supplied through `OPENAI_API_KEY` rather than the file.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of entries handed to the refine chain per question.
    pub max_results: usize,
}

impl Default for MoodJournalConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_data_dir()
            .join("journal.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".into(),
            api_key: None,
            model: "gpt-3.5-turbo".into(),
            timeout_secs: 60,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "text-embedding-ada-002".into(),
            batch_size: 512,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { max_results: 4 }
    }
}

/// Returns `~/.mood-journal/`, or `./.mood-journal/` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mood-journal")
}

/// Returns the default config file path: `~/.mood-journal/config.toml`
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

impl MoodJournalConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MoodJournalConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (OPENAI_API_KEY, OPENAI_API_BASE,
    /// MOOD_JOURNAL_DB, MOOD_JOURNAL_MODEL, MOOD_JOURNAL_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("OPENAI_API_BASE") {
            self.llm.api_base = val;
        }
        if let Ok(val) = std::env::var("MOOD_JOURNAL_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("MOOD_JOURNAL_MODEL") {
            self.llm.model = val;
        }
        if let Ok(val) = std::env::var("MOOD_JOURNAL_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MoodJournalConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(config.retrieval.max_results, 4);
        assert!(config.storage.db_path.ends_with("journal.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 8080

[storage]
db_path = "/tmp/journal-test.db"

[llm]
model = "gpt-4o-mini"
timeout_secs = 5

[retrieval]
max_results = 2
"#;
        let config: MoodJournalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.db_path, "/tmp/journal-test.db");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 5);
        assert_eq!(config.retrieval.max_results, 2);
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.api_base, "https://api.openai.com/v1");
        assert_eq!(config.embedding.batch_size, 512);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = MoodJournalConfig::default();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("MOOD_JOURNAL_DB", "/tmp/override.db");
        std::env::set_var("MOOD_JOURNAL_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");

        // Clean up
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("MOOD_JOURNAL_DB");
        std::env::remove_var("MOOD_JOURNAL_LOG_LEVEL");
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = MoodJournalConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }
}
