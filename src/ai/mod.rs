//! Model-facing side of the journal: entry analysis and question answering.
//!
//! [`Assistant`] bundles a [`LlmClient`] and an [`EmbeddingProvider`] and is
//! what the server and CLI hold. Both backends are traits so tests can swap
//! in deterministic fakes.

pub mod analyze;
pub mod embedding;
pub mod http;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod qa;
pub mod vector_store;

use std::sync::Arc;

use anyhow::Result;

use crate::config::MoodJournalConfig;
use crate::journal::types::{Analysis, JournalEntry};
use analyze::AnalysisError;
use embedding::EmbeddingProvider;
use llm::{LlmClient, OpenAiChatClient};
use qa::QaError;

#[derive(Clone)]
pub struct Assistant {
    llm: Arc<dyn LlmClient>,
    embeddings: Arc<dyn EmbeddingProvider>,
    max_results: usize,
}

impl Assistant {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embeddings: Arc<dyn EmbeddingProvider>,
        max_results: usize,
    ) -> Self {
        Self {
            llm,
            embeddings,
            max_results,
        }
    }

    /// Build the OpenAI-backed assistant described by `config`.
    pub fn from_config(config: &MoodJournalConfig) -> Result<Self> {
        if config.llm.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; model calls will fail");
        }
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiChatClient::new(&config.llm)?);
        let embeddings: Arc<dyn EmbeddingProvider> =
            Arc::from(embedding::create_provider(config)?);
        tracing::info!(model = %config.llm.model, embedding_model = %config.embedding.model, "assistant ready");
        Ok(Self::new(llm, embeddings, config.retrieval.max_results))
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub async fn analyze(&self, content: &str) -> Result<Analysis, AnalysisError> {
        analyze::analyze(self.llm.as_ref(), content).await
    }

    pub async fn qa(&self, question: &str, entries: &[JournalEntry]) -> Result<String, QaError> {
        qa::qa(
            self.llm.as_ref(),
            Arc::clone(&self.embeddings),
            question,
            entries,
            self.max_results,
        )
        .await
    }
}
