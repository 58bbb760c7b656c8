//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and an OpenAI-compatible remote
//! implementation. The provider is created via [`create_provider`] from
//! configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http::{build_http_client, endpoint, post_json, ProviderError};
use crate::config::MoodJournalConfig;

/// Trait for embedding text into vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of documents. Returns one vector per input, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.embed_documents(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("empty embedding response".into()))
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"openai"` is supported.
pub fn create_provider(config: &MoodJournalConfig) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match config.embedding.provider.as_str() {
        "openai" => {
            let provider = OpenAiEmbeddings::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: openai"),
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Remote embeddings via an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    batch_size: usize,
}

impl OpenAiEmbeddings {
    pub fn new(config: &MoodJournalConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(config.llm.timeout_secs)?,
            url: endpoint(&config.llm.api_base, "embeddings"),
            api_key: config.llm.api_key.clone(),
            model: config.embedding.model.clone(),
            batch_size: config.embedding.batch_size.max(1),
        })
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: chunk,
        };
        let response: EmbeddingResponse =
            post_json(&self.client, &self.url, self.api_key.as_deref(), &request).await?;
        order_by_index(response.data, chunk.len())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!(model = %self.model, count = texts.len(), "embedding documents");

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_chunk(chunk).await?);
        }
        Ok(vectors)
    }
}

/// Reorder response rows by their `index` field and check one row per input.
fn order_by_index(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>, ProviderError> {
    if data.len() != expected {
        return Err(ProviderError::MalformedResponse(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(ProviderError::MalformedResponse(
            "embedding indices are not contiguous".into(),
        ));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}
