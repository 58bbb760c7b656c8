//! Ephemeral in-memory similarity index over journal entries.
//!
//! A [`MemoryVectorStore`] is built per question from the current entries and
//! dropped afterwards; nothing is persisted between calls.

use std::sync::Arc;

use serde::Serialize;

use super::embedding::EmbeddingProvider;
use super::http::ProviderError;
use crate::journal::types::JournalEntry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// A retrieval unit: entry text plus identifying metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub page_content: String,
    pub metadata: DocumentMetadata,
}

impl From<&JournalEntry> for Document {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            page_content: entry.content.clone(),
            metadata: DocumentMetadata {
                id: entry.id.clone(),
                created_at: entry.created_at.clone(),
            },
        }
    }
}

struct IndexedDocument {
    document: Document,
    embedding: Vec<f32>,
}

pub struct MemoryVectorStore {
    embeddings: Arc<dyn EmbeddingProvider>,
    documents: Vec<IndexedDocument>,
}

impl MemoryVectorStore {
    /// Embed all documents in one batch and index them.
    pub async fn from_documents(
        documents: Vec<Document>,
        embeddings: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, ProviderError> {
        if documents.is_empty() {
            return Ok(Self {
                embeddings,
                documents: Vec::new(),
            });
        }

        let texts: Vec<String> = documents.iter().map(|d| d.page_content.clone()).collect();
        let vectors = embeddings.embed_documents(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(ProviderError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                vectors.len()
            )));
        }

        let documents = documents
            .into_iter()
            .zip(vectors)
            .map(|(document, embedding)| IndexedDocument { document, embedding })
            .collect();

        Ok(Self {
            embeddings,
            documents,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Top `k` documents for `query` by cosine similarity.
    ///
    /// An empty index or `k == 0` returns nothing without embedding the query.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, ProviderError> {
        if self.documents.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_vector = self.embeddings.embed_query(query).await?;
        Ok(self
            .similarity_search_by_vector(&query_vector, k)
            .into_iter()
            .map(|(document, _)| document)
            .collect())
    }

    /// Scored top `k`, highest similarity first. Equal scores keep index order.
    pub fn similarity_search_by_vector(&self, query: &[f32], k: usize) -> Vec<(Document, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let score = cosine_similarity(query, &d.embedding);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        // sort_by is stable: ties stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| (self.documents[i].document.clone(), score))
            .collect()
    }
}

/// Cosine similarity. Zero-norm or mismatched-length vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
