//! Question answering over past entries.
//!
//! Entries are indexed in a throwaway [`MemoryVectorStore`], the closest ones
//! are retrieved and a refine chain walks them in order: the first document
//! produces an initial answer, every later document gets a chance to revise it.

use std::sync::Arc;

use thiserror::Error;

use super::embedding::EmbeddingProvider;
use super::http::ProviderError;
use super::llm::LlmClient;
use super::prompt::render_template;
use super::vector_store::{Document, MemoryVectorStore};
use crate::journal::types::JournalEntry;

pub const INITIAL_QA_PROMPT: &str = "Context information is below.\n---------------------\n{context}\n---------------------\nGiven the context information and no prior knowledge, answer the question: {question}\n";

pub const REFINE_PROMPT: &str = "The original question is as follows: {question}\nWe have provided an existing answer: {existing_answer}\nWe have the opportunity to refine the existing answer\n(only if needed) with some more context below.\n------------\n{context}\n------------\nGiven the new context, refine the original answer to better answer the question. \nIf the context isn't useful, return the original answer.";

#[derive(Debug, Error)]
pub enum QaError {
    #[error("embedding failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("model call failed: {0}")]
    Llm(#[source] ProviderError),
}

/// Sequential answer refinement over an ordered set of documents.
pub struct RefineChain<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> RefineChain<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// One model call per document; a single call with empty context when
    /// there are no documents.
    pub async fn run(&self, question: &str, documents: &[Document]) -> Result<String, ProviderError> {
        let (first, rest) = match documents.split_first() {
            Some((first, rest)) => (first.page_content.as_str(), rest),
            None => ("", &[][..]),
        };

        let initial = render_template(INITIAL_QA_PROMPT, &[("context", first), ("question", question)]);
        let mut answer = self.llm.complete(&initial).await?;

        for (step, document) in rest.iter().enumerate() {
            tracing::debug!(step = step + 1, id = %document.metadata.id, "refining answer");
            let prompt = render_template(
                REFINE_PROMPT,
                &[
                    ("question", question),
                    ("existing_answer", answer.as_str()),
                    ("context", document.page_content.as_str()),
                ],
            );
            answer = self.llm.complete(&prompt).await?;
        }

        Ok(answer.trim().to_string())
    }
}

/// Answer `question` from the `k` entries most similar to it.
pub async fn qa(
    llm: &dyn LlmClient,
    embeddings: Arc<dyn EmbeddingProvider>,
    question: &str,
    entries: &[JournalEntry],
    k: usize,
) -> Result<String, QaError> {
    let documents: Vec<Document> = entries.iter().map(Document::from).collect();

    let store = MemoryVectorStore::from_documents(documents, embeddings)
        .await
        .map_err(QaError::Embedding)?;
    let relevant = store
        .similarity_search(question, k)
        .await
        .map_err(QaError::Embedding)?;

    tracing::info!(
        entries = entries.len(),
        relevant = relevant.len(),
        "answering question"
    );

    RefineChain::new(llm)
        .run(question, &relevant)
        .await
        .map_err(QaError::Llm)
}
