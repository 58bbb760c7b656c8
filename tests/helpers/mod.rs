#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mood_journal::ai::embedding::EmbeddingProvider;
use mood_journal::ai::http::ProviderError;
use mood_journal::ai::llm::LlmClient;
use mood_journal::ai::Assistant;
use mood_journal::journal::types::JournalEntry;
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    mood_journal::db::open_memory_database().unwrap()
}

/// A reply matching the analysis schema.
pub const HAPPY_ANALYSIS: &str = r##"```json
{"sentimentScore": 8, "mood": "happy", "summary": "A great day outside.", "subject": "weekend", "negative": false, "color": "#0101fe"}
```"##;

type Reply = dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync;

/// LLM fake driven by a closure over the prompt. Records every prompt.
pub struct ScriptedLlm {
    reply: Box<Reply>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(reply: impl Fn(&str) -> Result<String, ProviderError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `text`.
    pub fn fixed(text: &'static str) -> Self {
        Self::new(move |_| Ok(text.to_string()))
    }

    /// Analysis prompts get [`HAPPY_ANALYSIS`]; anything else gets `answer`.
    pub fn journal(answer: &'static str) -> Self {
        Self::new(move |prompt| {
            if prompt.starts_with("Analyze the following journal entry.") {
                Ok(HAPPY_ANALYSIS.to_string())
            } else {
                Ok(answer.to_string())
            }
        })
    }

    pub fn failing(status: u16) -> Self {
        Self::new(move |_| {
            Err(ProviderError::Http {
                status,
                body: "upstream down".into(),
            })
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)(prompt)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Bag-of-words embeddings over a fixed vocabulary. Deterministic, no network.
pub struct KeywordEmbeddings {
    vocabulary: Vec<&'static str>,
    pub calls: AtomicUsize,
    pub embedded_texts: AtomicUsize,
    fail: bool,
}

impl KeywordEmbeddings {
    pub fn new(vocabulary: &[&'static str]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
            calls: AtomicUsize::new(0),
            embedded_texts: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        self.vocabulary
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbeddings {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.embedded_texts.fetch_add(texts.len(), Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::RateLimited("too many requests".into()));
        }
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }
}

pub const VOCABULARY: &[&str] = &["beach", "work", "sleep", "friend", "rain", "happy"];

pub fn assistant(llm: Arc<ScriptedLlm>, embeddings: Arc<KeywordEmbeddings>) -> Assistant {
    Assistant::new(llm, embeddings, 4)
}

pub fn entry(id: &str, content: &str) -> JournalEntry {
    JournalEntry {
        id: id.to_string(),
        content: content.to_string(),
        created_at: "2024-06-01T12:00:00+00:00".to_string(),
        updated_at: "2024-06-01T12:00:00+00:00".to_string(),
    }
}
