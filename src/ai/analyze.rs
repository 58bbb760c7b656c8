//! Entry analysis: prompt → model → schema-constrained decode.

use thiserror::Error;

use super::http::ProviderError;
use super::llm::LlmClient;
use super::parser::{self, ParseError};
use super::prompt::build_prompt;
use crate::journal::types::Analysis;

/// Why an entry could not be analysed.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The model call itself failed.
    #[error("model call failed: {0}")]
    Provider(#[from] ProviderError),

    /// The model answered, but not in the analysis shape.
    #[error("model returned unparsable content: {source}")]
    Unparsable {
        raw: String,
        #[source]
        source: ParseError,
    },
}

/// Analyse one entry's text.
pub async fn analyze(llm: &dyn LlmClient, content: &str) -> Result<Analysis, AnalysisError> {
    let prompt = build_prompt(content);
    tracing::debug!(model = llm.model(), content_len = content.len(), "analyzing entry");

    let raw = llm.complete(&prompt).await?;

    match parser::parse(&raw) {
        Ok(analysis) => {
            tracing::info!(
                sentiment = analysis.sentiment_score,
                mood = %analysis.mood,
                negative = analysis.negative,
                "entry analyzed"
            );
            Ok(analysis)
        }
        Err(source) => {
            tracing::warn!(error = %source, raw_len = raw.len(), "failed to parse analysis");
            Err(AnalysisError::Unparsable { raw, source })
        }
    }
}
