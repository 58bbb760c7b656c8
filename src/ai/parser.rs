//! Schema-constrained decoding of model output into [`Analysis`].
//!
//! [`format_instructions`] renders the `Analysis` JSON schema into the text the
//! model is told to follow; [`parse`] decodes the reply, accepting either a
//! fenced markdown code block or bare JSON.

use std::sync::OnceLock;

use thiserror::Error;

use crate::journal::types::{Analysis, MAX_SENTIMENT, MIN_SENTIMENT};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model output does not match the analysis schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sentimentScore {0} is outside [-10, 10]")]
    ScoreOutOfRange(f64),
}

const INSTRUCTIONS_PREAMBLE: &str = r#"You must format your output as a JSON value that adheres to a given "JSON Schema" instance.

"JSON Schema" is a declarative language that allows you to annotate and validate JSON documents.

For example, the example "JSON Schema" instance {"properties": {"foo": {"description": "a list of test words", "type": "array", "items": {"type": "string"}}}, "required": ["foo"]}
would match an object with one required property, "foo". The "type" property specifies "foo" must be an "array", and the "description" property semantically describes it as "a list of test words". The items within "foo" must be strings.
Thus, the object {"foo": ["bar", "baz"]} is a well-formatted instance of this example "JSON Schema". The object {"properties": {"foo": ["bar", "baz"]}} is not well-formatted.

Your output will be parsed and type-checked according to the provided schema instance, so make sure all fields in your output match the schema exactly and there are no trailing commas!

Here is the JSON Schema instance your output must adhere to. Include the enclosing markdown codeblock:
"#;

/// Format instructions embedding the [`Analysis`] schema. Computed once.
pub fn format_instructions() -> &'static str {
    static INSTRUCTIONS: OnceLock<String> = OnceLock::new();
    INSTRUCTIONS.get_or_init(|| {
        let mut schema = serde_json::to_value(schemars::schema_for!(Analysis))
            .unwrap_or_else(|_| serde_json::Value::Null);
        if let Some(object) = schema.as_object_mut() {
            object.remove("$schema");
            object.remove("title");
        }
        format!("{INSTRUCTIONS_PREAMBLE}```json\n{schema}\n```\n")
    })
}

/// Decode raw model text into an [`Analysis`].
pub fn parse(text: &str) -> Result<Analysis, ParseError> {
    let analysis: Analysis = serde_json::from_str(extract_json(text))?;
    if !(MIN_SENTIMENT..=MAX_SENTIMENT).contains(&analysis.sentiment_score) {
        return Err(ParseError::ScoreOutOfRange(analysis.sentiment_score));
    }
    Ok(analysis)
}

/// The body of the first fenced code block, or the whole trimmed text.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[open + 3..];
    // The fence line may carry a language tag in any case (`json`, `JSON`).
    let body = match after_fence.split_once('\n') {
        Some((tag, rest)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => rest,
        _ => match after_fence.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &after_fence[4..],
            _ => after_fence,
        },
    };
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}
