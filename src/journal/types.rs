//! Journal record definitions.
//!
//! Defines [`JournalEntry`] (a stored entry) and [`Analysis`] (the fixed-shape
//! record the model must produce for an entry). The JSON schema of
//! [`Analysis`] is what the analysis prompt hands to the model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A journal entry, matching the `journal_entries` table. Serializes in
/// camelCase like every other record on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    /// Free text written by the user.
    pub content: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-modification timestamp.
    pub updated_at: String,
}

/// Mood analysis of a single entry.
///
/// Field names serialize in camelCase; the model is asked for exactly this
/// shape and any reply missing a field or carrying a wrong type is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[schemars(
        description = "sentiment of the text and rated on a scale from -10 to 10, where -10 is extremely negative, 0 is neutral, and 10 is extremely positive."
    )]
    pub sentiment_score: f64,

    #[schemars(description = "the mood of the person who wrote the journal entry.")]
    pub mood: String,

    #[schemars(description = "quick summary of the entire entry.")]
    pub summary: String,

    #[schemars(description = "subject of the journal entry.")]
    pub subject: String,

    #[schemars(
        description = "is the journal entry negative? (i.e. does it contain negative emotions?)."
    )]
    pub negative: bool,

    #[schemars(
        description = "a hexadecimal color code that represents the mood of the entry. Example #0101fe for blue representing happiness."
    )]
    pub color: String,
}

/// Lowest sentiment score the model may report.
pub const MIN_SENTIMENT: f64 = -10.0;
/// Highest sentiment score the model may report.
pub const MAX_SENTIMENT: f64 = 10.0;

/// An entry together with its analysis, if one has been stored.
#[derive(Debug, Clone, Serialize)]
pub struct EntryWithAnalysis {
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub analysis: Option<Analysis>,
}
