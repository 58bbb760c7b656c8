mod helpers;

use std::io;
use std::sync::{Arc, Mutex};

use helpers::{assistant, KeywordEmbeddings, ScriptedLlm};
use mood_journal::ai::analyze::AnalysisError;
use mood_journal::ai::parser::ParseError;

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn schema_matching_reply_returns_decoded_fields() {
    let llm = Arc::new(ScriptedLlm::fixed(helpers::HAPPY_ANALYSIS));
    let assistant = assistant(Arc::clone(&llm), Arc::new(KeywordEmbeddings::new(&[])));

    let analysis = assistant.analyze("Spent the whole day at the beach.").await.unwrap();
    assert_eq!(analysis.sentiment_score, 8.0);
    assert_eq!(analysis.mood, "happy");
    assert_eq!(analysis.summary, "A great day outside.");
    assert_eq!(analysis.subject, "weekend");
    assert!(!analysis.negative);
    assert_eq!(analysis.color, "#0101fe");

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Spent the whole day at the beach."));
    for field in ["sentimentScore", "mood", "summary", "subject", "negative", "color"] {
        assert!(prompts[0].contains(field));
    }
}

#[tokio::test]
async fn missing_required_field_is_an_explicit_error() {
    let llm = Arc::new(ScriptedLlm::fixed(
        r#"{"sentimentScore": 2, "mood": "ok", "summary": "s", "subject": "s", "negative": false}"#,
    ));
    let assistant = assistant(llm, Arc::new(KeywordEmbeddings::new(&[])));

    match assistant.analyze("text").await {
        Err(AnalysisError::Unparsable { raw, source: ParseError::Json(_) }) => {
            assert!(raw.contains("sentimentScore"));
        }
        other => panic!("expected Unparsable, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_failure_is_not_reported_as_parse_failure() {
    let llm = Arc::new(ScriptedLlm::failing(500));
    let assistant = assistant(llm, Arc::new(KeywordEmbeddings::new(&[])));

    let err = assistant.analyze("text").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Provider(_)));
}

#[tokio::test]
async fn unparsable_reply_is_logged_as_a_warning() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let llm = Arc::new(ScriptedLlm::fixed(r#"{"sentimentScore": 4, "mood": "fine"}"#));
    let assistant = assistant(llm, Arc::new(KeywordEmbeddings::new(&[])));

    let err = assistant.analyze("An ordinary Tuesday.").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Unparsable { .. }));

    let output = logs.contents();
    let line = output
        .lines()
        .find(|line| line.contains("failed to parse analysis"))
        .unwrap_or_else(|| panic!("no parse warning in logs:\n{output}"));
    assert!(line.contains("WARN"));
    assert!(line.contains("missing field"));
}
