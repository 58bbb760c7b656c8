use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use mood_journal::form::{HttpAskQuestion, QuestionForm};

/// Interactive question form against a running server. One question per line;
/// an empty line or EOF exits.
pub async fn ask(base_url: &str) -> Result<()> {
    let form = QuestionForm::new(Arc::new(HttpAskQuestion::new(base_url)));
    println!("{}", form.view().render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            break;
        }
        form.set_value(line);

        let submit = form.submit();
        tokio::pin!(submit);
        // A zero timeout polls the submission once, which puts the form into
        // its loading state; render that before waiting for the answer.
        if tokio::time::timeout(Duration::ZERO, &mut submit).await.is_err() {
            println!("{}", form.view().render());
            let _ = submit.await;
        }
        println!("{}", form.view().render());
    }

    Ok(())
}
