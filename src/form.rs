//! Headless question form.
//!
//! A controlled text input plus submit button. While a question is in flight
//! the form is disabled and [`QuestionForm::submit`] refuses to start another
//! call. The loading flag is held by a guard, so it is cleared when the call
//! settles, fails, or the submitting future is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub const PLACEHOLDER: &str = "Ask a Question";
pub const SUBMIT_LABEL: &str = "Ask";
pub const LOADING_TEXT: &str = "Loading...";

#[derive(Debug, Error)]
pub enum AskError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a question is already being answered")]
    Busy,

    #[error(transparent)]
    Ask(#[from] AskError),
}

/// The ask-question operation the form submits to.
#[async_trait]
pub trait AskQuestion: Send + Sync {
    async fn ask_question(&self, question: &str) -> Result<String, AskError>;
}

/// Calls `POST {base}/api/question` on a running journal server.
pub struct HttpAskQuestion {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct AnswerBody {
    data: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpAskQuestion {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/api/question", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl AskQuestion for HttpAskQuestion {
    async fn ask_question(&self, question: &str) -> Result<String, AskError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "question": question }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(AskError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<AnswerBody>().await?.data)
    }
}

#[derive(Debug, Default)]
struct FormState {
    value: String,
    loading: bool,
    response: Option<String>,
    error: Option<String>,
}

/// What the form shows at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub value: String,
    pub input_disabled: bool,
    pub button_disabled: bool,
    pub show_loading: bool,
    pub response: Option<String>,
    pub error: Option<String>,
}

impl FormView {
    /// Plain-text rendering for the terminal front-end.
    pub fn render(&self) -> String {
        let input = if self.value.is_empty() {
            format!("[ {PLACEHOLDER} ]")
        } else {
            format!("[ {} ]", self.value)
        };
        let button = if self.button_disabled {
            format!("({SUBMIT_LABEL})")
        } else {
            format!("[{SUBMIT_LABEL}]")
        };

        let mut lines = vec![format!("{input} {button}")];
        if self.show_loading {
            lines.push(LOADING_TEXT.to_string());
        }
        if let Some(response) = &self.response {
            lines.push(response.clone());
        }
        if let Some(error) = &self.error {
            lines.push(format!("error: {error}"));
        }
        lines.join("\n")
    }
}

/// Clears the loading flag on drop.
struct LoadingGuard<'a> {
    state: &'a Mutex<FormState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

pub struct QuestionForm {
    backend: Arc<dyn AskQuestion>,
    state: Mutex<FormState>,
}

impl QuestionForm {
    pub fn new(backend: Arc<dyn AskQuestion>) -> Self {
        Self {
            backend,
            state: Mutex::new(FormState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the input text. Returns `false` (and changes nothing) while
    /// the input is disabled.
    pub fn set_value(&self, text: impl Into<String>) -> bool {
        let mut state = self.lock();
        if state.loading {
            return false;
        }
        state.value = text.into();
        true
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn view(&self) -> FormView {
        let state = self.lock();
        FormView {
            value: state.value.clone(),
            input_disabled: state.loading,
            button_disabled: state.loading,
            show_loading: state.loading,
            response: state.response.clone(),
            error: state.error.clone(),
        }
    }

    fn begin(&self) -> Result<(LoadingGuard<'_>, String), SubmitError> {
        let mut state = self.lock();
        if state.loading {
            return Err(SubmitError::Busy);
        }
        state.loading = true;
        state.error = None;
        Ok((LoadingGuard { state: &self.state }, state.value.clone()))
    }

    /// Submit the current value and wait for the answer.
    ///
    /// On success the answer is shown and the input cleared; on failure the
    /// error is shown and the input kept.
    pub async fn submit(&self) -> Result<String, SubmitError> {
        let (guard, question) = self.begin()?;
        tracing::debug!(question_len = question.len(), "question submitted");

        let outcome = self.backend.ask_question(&question).await;

        {
            let mut state = self.lock();
            match &outcome {
                Ok(answer) => {
                    state.response = Some(answer.clone());
                    state.value.clear();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ask question failed");
                    state.error = Some(e.to_string());
                }
            }
        }
        drop(guard);

        Ok(outcome?)
    }
}
