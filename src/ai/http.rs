//! Shared HTTP plumbing for the OpenAI-compatible chat and embedding clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Failure talking to a model provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Build the `reqwest::Client` shared by provider clients.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(ProviderError::Client)
}

/// Map a non-success status to a [`ProviderError`].
pub fn parse_http_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Authentication(body.to_string()),
        429 => ProviderError::RateLimited(body.to_string()),
        _ => ProviderError::Http {
            status,
            body: body.to_string(),
        },
    }
}

/// POST a JSON body with bearer auth and decode the JSON reply.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    body: &B,
) -> Result<R, ProviderError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let api_key = api_key.ok_or(ProviderError::MissingApiKey)?;

    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|source| ProviderError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(url, status = status.as_u16(), "provider request failed");
        return Err(parse_http_error(status.as_u16(), &body));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(api_base: &str, path: &str) -> String {
    format!("{}/{}", api_base.trim_end_matches('/'), path.trim_start_matches('/'))
}
