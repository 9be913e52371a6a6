use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

use folio_core::store::StoreError;

use super::helpers::ApiErrorResponse;

/// Everything that can go wrong talking to the resource endpoint.
///
/// Converted into [`StoreError`] at the [`ResourceStore`](folio_core::store::ResourceStore)
/// boundary.
#[derive(Error, Debug)]
pub enum ResourceApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to serialize request: {0}")]
    RequestSerialization(#[source] serde_json::Error),

    #[error("Failed to parse response ({context}): {source}")]
    ResponseParsing {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Non-success status. `messages` holds the `errors[].message` entries, when the body had any.
    #[error("Resource API error: status={status}, message='{}'", message_or_body(.messages, .body_text))]
    Api {
        status: StatusCode,
        messages: Vec<String>,
        body_text: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

fn message_or_body(messages: &[String], body_text: &str) -> String {
    if messages.is_empty() {
        body_text.to_string()
    } else {
        messages.join("\n")
    }
}

impl ResourceApiError {
    /// The error text reported to users: the API's messages joined by newlines.
    pub fn message(&self) -> String {
        match self {
            ResourceApiError::Api { messages, body_text, .. } => message_or_body(messages, body_text),
            other => other.to_string(),
        }
    }
}

/// Turns a non-success response into [`ResourceApiError::Api`].
///
/// The body is parsed as `{"errors":[{"message":...}]}` when possible; otherwise the raw text is
/// kept on its own.
pub(crate) async fn map_response_error(response: reqwest::Response) -> ResourceApiError {
    let status = response.status();
    match response.text().await {
        Ok(body_text) => {
            let messages = match serde_json::from_str::<ApiErrorResponse>(&body_text) {
                Ok(parsed) => parsed.errors.into_iter().map(|e| e.message).collect(),
                Err(parse_err) => {
                    warn!(%status, error = %parse_err, "Error response is not in the expected format");
                    Vec::new()
                }
            };
            ResourceApiError::Api {
                status,
                messages,
                body_text,
            }
        }
        Err(e) => {
            warn!(%status, error = %e, "Failed to read error response body");
            ResourceApiError::Network(e)
        }
    }
}

impl From<ResourceApiError> for StoreError {
    fn from(err: ResourceApiError) -> Self {
        match err {
            ResourceApiError::Network(source) => StoreError::Transport(Box::new(source)),
            ResourceApiError::RequestSerialization(source) => {
                StoreError::Rejected(format!("Request could not be encoded: {source}"))
            }
            ResourceApiError::ResponseParsing { context, source } => {
                StoreError::Malformed(format!("{context}: {source}"))
            }
            ResourceApiError::Api {
                status,
                messages,
                body_text,
            } => {
                let message = message_or_body(&messages, &body_text);
                match status {
                    StatusCode::NOT_FOUND => StoreError::NotFound(message),
                    _ => StoreError::Api {
                        status: status.as_u16(),
                        message,
                    },
                }
            }
            ResourceApiError::InvalidConfiguration(msg) => StoreError::Rejected(msg),
        }
    }
}
