use std::time::Duration;
use tracing::{debug, error, info};

use super::messages::{AnswerRequest, AnswerResponse};
use crate::error::AnswerError;

/// Default answer endpoint of the companion web service
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/voice";

/// Default bound on a single answer request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote service that turns a transcript into an answer
#[async_trait::async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask one question. Never retried by the caller.
    async fn ask(&self, text: &str) -> Result<String, AnswerError>;
}

/// JSON-over-HTTP answer client
pub struct HttpAnswerClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnswerClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnswerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnswerError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl AnswerService for HttpAnswerClient {
    async fn ask(&self, text: &str) -> Result<String, AnswerError> {
        let request_id = uuid::Uuid::new_v4();
        debug!(%request_id, endpoint = %self.endpoint, chars = text.chars().count(), "sending answer request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-request-id", request_id.to_string())
            .json(&AnswerRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                error!(%request_id, error = %e, "answer request failed");
                if e.is_timeout() {
                    AnswerError::Timeout(self.timeout)
                } else {
                    AnswerError::from(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AnswerError::Timeout(self.timeout)
            } else {
                AnswerError::from(e)
            }
        })?;
        debug!(%request_id, %status, bytes = body.len(), "received answer response");

        let parsed = serde_json::from_str::<AnswerResponse>(&body);

        if !status.is_success() {
            error!(%request_id, %status, "answer endpoint returned error status");
            // Prefer the service's own message when the error body carries one
            return match parsed.ok().and_then(|r| r.error).filter(|e| !e.trim().is_empty()) {
                Some(message) => Err(AnswerError::Service(message)),
                None => Err(AnswerError::Request(format!("HTTP {}", status))),
            };
        }

        let answer = parsed
            .map_err(|e| AnswerError::MalformedResponse(e.to_string()))?
            .into_outcome()?;

        info!(%request_id, "answer received");
        Ok(answer)
    }
}
