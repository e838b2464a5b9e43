use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ApiError,
    protocol::{ProcessingResponse, RequestPayload},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ClientSettings;

/// The only failure text users ever see for a submission.
pub const GENERIC_FAILURE_NOTIFICATION: &str = "Error uploading the image. Please try again.";

const MAX_ERROR_DETAIL_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to processing service failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("request to processing service timed out")]
    Timeout,
    #[error("processing service responded with status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("malformed response from processing service: {0}")]
    MalformedResponse(String),
}

impl SubmissionError {
    /// Every kind collapses to the same notification; the variant is for logs.
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_NOTIFICATION
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SubmissionError::Timeout
        } else {
            SubmissionError::Transport(err)
        }
    }
}

/// Sends one payload to the processing service. Implementations must not retry.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(&self, payload: &RequestPayload)
        -> Result<ProcessingResponse, SubmissionError>;
}

pub struct HttpSubmissionTransport {
    http: Client,
    endpoint: Url,
}

impl HttpSubmissionTransport {
    pub fn new(settings: &ClientSettings) -> Result<Self, SubmissionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build().map_err(SubmissionError::Client)?,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionTransport for HttpSubmissionTransport {
    async fn submit(
        &self,
        payload: &RequestPayload,
    ) -> Result<ProcessingResponse, SubmissionError> {
        debug!(
            endpoint = %self.endpoint,
            operation = %payload.operation(),
            file_len = payload.file.len(),
            "posting image processing request"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(SubmissionError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Status {
                status: status.as_u16(),
                detail: describe_error_body(&body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(SubmissionError::from_reqwest)?;
        serde_json::from_slice::<ProcessingResponse>(&body)
            .map_err(|e| SubmissionError::MalformedResponse(e.to_string()))
    }
}

fn describe_error_body(body: &str) -> String {
    if let Some(api_error) = ApiError::from_body(body) {
        return format!("{:?}: {}", api_error.code, api_error.message);
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    trimmed.chars().take(MAX_ERROR_DETAIL_LEN).collect()
}
