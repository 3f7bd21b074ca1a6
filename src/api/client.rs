use log::{debug, error};
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::models::{FramePayload, StudentState};

pub const PROCESS_FRAME_PATH: &str = "/student/process-frame";
pub const SESSIONS_PATH: &str = "/teacher/sessions";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport failure: unreachable host, reset connection, timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The response body is ignored. Any HTTP status counts as delivered;
    /// only transport failures are errors.
    pub async fn submit_frame(&self, payload: &FramePayload) -> Result<StatusCode, ApiError> {
        let url = self.config.endpoint(PROCESS_FRAME_PATH);
        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("frame for {} answered with {status}", payload.student_id);
        }
        Ok(status)
    }

    /// Typed poll result: callers can tell an empty classroom from a failed fetch.
    pub async fn try_fetch_student_states(&self) -> Result<Vec<StudentState>, ApiError> {
        let url = self.config.endpoint(SESSIONS_PATH);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status, url });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode {
            url,
            message: err.to_string(),
        })
    }

    /// Degrades every failure to an empty list, so "no students" and "fetch failed"
    /// look the same here. Use [`ApiClient::try_fetch_student_states`] to tell them apart.
    pub async fn fetch_student_states(&self) -> Vec<StudentState> {
        match self.try_fetch_student_states().await {
            Ok(states) => states,
            Err(err) => {
                error!("Teacher API error: {err}");
                Vec::new()
            }
        }
    }
}
