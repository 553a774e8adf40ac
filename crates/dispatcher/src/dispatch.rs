use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

/// Format assumed for binary results when the worker doesn't say.
const DEFAULT_BINARY_FORMAT: &str = "audio/mpeg";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("request to worker failed: {0}")]
    Transport(String),

    #[error("worker returned status {0}")]
    Status(u16),

    #[error("malformed worker response: {0}")]
    Malformed(String),
}

/// Raw reply from a worker endpoint, before the workflow has checked it
/// against the job type's expected shape.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerReply {
    Json(serde_json::Value),
    Binary { data: Vec<u8>, content_type: String },
}

/// One POST to the provider's endpoint, no retry. A worker that doesn't
/// answer is terminal for the job.
#[async_trait]
pub trait WorkerClient: Send + Sync {
    async fn call(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
        expect_binary: bool,
    ) -> Result<WorkerReply, DispatchError>;
}

pub struct HttpWorkerClient {
    client: reqwest::Client,
}

impl HttpWorkerClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpWorkerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn call(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
        expect_binary: bool,
    ) -> Result<WorkerReply, DispatchError> {
        let response = self
            .client
            .post(endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }

        if expect_binary {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or(DEFAULT_BINARY_FORMAT)
                .to_string();
            let data = response
                .bytes()
                .await
                .map_err(|e| DispatchError::Transport(e.to_string()))?
                .to_vec();
            Ok(WorkerReply::Binary { data, content_type })
        } else {
            let value = response
                .json()
                .await
                .map_err(|e| DispatchError::Malformed(e.to_string()))?;
            Ok(WorkerReply::Json(value))
        }
    }
}
