use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use market_core::job::JobResult;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::workflow::{self, JobSpec, ResultShape, WorkflowError};
use crate::AppState;

/// Service names as registered in the on-chain directory.
pub const TEXT_SERVICE: &str = "TweetWriterV2";
pub const VOICE_SERVICE: &str = "VoiceoverAgent";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/execute-job", post(execute_job))
        .route("/execute-voice-job", post(execute_voice_job))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
pub struct TextJobRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Serialize, Deserialize)]
pub struct TextJobResponse {
    pub success: bool,
    pub result: String,
    #[serde(rename = "paymentRef")]
    pub payment_ref: String,
}

#[derive(Deserialize)]
pub struct VoiceJobRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct VoiceJobResponse {
    pub success: bool,
    #[serde(rename = "resultData")]
    pub result_data: String,
    #[serde(rename = "resultFormat")]
    pub result_format: String,
    #[serde(rename = "paymentRef")]
    pub payment_ref: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

async fn execute_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextJobRequest>,
) -> Result<Json<TextJobResponse>, ApiError> {
    if req.topic.trim().is_empty() {
        return Err(bad_request("missing 'topic' in request body"));
    }

    let spec = JobSpec {
        service: TEXT_SERVICE,
        body: json!({ "topic": req.topic }),
        shape: ResultShape::TextField("tweet"),
    };

    let outcome = workflow::execute(state.ledger.as_ref(), state.worker.as_ref(), spec)
        .await
        .map_err(workflow_error)?;

    let JobResult::Text(result) = outcome.result else {
        return Err(internal("worker returned a non-text result"));
    };

    Ok(Json(TextJobResponse {
        success: true,
        result,
        payment_ref: outcome.settlement_tx.to_string(),
    }))
}

async fn execute_voice_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceJobRequest>,
) -> Result<Json<VoiceJobResponse>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(bad_request("missing 'text' in request body"));
    }

    let spec = JobSpec {
        service: VOICE_SERVICE,
        body: json!({ "text": req.text }),
        shape: ResultShape::Binary,
    };

    let outcome = workflow::execute(state.ledger.as_ref(), state.worker.as_ref(), spec)
        .await
        .map_err(workflow_error)?;

    let JobResult::Binary { data, content_type } = outcome.result else {
        return Err(internal("worker returned a non-binary result"));
    };

    // The inbound protocol is JSON-only, so the audio bytes travel base64.
    Ok(Json(VoiceJobResponse {
        success: true,
        result_data: BASE64.encode(data),
        result_format: content_type,
        payment_ref: outcome.settlement_tx.to_string(),
    }))
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn internal(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn workflow_error(err: WorkflowError) -> ApiError {
    tracing::error!(stage = %err.stage(), error = %err, "job failed");

    let status = match err {
        WorkflowError::ServiceNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}
