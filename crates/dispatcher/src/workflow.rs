//! The per-job pipeline: directory lookup, two-phase escrow funding, worker
//! dispatch, payment release. Strictly linear; a failure at any stage aborts
//! the rest, and nothing is ever retried or compensated.
//!
//! Known gap, kept on purpose: once the escrow is funded, a later failure
//! (worker down, unrecoverable job id, rejected release) leaves the funds
//! locked. The funding transaction hash is logged and carried in the error
//! so the payment can be reconciled manually.

use std::fmt;

use contract_client::events::RecoveryError;
use contract_client::{Ledger, LedgerError};
use market_core::ids::TxHash;
use market_core::job::{JobOutcome, JobResult};
use market_core::money::{format_units, TOKEN_DECIMALS};

use crate::dispatch::{DispatchError, WorkerClient, WorkerReply};
use crate::funding;

/// What a well-formed worker reply must look like for a given job type.
#[derive(Clone, Copy, Debug)]
pub enum ResultShape {
    /// JSON object carrying a string under this key.
    TextField(&'static str),
    /// Raw byte body.
    Binary,
}

pub struct JobSpec {
    pub service: &'static str,
    pub body: serde_json::Value,
    pub shape: ResultShape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Discovery,
    Funding,
    Dispatch,
    Settlement,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discovery => "discovery",
            Stage::Funding => "funding",
            Stage::Dispatch => "dispatch",
            Stage::Settlement => "settlement",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("service {name:?} not found in directory")]
    ServiceNotFound { name: String },

    #[error("token authorization failed: {0}")]
    Authorization(#[source] LedgerError),

    #[error("escrow funding failed: {0}")]
    Funding(#[source] LedgerError),

    #[error("{source}; funds remain escrowed in {funding_tx}")]
    FundingRecovery {
        #[source]
        source: RecoveryError,
        funding_tx: TxHash,
    },

    #[error("worker dispatch failed: {source}; funds remain escrowed in {funding_tx}")]
    Dispatch {
        #[source]
        source: DispatchError,
        funding_tx: TxHash,
    },

    #[error("payment release failed: {0}")]
    Settlement(#[source] LedgerError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    pub fn stage(&self) -> Stage {
        match self {
            WorkflowError::ServiceNotFound { .. } | WorkflowError::Internal(_) => Stage::Discovery,
            WorkflowError::Authorization(_)
            | WorkflowError::Funding(_)
            | WorkflowError::FundingRecovery { .. } => Stage::Funding,
            WorkflowError::Dispatch { .. } => Stage::Dispatch,
            WorkflowError::Settlement(_) => Stage::Settlement,
        }
    }
}

/// Run one job end to end. Payment is escrowed before the worker is called,
/// and released only after the worker's reply has been validated against the
/// job type's expected shape.
pub async fn execute(
    ledger: &dyn Ledger,
    worker: &dyn WorkerClient,
    spec: JobSpec,
) -> Result<JobOutcome, WorkflowError> {
    tracing::info!(service = spec.service, "job request received");

    let record = ledger
        .lookup_service(spec.service)
        .await
        .map_err(|e| WorkflowError::Internal(format!("directory lookup failed: {e}")))?;

    if !record.is_routable() {
        return Err(WorkflowError::ServiceNotFound {
            name: spec.service.to_string(),
        });
    }

    tracing::info!(
        service = spec.service,
        endpoint = %record.endpoint,
        cost = %format_units(record.cost, TOKEN_DECIMALS),
        owner = %record.owner,
        "service resolved"
    );

    let funding = funding::fund(ledger, &record).await?;

    tracing::info!(endpoint = %record.endpoint, "dispatching job to worker");

    let expect_binary = matches!(spec.shape, ResultShape::Binary);
    let reply = worker
        .call(&record.endpoint, &spec.body, expect_binary)
        .await
        .map_err(|source| dispatch_failed(source, funding.tx_hash))?;

    let result = extract_result(reply, spec.shape)
        .map_err(|source| dispatch_failed(source, funding.tx_hash))?;

    tracing::info!(job_id = %funding.job_id, "worker completed, releasing escrowed payment");

    let settlement_tx = ledger
        .release_payment(funding.job_id)
        .await
        .map_err(WorkflowError::Settlement)?;

    tracing::info!(tx = %settlement_tx, "payment released");

    Ok(JobOutcome {
        result,
        job_id: funding.job_id,
        funding_tx: funding.tx_hash,
        settlement_tx,
    })
}

fn dispatch_failed(source: DispatchError, funding_tx: TxHash) -> WorkflowError {
    tracing::error!(
        funding_tx = %funding_tx,
        error = %source,
        "worker dispatch failed; escrowed funds not reclaimed"
    );
    WorkflowError::Dispatch { source, funding_tx }
}

fn extract_result(reply: WorkerReply, shape: ResultShape) -> Result<JobResult, DispatchError> {
    match (reply, shape) {
        (WorkerReply::Json(value), ResultShape::TextField(field)) => value
            .get(field)
            .and_then(|v| v.as_str())
            .map(|text| JobResult::Text(text.to_string()))
            .ok_or_else(|| {
                DispatchError::Malformed(format!("missing {field:?} field in worker response"))
            }),
        (WorkerReply::Binary { data, content_type }, ResultShape::Binary) => {
            Ok(JobResult::Binary { data, content_type })
        }
        (reply, _) => Err(DispatchError::Malformed(format!(
            "unexpected worker response shape: {reply:?}"
        ))),
    }
}
