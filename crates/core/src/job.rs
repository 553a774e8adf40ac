use crate::ids::{JobId, TxHash};

/// Validated output of a worker call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobResult {
    Text(String),
    Binary { data: Vec<u8>, content_type: String },
}

/// Terminal success of one job execution: the worker's result plus the
/// on-chain references the caller needs for reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobOutcome {
    pub result: JobResult,
    pub job_id: JobId,
    pub funding_tx: TxHash,
    pub settlement_tx: TxHash,
}
