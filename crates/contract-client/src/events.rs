use alloy::rpc::types::Log;
use market_core::ids::JobId;

use crate::JobEscrow;

#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("no JobFunded event in funding receipt")]
    Missing,

    #[error("expected one JobFunded event in funding receipt, found {0}")]
    Ambiguous(usize),
}

/// Recover the escrow-assigned job identifier from a funding receipt's logs.
///
/// The receipt carries logs from every contract touched by the transaction;
/// entries that don't decode as `JobFunded` are skipped, not errors. Exactly
/// one match is required: with zero or several there is no identifier that
/// can safely be passed to `releasePayment`, even though the transfer itself
/// has already confirmed.
pub fn recover_job_id(logs: &[Log]) -> Result<JobId, RecoveryError> {
    let matches: Vec<JobId> = logs
        .iter()
        .filter_map(|log| log.log_decode::<JobEscrow::JobFunded>().ok())
        .map(|decoded| JobId(decoded.inner.data.jobId))
        .collect();

    match matches.as_slice() {
        [job_id] => Ok(*job_id),
        [] => Err(RecoveryError::Missing),
        many => Err(RecoveryError::Ambiguous(many.len())),
    }
}
