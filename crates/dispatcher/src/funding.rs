//! Two-phase escrow funding: authorize the escrow to pull the price from the
//! payer's token balance, then have the escrow earmark it for the provider.
//! Each step is a confirmed transaction before the next begins; collapsing
//! them would let the escrow's transfer race an allowance it can't see yet.

use contract_client::events::recover_job_id;
use contract_client::Ledger;
use market_core::ids::{JobId, TxHash};
use market_core::service::ServiceRecord;

use crate::workflow::WorkflowError;

pub struct Funding {
    pub job_id: JobId,
    pub tx_hash: TxHash,
}

pub async fn fund(ledger: &dyn Ledger, record: &ServiceRecord) -> Result<Funding, WorkflowError> {
    let spender = ledger.escrow_address();

    let authorize_tx = ledger
        .authorize(spender, record.cost)
        .await
        .map_err(WorkflowError::Authorization)?;
    tracing::info!(tx = %authorize_tx, spender = %spender, "escrow spend authorized");

    let receipt = ledger
        .fund_job(record.owner, record.cost)
        .await
        .map_err(WorkflowError::Funding)?;
    tracing::info!(tx = %receipt.tx_hash, provider = %record.owner, "escrow holding payment");

    let job_id = recover_job_id(&receipt.logs).map_err(|source| {
        tracing::error!(
            funding_tx = %receipt.tx_hash,
            error = %source,
            "job id recovery failed; escrowed funds not reclaimed"
        );
        WorkflowError::FundingRecovery {
            source,
            funding_tx: receipt.tx_hash,
        }
    })?;
    tracing::info!(%job_id, "job id recovered from funding receipt");

    Ok(Funding {
        job_id,
        tx_hash: receipt.tx_hash,
    })
}
