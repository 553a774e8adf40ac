#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use alloy::primitives::{Bytes, LogData, B256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use contract_client::{FundingReceipt, JobEscrow, Ledger, LedgerError};
use dispatcher::dispatch::{DispatchError, WorkerClient, WorkerReply};
use market_core::ids::{JobId, TxHash};
use market_core::service::ServiceRecord;

pub const AUTHORIZE_TX: TxHash = TxHash([0x33; 32]);
pub const FUNDING_TX: TxHash = TxHash([0x11; 32]);
pub const RELEASE_TX: TxHash = TxHash([0x22; 32]);

pub fn escrow_addr() -> Address {
    Address::repeat_byte(0x05)
}

pub fn provider_addr() -> Address {
    Address::repeat_byte(0xab)
}

/// Every outbound call both mocks make, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    Lookup(String),
    Authorize { spender: Address, amount: U256 },
    Fund { provider: Address, amount: U256 },
    Dispatch { endpoint: String },
    Release(JobId),
}

pub type Trace = Arc<Mutex<Vec<TraceEvent>>>;

pub fn new_trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn release_count(trace: &Trace) -> usize {
    trace
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, TraceEvent::Release(_)))
        .count()
}

pub fn test_record() -> ServiceRecord {
    ServiceRecord {
        name: "TweetWriterV2".to_string(),
        endpoint: "http://worker.test/job".to_string(),
        cost: U256::from(100_000u64),
        owner: provider_addr(),
    }
}

pub fn funded_log(job_id: u64) -> Log {
    let event = JobEscrow::JobFunded {
        jobId: U256::from(job_id),
        payer: Address::repeat_byte(0x01),
        provider: provider_addr(),
        amount: U256::from(100_000u64),
    };
    Log {
        inner: alloy::primitives::Log {
            address: escrow_addr(),
            data: event.encode_log_data(),
        },
        ..Default::default()
    }
}

/// A log from some unrelated contract that must fail to decode and be
/// silently skipped.
pub fn noise_log() -> Log {
    Log {
        inner: alloy::primitives::Log {
            address: Address::repeat_byte(0x04),
            data: LogData::new_unchecked(
                vec![B256::repeat_byte(0x11)],
                Bytes::from_static(&[0xde, 0xad]),
            ),
        },
        ..Default::default()
    }
}

pub struct MockLedger {
    pub trace: Trace,
    /// `None` makes lookups return the registry's all-empty record.
    pub record: Option<ServiceRecord>,
    /// Logs attached to the funding receipt.
    pub funding_logs: Vec<Log>,
}

impl MockLedger {
    pub fn new(trace: Trace, record: Option<ServiceRecord>, funding_logs: Vec<Log>) -> Self {
        Self {
            trace,
            record,
            funding_logs,
        }
    }
}

#[async_trait]
impl Ledger for MockLedger {
    fn escrow_address(&self) -> Address {
        escrow_addr()
    }

    async fn lookup_service(&self, name: &str) -> Result<ServiceRecord, LedgerError> {
        self.trace
            .lock()
            .unwrap()
            .push(TraceEvent::Lookup(name.to_string()));

        Ok(self.record.clone().unwrap_or(ServiceRecord {
            name: String::new(),
            endpoint: String::new(),
            cost: U256::ZERO,
            owner: Address::ZERO,
        }))
    }

    async fn authorize(&self, spender: Address, amount: U256) -> Result<TxHash, LedgerError> {
        self.trace
            .lock()
            .unwrap()
            .push(TraceEvent::Authorize { spender, amount });
        Ok(AUTHORIZE_TX)
    }

    async fn fund_job(
        &self,
        provider: Address,
        amount: U256,
    ) -> Result<FundingReceipt, LedgerError> {
        self.trace
            .lock()
            .unwrap()
            .push(TraceEvent::Fund { provider, amount });
        Ok(FundingReceipt {
            tx_hash: FUNDING_TX,
            logs: self.funding_logs.clone(),
        })
    }

    async fn release_payment(&self, job_id: JobId) -> Result<TxHash, LedgerError> {
        self.trace.lock().unwrap().push(TraceEvent::Release(job_id));
        Ok(RELEASE_TX)
    }
}

pub enum WorkerBehavior {
    Json(serde_json::Value),
    Binary(Vec<u8>, String),
    Fail,
}

pub struct MockWorker {
    pub trace: Trace,
    pub behavior: WorkerBehavior,
}

#[async_trait]
impl WorkerClient for MockWorker {
    async fn call(
        &self,
        endpoint: &str,
        _body: &serde_json::Value,
        _expect_binary: bool,
    ) -> Result<WorkerReply, DispatchError> {
        self.trace.lock().unwrap().push(TraceEvent::Dispatch {
            endpoint: endpoint.to_string(),
        });

        match &self.behavior {
            WorkerBehavior::Json(value) => Ok(WorkerReply::Json(value.clone())),
            WorkerBehavior::Binary(data, content_type) => Ok(WorkerReply::Binary {
                data: data.clone(),
                content_type: content_type.clone(),
            }),
            WorkerBehavior::Fail => Err(DispatchError::Transport("connection refused".to_string())),
        }
    }
}
