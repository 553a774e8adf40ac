pub mod events;

use std::str::FromStr;

use alloy::consensus::TxReceipt;
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::Log;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use market_core::ids::{JobId, TxHash};
use market_core::service::ServiceRecord;

sol! {
    #[sol(rpc)]
    contract ServiceRegistry {
        struct Service {
            string name;
            string endpoint;
            uint256 cost;
            address owner;
        }

        function getService(string calldata name) external view returns (Service memory);
    }

    #[sol(rpc)]
    contract JobEscrow {
        function fundJob(address provider, uint256 amount) external returns (uint256);
        function releasePayment(uint256 jobId) external;

        event JobFunded(uint256 indexed jobId, address indexed payer, address indexed provider, uint256 amount);
        event PaymentReleased(uint256 indexed jobId, address indexed provider, uint256 amount);
    }

    #[sol(rpc)]
    contract Erc20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("contract call failed: {0}")]
    CallFailed(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("transaction reverted: {0}")]
    Reverted(String),
}

/// Result of the escrow funding transaction: the hash plus the raw log
/// entries the job identifier has to be recovered from.
#[derive(Clone, Debug)]
pub struct FundingReceipt {
    pub tx_hash: TxHash,
    pub logs: Vec<Log>,
}

/// Outbound ledger calls the workflow depends on. One implementation talks
/// to the chain; tests substitute recording mocks.
#[async_trait]
pub trait Ledger: Send + Sync {
    fn escrow_address(&self) -> Address;

    async fn lookup_service(&self, name: &str) -> Result<ServiceRecord, LedgerError>;

    async fn authorize(&self, spender: Address, amount: U256) -> Result<TxHash, LedgerError>;

    async fn fund_job(&self, provider: Address, amount: U256)
        -> Result<FundingReceipt, LedgerError>;

    async fn release_payment(&self, job_id: JobId) -> Result<TxHash, LedgerError>;
}

/// Ledger client backed by a JSON-RPC endpoint and a local signing key.
///
/// Holds no mutable state; a fresh wallet-backed provider is built per call,
/// so concurrent jobs can share one instance. Note that the token allowance
/// is payer-scoped on-chain: two jobs authorizing concurrently from the same
/// payer can overwrite each other's allowance, and this client does not
/// serialize across jobs.
pub struct EvmLedger {
    rpc_url: Url,
    registry_address: Address,
    escrow_address: Address,
    token_address: Address,
    signer: PrivateKeySigner,
}

impl EvmLedger {
    pub fn new(
        rpc_url: &str,
        registry_address: Address,
        escrow_address: Address,
        token_address: Address,
        private_key: &str,
    ) -> Result<Self, LedgerError> {
        let signer = PrivateKeySigner::from_str(private_key)
            .map_err(|e| LedgerError::InvalidConfig(format!("bad signing key: {e}")))?;
        let rpc_url: Url = rpc_url
            .parse()
            .map_err(|e| LedgerError::InvalidConfig(format!("bad rpc url: {e}")))?;

        Ok(Self {
            rpc_url,
            registry_address,
            escrow_address,
            token_address,
            signer,
        })
    }

    /// Account the dispatcher signs and pays from.
    pub fn payer_address(&self) -> Address {
        self.signer.address()
    }

    fn provider(&self) -> impl Provider {
        let wallet = EthereumWallet::from(self.signer.clone());
        ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone())
    }
}

#[async_trait]
impl Ledger for EvmLedger {
    fn escrow_address(&self) -> Address {
        self.escrow_address
    }

    async fn lookup_service(&self, name: &str) -> Result<ServiceRecord, LedgerError> {
        let registry = ServiceRegistry::new(self.registry_address, self.provider());

        let service = registry
            .getService(name.to_string())
            .call()
            .await
            .map_err(|e| LedgerError::CallFailed(e.to_string()))?;

        Ok(ServiceRecord {
            name: service.name,
            endpoint: service.endpoint,
            cost: service.cost,
            owner: service.owner,
        })
    }

    async fn authorize(&self, spender: Address, amount: U256) -> Result<TxHash, LedgerError> {
        let token = Erc20::new(self.token_address, self.provider());

        let pending = token
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        if !receipt.status() {
            return Err(LedgerError::Reverted(format!(
                "approve reverted in {}",
                TxHash::from(receipt.transaction_hash)
            )));
        }

        Ok(TxHash::from(receipt.transaction_hash))
    }

    async fn fund_job(
        &self,
        provider: Address,
        amount: U256,
    ) -> Result<FundingReceipt, LedgerError> {
        let escrow = JobEscrow::new(self.escrow_address, self.provider());

        let pending = escrow
            .fundJob(provider, amount)
            .send()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        if !receipt.status() {
            return Err(LedgerError::Reverted(format!(
                "fundJob reverted in {}",
                TxHash::from(receipt.transaction_hash)
            )));
        }

        Ok(FundingReceipt {
            tx_hash: TxHash::from(receipt.transaction_hash),
            logs: receipt.inner.logs().to_vec(),
        })
    }

    async fn release_payment(&self, job_id: JobId) -> Result<TxHash, LedgerError> {
        let escrow = JobEscrow::new(self.escrow_address, self.provider());

        let pending = escrow
            .releasePayment(job_id.0)
            .send()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::TransactionFailed(e.to_string()))?;

        if !receipt.status() {
            return Err(LedgerError::Reverted(format!(
                "releasePayment reverted in {}",
                TxHash::from(receipt.transaction_hash)
            )));
        }

        Ok(TxHash::from(receipt.transaction_hash))
    }
}
