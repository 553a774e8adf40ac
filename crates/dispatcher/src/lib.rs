pub mod api;
pub mod config;
pub mod dispatch;
pub mod funding;
pub mod workflow;

use std::sync::Arc;

use contract_client::Ledger;

use crate::dispatch::WorkerClient;

pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub worker: Arc<dyn WorkerClient>,
}
