use std::net::SocketAddr;

use alloy_primitives::Address;

const DEFAULT_HTTP_PORT: u16 = 3001;

#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    pub http_addr: SocketAddr,
    pub rpc_url: String,
    pub private_key: String,
    pub registry_address: Address,
    pub escrow_address: Address,
    pub token_address: Address,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl DispatcherConfig {
    /// Load from the environment. Every ledger-facing variable is required;
    /// a dispatcher that comes up without them would fail its first job, so
    /// fail at startup instead.
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr = match std::env::var("HTTP_ADDR") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                var: "HTTP_ADDR",
                reason: format!("{e}"),
            })?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], DEFAULT_HTTP_PORT)),
        };

        Ok(Self {
            http_addr,
            rpc_url: require("RPC_URL")?,
            private_key: require("DISPATCHER_PRIVATE_KEY")?,
            registry_address: address("REGISTRY_ADDRESS")?,
            escrow_address: address("ESCROW_ADDRESS")?,
            token_address: address("TOKEN_ADDRESS")?,
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn address(var: &'static str) -> Result<Address, ConfigError> {
    require(var)?.parse().map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("{e}"),
    })
}
