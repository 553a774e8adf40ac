use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Directory entry for one registered provider. Read fresh from the registry
/// for every job; a record is never cached across jobs because its price or
/// endpoint may have changed on-chain in the meantime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub endpoint: String,
    /// Price in the token's base units.
    pub cost: U256,
    /// Account the escrow pays out to.
    pub owner: Address,
}

impl ServiceRecord {
    /// The registry returns an all-empty record for unknown names; an empty
    /// endpoint is the not-found signal.
    pub fn is_routable(&self) -> bool {
        !self.endpoint.is_empty()
    }
}
