use std::fmt;

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// Identifier the escrow contract assigns to a funded job. Opaque to the
/// dispatcher; only ever echoed back into `releasePayment`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub U256);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl From<B256> for TxHash {
    fn from(hash: B256) -> Self {
        TxHash(hash.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
