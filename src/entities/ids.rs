//! Payload identifiers. Newtypes over `BlockHash` rather than a bare alias,
//! so an ATV id can never be confused with a VTB id or a block hash at the
//! type level — the same discipline the teacher applies to `Pubkey`/
//! `Multihash` distinctions in `primitives::keys`.

use crate::primitives::BlockHash;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! payload_id {
  ($name:ident) => {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct $name(pub BlockHash);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
      }
    }

    impl From<BlockHash> for $name {
      fn from(h: BlockHash) -> Self {
        Self(h)
      }
    }
  };
}

payload_id!(AtvId);
payload_id!(VtbId);
payload_id!(VbkId);
