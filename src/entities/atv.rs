//! ATV: proves an ALT block header was published into a VBK block.

use crate::entities::AtvId;
use crate::primitives::BlockHash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atv {
  pub id: AtvId,
  /// ALT block's "publication data header" hash — the block being
  /// endorsed into VBK.
  pub endorsed_hash: BlockHash,
  /// VBK block the publication proof is anchored to.
  pub block_of_proof: BlockHash,
  /// Script bytes identifying who gets paid for this endorsement. Opaque
  /// to the core; interpreted only by the embedder's own payout
  /// mechanism, and used as the key `getPopPayout` groups rewards by.
  pub payout_info: Vec<u8>,
}
