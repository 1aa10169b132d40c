//! ALT (protected) block header. Alt chains are pluggable — the core only
//! needs the four accessors below — the same way the teacher's
//! `consensus::block::Block<D, S>` trait keeps the payload type `D` opaque
//! to the consensus engine and only requires `hash`/`parent`/`data`.

use crate::primitives::BlockHash;
use serde::Serialize;

pub trait AltHeader: Clone + Eq + Serialize + std::fmt::Debug {
  fn hash(&self) -> BlockHash;
  fn previous_hash(&self) -> BlockHash;
  fn height(&self) -> i32;
  /// Unix timestamp, seconds.
  fn timestamp(&self) -> i64;

  /// Relative mining difficulty at this block, used as the denominator of
  /// the endorsement payout ratio (spec F.4.3). Alt chains that don't
  /// track a comparable difficulty figure can leave this at the default,
  /// which makes the payout curve see a flat ratio equal to the VBK
  /// proof's own work.
  fn difficulty(&self) -> f64 {
    1.0
  }
}

/// A minimal concrete `AltHeader` used by `testkit` and anywhere an
/// embedder hasn't supplied its own alt-chain header type yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct SimpleAltHeader {
  pub hash: BlockHash,
  pub previous_hash: BlockHash,
  pub height: i32,
  pub timestamp: i64,
}

impl AltHeader for SimpleAltHeader {
  fn hash(&self) -> BlockHash {
    self.hash
  }
  fn previous_hash(&self) -> BlockHash {
    self.previous_hash
  }
  fn height(&self) -> i32 {
    self.height
  }
  fn timestamp(&self) -> i64 {
    self.timestamp
  }
}
