//! BTC (anchor) block header. Grounded in `original_source/include/
//! veriblock/blockchain/btc_block_index.hpp`: version/prev/merkle/time/bits/
//! nonce, the same shape Bitcoin headers have had since genesis.

use crate::primitives::{hash_bytes, BlockHash, ChainWork};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtcHeader {
  pub version: i32,
  pub previous_block: BlockHash,
  pub merkle_root: BlockHash,
  pub timestamp: u32,
  pub bits: u32,
  pub nonce: u32,
}

impl BtcHeader {
  /// Content hash of this header, used as the tree's map key. Hashing a
  /// header's own bytes is plain content-addressing, not a cryptographic
  /// verification predicate, so it stays inside the core unlike PoW/merkle
  /// checks (those live behind `stateless::PowVerifier`).
  pub fn hash(&self) -> BlockHash {
    let bytes = bincode::serialize(self).expect("BtcHeader is always serializable");
    hash_bytes(&bytes)
  }

  /// Work contributed by this single header at its encoded difficulty.
  pub fn work(&self) -> ChainWork {
    ChainWork::from_compact_bits(self.bits)
  }
}
