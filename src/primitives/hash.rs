//! Hash types used as block-tree keys.
//!
//! Every tree (BTC, VBK, ALT) keys its blocks by a content hash. We reuse
//! `multihash` for this, the same way the teacher's `consensus::vote::Vote`
//! hashes itself with `MultihashCode::Sha3_256.wrap(...)`.

use multihash::{Code, Multihash, MultihashDigest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The hash type used to key blocks in all three trees.
pub type BlockHash = Multihash;

/// Hashes raw bytes the way block headers are content-addressed in this
/// engine. Exposed so `testkit` and external header implementations can
/// produce hashes consistent with what the tree expects as keys.
pub fn hash_bytes(bytes: &[u8]) -> BlockHash {
  Code::Sha2_256.digest(bytes)
}

/// VBK's previous-block reference is a 12-byte truncation of the full VBK
/// block hash (grounded in `original_source/include/veriblock/blockchain/
/// vbk_block_index.hpp`, whose `previousBlock` field is a truncated hash
/// distinct from the full block hash used as the map key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VbkPreviousBlockHash(pub [u8; 12]);

impl fmt::Display for VbkPreviousBlockHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for b in &self.0 {
      write!(f, "{:02x}", b)?;
    }
    Ok(())
  }
}

impl VbkPreviousBlockHash {
  /// Truncates a full VBK block hash down to the 12-byte previous-block
  /// reference embedded in descendant headers.
  pub fn truncate(full: &BlockHash) -> Self {
    let digest = full.digest();
    let mut out = [0u8; 12];
    let n = digest.len().min(12);
    out[..n].copy_from_slice(&digest[..n]);
    Self(out)
  }
}

/// A 32-byte BTC-style hash (double-sha256 in the original; the core only
/// ever compares/stores these bytes, it never hashes).
pub type Sha256Hash = BlockHash;
