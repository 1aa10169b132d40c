//! VBK (intermediate) block header. Grounded in `original_source/include/
//! veriblock/blockchain/vbk_block_index.hpp`: VBK headers carry a truncated
//! previous-block reference (unlike BTC's full-width one) because VeriBlock
//! headers are deliberately small to keep the embedded-into-BTC publication
//! transaction cheap.

use crate::primitives::{hash_bytes, BlockHash, ChainWork, VbkPreviousBlockHash};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VbkMerkleRoot(pub [u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VbkHeader {
  pub height: i32,
  pub version: i16,
  pub previous_block: VbkPreviousBlockHash,
  pub merkle_root: VbkMerkleRoot,
  pub timestamp: u32,
  pub difficulty: u32,
  pub nonce: u64,
}

impl VbkHeader {
  pub fn hash(&self) -> BlockHash {
    let bytes = bincode::serialize(self).expect("VbkHeader is always serializable");
    hash_bytes(&bytes)
  }

  pub fn work(&self) -> ChainWork {
    ChainWork::from_compact_bits(self.difficulty)
  }
}

/// Wire alias: a `VbkBlock` inside `PopData.context` is exactly a VBK header
/// the ALT block is asking the VBK tree to learn about before processing
/// the VTBs/ATVs that reference it.
pub type VbkBlock = VbkHeader;
