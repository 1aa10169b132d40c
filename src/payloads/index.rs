//! Payload reverse index and validity cache (spec §4.7): which blocks
//! carry a given payload id, and whether that payload last validated
//! there. Used by the mempool to reject duplicate endorsements and to
//! skip re-validating a payload the state machine already ruled on.

use crate::primitives::BlockHash;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct PayloadsIndex {
  containing_blocks: HashMap<BlockHash, HashSet<BlockHash>>,
  validity: HashMap<(BlockHash, BlockHash), bool>,
}

impl PayloadsIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, payload_id: BlockHash, containing_hash: BlockHash) {
    self.containing_blocks.entry(payload_id).or_default().insert(containing_hash);
  }

  pub fn remove(&mut self, payload_id: BlockHash, containing_hash: BlockHash) {
    if let Some(set) = self.containing_blocks.get_mut(&payload_id) {
      set.remove(&containing_hash);
      if set.is_empty() {
        self.containing_blocks.remove(&payload_id);
      }
    }
    self.validity.remove(&(containing_hash, payload_id));
  }

  pub fn containing_blocks(&self, payload_id: &BlockHash) -> impl Iterator<Item = &BlockHash> {
    self.containing_blocks.get(payload_id).into_iter().flatten()
  }

  /// True if `payload_id` is already attached anywhere in the tree, i.e.
  /// a fresh submission carrying the same id would be a duplicate
  /// endorsement (spec §4.8).
  pub fn is_known(&self, payload_id: &BlockHash) -> bool {
    self.containing_blocks.contains_key(payload_id)
  }

  pub fn set_validity(&mut self, containing_hash: BlockHash, payload_id: BlockHash, valid: bool) {
    self.validity.insert((containing_hash, payload_id), valid);
  }

  pub fn validity(&self, containing_hash: BlockHash, payload_id: BlockHash) -> Option<bool> {
    self.validity.get(&(containing_hash, payload_id)).copied()
  }

  /// Drops every entry, for a full rebuild from tree state (e.g. after
  /// loading from storage).
  pub fn clear(&mut self) {
    self.containing_blocks.clear();
    self.validity.clear();
  }

  pub fn reindex<I: IntoIterator<Item = (BlockHash, BlockHash)>>(&mut self, entries: I) {
    self.clear();
    for (payload_id, containing_hash) in entries {
      self.add(payload_id, containing_hash);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::primitives::hash_bytes;

  #[test]
  fn detects_duplicate_attachment() {
    let mut idx = PayloadsIndex::new();
    let payload = hash_bytes(b"atv1");
    let block_a = hash_bytes(b"a");
    let block_b = hash_bytes(b"b");

    assert!(!idx.is_known(&payload));
    idx.add(payload, block_a);
    assert!(idx.is_known(&payload));
    idx.add(payload, block_b);
    assert_eq!(idx.containing_blocks(&payload).count(), 2);

    idx.remove(payload, block_a);
    assert_eq!(idx.containing_blocks(&payload).count(), 1);
  }
}
