//! Generic block-index entity (spec §3), parameterized over the concrete
//! header type and the chain-specific "addon" data (refcounter/endorsements/
//! payload ids).
//!
//! Parent/child links are weak: lookup keys into the owning tree's hash
//! map, never owning pointers — unlike the teacher's `forktree::TreeNode`,
//! which links parent/children through raw pointers and `Rc<RefCell<_>>`
//! because it only ever needs to walk its *own* just-inserted subtree. Our
//! tree additionally needs O(1) random lookup by hash from the comparator
//! and payload index, so indices live in one `HashMap` keyed by hash and
//! reference each other by that key (spec design note: "Back-references are
//! weak references — lookups through the tree's hash map, not owning
//! pointers; this avoids ownership cycles").

use crate::blocktree::BlockStatus;
use crate::primitives::BlockHash;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockIndex<H, A> {
  pub header: H,
  pub height: i32,
  pub hash: BlockHash,
  pub parent: Option<BlockHash>,
  pub children: HashSet<BlockHash>,
  pub status: BlockStatus,
  pub addon: A,
}

impl<H, A> BlockIndex<H, A> {
  pub fn is_tip_candidate(&self) -> bool {
    self.children.is_empty()
  }

  pub fn applied(&self) -> bool {
    self.status.contains(BlockStatus::APPLIED)
  }

  pub fn can_be_applied(&self) -> bool {
    self.status.contains(BlockStatus::CAN_BE_APPLIED)
  }

  pub fn failed(&self) -> bool {
    self.status.is_failed()
  }
}

/// Chain-specific addon data attached to every index (spec design note:
/// "Model as a tagged variant per chain... rather than an inheritance
/// hierarchy"). Each chain's addon type implements this marker trait.
pub trait Addon: Default + Clone + std::fmt::Debug {}
