//! Generic block tree: hash-keyed index storage, parent/child bookkeeping,
//! tip tracking, ancestor walks, and status propagation (spec §4.1).
//!
//! Concrete trees (`btc::BtcTree`, `vbk::VbkTree`, `alt::AltTree`) each wrap
//! a `BlockTree<Header, Addon>` and add their own `accept_block`/
//! `determine_best_chain`/payload handling on top; this type only knows
//! about structure, never about work, payloads, or fork choice.

use crate::blocktree::{Addon, BlockIndex, BlockStatus};
use crate::primitives::BlockHash;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
  UnknownParent,
  ParentFailed,
  Duplicate,
}

#[derive(Clone)]
pub struct BlockTree<H, A: Addon> {
  indices: HashMap<BlockHash, BlockIndex<H, A>>,
  tips: HashSet<BlockHash>,
  root: BlockHash,
  active_tip: BlockHash,
  /// Monotonic insertion counter, used to break exact tip ties in favor of
  /// whichever candidate was seen first (spec §4.1 tie-break rule).
  seen_order: HashMap<BlockHash, u64>,
  next_seen: u64,
}

impl<H: Clone, A: Addon> BlockTree<H, A> {
  /// Bootstraps with a single genesis block.
  pub fn new(genesis_header: H, genesis_hash: BlockHash, genesis_height: i32, genesis_addon: A) -> Self {
    let mut indices = HashMap::new();
    indices.insert(
      genesis_hash,
      BlockIndex {
        header: genesis_header,
        height: genesis_height,
        hash: genesis_hash,
        parent: None,
        children: HashSet::new(),
        status: BlockStatus::VALID_TREE | BlockStatus::APPLIED | BlockStatus::CAN_BE_APPLIED,
        addon: genesis_addon,
      },
    );
    let mut tips = HashSet::new();
    tips.insert(genesis_hash);
    let mut seen_order = HashMap::new();
    seen_order.insert(genesis_hash, 0);
    BlockTree {
      indices,
      tips,
      root: genesis_hash,
      active_tip: genesis_hash,
      seen_order,
      next_seen: 1,
    }
  }

  /// Bootstraps from a contiguous suffix with an explicit starting height.
  /// The first header in `headers` is treated as a second "genesis": it has
  /// no parent requirement and is inserted at `start_height`.
  pub fn bootstrap_chain(headers: Vec<(H, BlockHash, A)>, start_height: i32) -> Self {
    assert!(!headers.is_empty(), "bootstrap chain must not be empty");
    let mut iter = headers.into_iter();
    let (genesis_header, genesis_hash, genesis_addon) = iter.next().unwrap();
    let mut tree = Self::new(genesis_header, genesis_hash, start_height, genesis_addon);
    let mut parent_hash = genesis_hash;
    for (header, hash, addon) in iter {
      tree.insert_raw(header, hash, parent_hash, addon, true)
        .expect("bootstrap chain must be contiguous");
      parent_hash = hash;
    }
    tree
  }

  pub fn get(&self, hash: &BlockHash) -> Option<&BlockIndex<H, A>> {
    self.indices.get(hash)
  }

  pub fn get_mut(&mut self, hash: &BlockHash) -> Option<&mut BlockIndex<H, A>> {
    self.indices.get_mut(hash)
  }

  pub fn contains(&self, hash: &BlockHash) -> bool {
    self.indices.contains_key(hash)
  }

  pub fn tips(&self) -> impl Iterator<Item = &BlockHash> {
    self.tips.iter()
  }

  pub fn root(&self) -> BlockHash {
    self.root
  }

  pub fn active_tip(&self) -> BlockHash {
    self.active_tip
  }

  /// Sets the tracked active tip directly. Called by `overrideTip` after
  /// the comparator/fork-choice has already run `setState` through the
  /// state machine — this does not itself apply or unapply anything.
  pub fn set_active_tip(&mut self, hash: BlockHash) {
    debug_assert!(self.indices.contains_key(&hash));
    self.active_tip = hash;
  }

  pub fn seen_order(&self, hash: &BlockHash) -> u64 {
    *self.seen_order.get(hash).unwrap_or(&u64::MAX)
  }

  /// Inserts a new index under `parent_hash`. `allow_applied` controls
  /// whether the new block is marked `APPLIED`/`CAN_BE_APPLIED` on arrival
  /// (only used by bootstrap, where every block in the supplied suffix is
  /// trusted and already-canonical).
  pub fn insert_raw(
    &mut self,
    header: H,
    hash: BlockHash,
    parent_hash: BlockHash,
    addon: A,
    allow_applied: bool,
  ) -> Result<(), InsertError> {
    if self.indices.contains_key(&hash) {
      return Err(InsertError::Duplicate);
    }
    let parent_height = {
      let parent = self.indices.get(&parent_hash).ok_or(InsertError::UnknownParent)?;
      if parent.failed() {
        return Err(InsertError::ParentFailed);
      }
      parent.height
    };

    let mut status = BlockStatus::VALID_TREE;
    if allow_applied {
      status |= BlockStatus::APPLIED | BlockStatus::CAN_BE_APPLIED;
    }

    self.indices.insert(
      hash,
      BlockIndex {
        header,
        height: parent_height + 1,
        hash,
        parent: Some(parent_hash),
        children: HashSet::new(),
        status,
        addon,
      },
    );

    self.tips.remove(&parent_hash);
    self.tips.insert(hash);
    self.indices.get_mut(&parent_hash).unwrap().children.insert(hash);
    self.seen_order.insert(hash, self.next_seen);
    self.next_seen += 1;
    if allow_applied {
      self.active_tip = hash;
    }
    Ok(())
  }

  /// Ancestor walk from `hash` up to and including the root, nearest first.
  pub fn ancestors(&self, hash: BlockHash) -> Ancestors<'_, H, A> {
    Ancestors { tree: self, current: Some(hash) }
  }

  pub fn is_ancestor(&self, ancestor: BlockHash, of: BlockHash) -> bool {
    self.ancestors(of).any(|h| h == ancestor)
  }

  /// Walks `hash` up to the ancestor at exactly `height`, or `None` if
  /// `height` is above `hash`'s own height or below the root's.
  pub fn ancestor_at_height(&self, hash: BlockHash, height: i32) -> Option<BlockHash> {
    let mut cur = hash;
    loop {
      let idx = self.indices.get(&cur)?;
      if idx.height == height {
        return Some(cur);
      }
      if idx.height < height {
        return None;
      }
      cur = idx.parent?;
    }
  }

  /// Lowest common ancestor of `a` and `b`, found by aligning heights and
  /// then walking both up in lockstep (grounded in the teacher's
  /// `TreeNode::depth`/ancestor-walk style, generalized to two chains
  /// instead of one subtree).
  pub fn lca(&self, a: BlockHash, b: BlockHash) -> Option<BlockHash> {
    let (mut x, mut y) = (a, b);
    let (hx, hy) = (self.indices.get(&x)?.height, self.indices.get(&y)?.height);
    if hx > hy {
      x = self.ancestor_at_height(x, hy)?;
    } else if hy > hx {
      y = self.ancestor_at_height(y, hx)?;
    }
    loop {
      if x == y {
        return Some(x);
      }
      x = self.indices.get(&x)?.parent?;
      y = self.indices.get(&y)?.parent?;
    }
  }

  /// Structural removal of the subtree rooted at `hash` (inclusive),
  /// returned deepest-first so callers can unapply/release refcounts in
  /// that order before (or while) discarding each index. Does not itself
  /// touch the state machine or cross-tree refcounters — spec §4.1's
  /// `removeSubtree` composes this with those side effects.
  pub fn remove_subtree(&mut self, hash: BlockHash) -> Vec<BlockIndex<H, A>> {
    let mut stack = vec![hash];
    let mut all = Vec::new();
    while let Some(h) = stack.pop() {
      if let Some(idx) = self.indices.get(&h) {
        stack.extend(idx.children.iter().copied());
        all.push(h);
      }
    }
    // deepest-first: sort by height descending, ties by reverse insertion.
    all.sort_by(|a, b| {
      let ia = &self.indices[a];
      let ib = &self.indices[b];
      ib.height.cmp(&ia.height).then(self.seen_order(b).cmp(&self.seen_order(a)))
    });

    if let Some(parent_hash) = self.indices.get(&hash).and_then(|i| i.parent) {
      if let Some(parent) = self.indices.get_mut(&parent_hash) {
        parent.children.remove(&hash);
        if parent.children.is_empty() {
          self.tips.insert(parent_hash);
        }
      }
    }

    let mut removed = Vec::with_capacity(all.len());
    for h in all {
      self.tips.remove(&h);
      self.seen_order.remove(&h);
      if let Some(idx) = self.indices.remove(&h) {
        removed.push(idx);
      }
    }
    removed
  }

  /// Sets `reason` on `hash` and propagates `FAILED_CHILD` to every
  /// descendant (spec §4.1 `invalidateSubtree`).
  pub fn invalidate_subtree(&mut self, hash: BlockHash, reason: BlockStatus) {
    if let Some(idx) = self.indices.get_mut(&hash) {
      idx.status |= reason;
    }
    self.propagate_failed_child(hash);
  }

  /// Clears `reason` on `hash` and recomputes `FAILED_CHILD` across the
  /// subtree (spec §4.1 `revalidateSubtree`); a descendant keeps
  /// `FAILED_CHILD` if some *other* ancestor is still failed.
  pub fn revalidate_subtree(&mut self, hash: BlockHash, reason: BlockStatus) {
    if let Some(idx) = self.indices.get_mut(&hash) {
      idx.status &= !reason;
    }
    self.propagate_failed_child(hash);
  }

  fn propagate_failed_child(&mut self, from: BlockHash) {
    let children: Vec<BlockHash> = match self.indices.get(&from) {
      Some(idx) => idx.children.iter().copied().collect(),
      None => return,
    };
    for child in children {
      let ancestor_failed = self.indices.get(&from).map(|i| {
        i.status.intersects(BlockStatus::FAILED_BLOCK | BlockStatus::FAILED_POP | BlockStatus::FAILED_CHILD)
      }).unwrap_or(false);
      if let Some(idx) = self.indices.get_mut(&child) {
        if ancestor_failed {
          idx.status |= BlockStatus::FAILED_CHILD;
        } else {
          idx.status &= !BlockStatus::FAILED_CHILD;
        }
      }
      self.propagate_failed_child(child);
    }
  }

  /// Splits the path from the current active tip to `new_tip` at their
  /// `lca`: the first element is the old tip's unique suffix (ordered
  /// tip-to-lca, i.e. the order to unapply in), the second is the new
  /// tip's unique suffix (ordered lca-to-tip, the order to apply in).
  /// Pure computation; callers run their own apply/unapply side effects
  /// and then call `set_active_tip`.
  pub fn reorg_path(&self, new_tip: BlockHash) -> Option<(Vec<BlockHash>, Vec<BlockHash>)> {
    let lca = self.lca(self.active_tip, new_tip)?;
    let unapply: Vec<BlockHash> = self.ancestors(self.active_tip).take_while(|h| *h != lca).collect();
    let mut apply: Vec<BlockHash> = self.ancestors(new_tip).take_while(|h| *h != lca).collect();
    apply.reverse();
    Some((unapply, apply))
  }

  /// Sets/clears `BlockStatus::APPLIED` along the two path segments from
  /// `reorg_path`, without otherwise validating anything.
  pub fn apply_flags(&mut self, unapply: &[BlockHash], apply: &[BlockHash]) {
    for h in unapply {
      if let Some(idx) = self.indices.get_mut(h) {
        idx.status &= !BlockStatus::APPLIED;
      }
    }
    for h in apply {
      if let Some(idx) = self.indices.get_mut(h) {
        idx.status |= BlockStatus::APPLIED | BlockStatus::CAN_BE_APPLIED;
      }
    }
  }

  pub fn len(&self) -> usize {
    self.indices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }
}

pub struct Ancestors<'a, H, A: Addon> {
  tree: &'a BlockTree<H, A>,
  current: Option<BlockHash>,
}

impl<'a, H, A: Addon> Iterator for Ancestors<'a, H, A> {
  type Item = BlockHash;
  fn next(&mut self) -> Option<BlockHash> {
    let cur = self.current?;
    let idx = self.tree.indices.get(&cur)?;
    self.current = idx.parent;
    Some(cur)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blocktree::testkit::{addon, hash_of};

  #[test]
  fn tips_equals_childless_indices() {
    let mut t: BlockTree<u32, crate::blocktree::testkit::NoopAddon> =
      BlockTree::new(0, hash_of(0), 0, addon());
    t.insert_raw(1, hash_of(1), hash_of(0), addon(), false).unwrap();
    t.insert_raw(2, hash_of(2), hash_of(1), addon(), false).unwrap();
    t.insert_raw(3, hash_of(3), hash_of(1), addon(), false).unwrap();

    let tips: HashSet<_> = t.tips().copied().collect();
    assert_eq!(tips, [hash_of(2), hash_of(3)].into_iter().collect());
  }

  #[test]
  fn lca_finds_fork_point() {
    let mut t: BlockTree<u32, crate::blocktree::testkit::NoopAddon> =
      BlockTree::new(0, hash_of(0), 0, addon());
    t.insert_raw(1, hash_of(1), hash_of(0), addon(), false).unwrap();
    t.insert_raw(2, hash_of(2), hash_of(1), addon(), false).unwrap();
    t.insert_raw(3, hash_of(3), hash_of(1), addon(), false).unwrap();
    assert_eq!(t.lca(hash_of(2), hash_of(3)), Some(hash_of(1)));
    assert_eq!(t.lca(hash_of(2), hash_of(2)), Some(hash_of(2)));
  }

  #[test]
  fn remove_subtree_clears_tips_and_reparents() {
    let mut t: BlockTree<u32, crate::blocktree::testkit::NoopAddon> =
      BlockTree::new(0, hash_of(0), 0, addon());
    t.insert_raw(1, hash_of(1), hash_of(0), addon(), false).unwrap();
    t.insert_raw(2, hash_of(2), hash_of(1), addon(), false).unwrap();
    let removed = t.remove_subtree(hash_of(1));
    assert_eq!(removed.len(), 2);
    assert!(!t.contains(&hash_of(1)));
    assert!(!t.contains(&hash_of(2)));
    assert!(t.tips().any(|h| *h == hash_of(0)));
  }

  #[test]
  fn failed_child_propagates_and_clears() {
    let mut t: BlockTree<u32, crate::blocktree::testkit::NoopAddon> =
      BlockTree::new(0, hash_of(0), 0, addon());
    t.insert_raw(1, hash_of(1), hash_of(0), addon(), false).unwrap();
    t.insert_raw(2, hash_of(2), hash_of(1), addon(), false).unwrap();
    t.invalidate_subtree(hash_of(1), BlockStatus::FAILED_BLOCK);
    assert!(t.get(&hash_of(2)).unwrap().status.contains(BlockStatus::FAILED_CHILD));
    t.revalidate_subtree(hash_of(1), BlockStatus::FAILED_BLOCK);
    assert!(!t.get(&hash_of(2)).unwrap().status.contains(BlockStatus::FAILED_CHILD));
  }
}
