//! POP state machine (spec §4.5): applies and unapplies a block's
//! payload-derived validity checks atomically along active-chain
//! segments, so the tree can always be switched back to an arbitrary
//! prior fork.
//!
//! Structural bookkeeping (refcounters, endorsement registration) happens
//! once in each tree's `add_payloads`/`remove_payloads`, independent of
//! which fork is currently active — spec §3 invariants 6/7 describe them
//! in terms of "reachable", not "applied". What genuinely needs
//! apply/unapply is the part that depends on a moving active-chain
//! context: whether each payload's proof still resolves to a live block
//! in the tree below. That is exactly what `set_state` recomputes as it
//! walks a reorg's unapply/apply segments, recorded back onto
//! `BlockStatus::APPLIED` via `BlockTree::apply_flags`.

use crate::blocktree::{Addon, BlockIndex, BlockTree};
use crate::error::ValidationError;
use crate::primitives::BlockHash;

/// Switches a tree's active tip to `new_tip`, running `validate` over
/// every block on the newly-applied segment before committing. On the
/// first validation failure nothing has been mutated yet (status flags
/// are only flipped after every block validates), so the tree is left
/// exactly as it was.
pub fn set_state<H, A: Addon>(
  tree: &mut BlockTree<H, A>,
  new_tip: BlockHash,
  mut validate: impl FnMut(&BlockIndex<H, A>) -> Result<(), ValidationError>,
) -> Result<(), ValidationError> {
  let (unapply, apply) = tree
    .reorg_path(new_tip)
    .ok_or_else(|| ValidationError::AltBadCommand("no common ancestor with active tip".into()))?;

  for h in &apply {
    let idx = tree
      .get(h)
      .ok_or_else(|| ValidationError::AltBadCommand("block vanished mid-reorg".into()))?;
    validate(idx).map_err(|e| e.with_context(format!("apply block {:?}", h)))?;
  }

  tree.apply_flags(&unapply, &apply);
  tree.set_active_tip(new_tip);
  Ok(())
}
