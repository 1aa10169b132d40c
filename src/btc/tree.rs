//! BTC tree: plain proof-of-work block tree, no payloads (spec §4.2).
//! Grounded in the teacher's `storage::blocks::BlockStore` for the
//! insert/lookup shape, generalized to the generic `BlockTree`.

use crate::blocktree::{BlockIndex, BlockTree, InsertError};
use crate::btc::BtcAddon;
use crate::config::BtcParams;
use crate::entities::BtcHeader;
use crate::error::ValidationError;
use crate::primitives::BlockHash;
use crate::stateless::{self, PowVerifier};

#[derive(Clone)]
pub struct BtcTree {
  tree: BlockTree<BtcHeader, BtcAddon>,
  params: BtcParams,
}

impl BtcTree {
  pub fn bootstrap(genesis: BtcHeader, genesis_height: i32, params: BtcParams) -> Self {
    let hash = genesis.hash();
    let work = genesis.work();
    let tree = BlockTree::new(
      genesis,
      hash,
      genesis_height,
      BtcAddon { cumulative_work: work, ref_counter: 0 },
    );
    BtcTree { tree, params }
  }

  pub fn get(&self, hash: &BlockHash) -> Option<&BlockIndex<BtcHeader, BtcAddon>> {
    self.tree.get(hash)
  }

  pub fn active_tip(&self) -> BlockHash {
    self.tree.active_tip()
  }

  pub fn contains(&self, hash: &BlockHash) -> bool {
    self.tree.contains(hash)
  }

  /// Accepts a new header: checks PoW, resolves the parent by its
  /// `previous_block` link, inserts, and re-runs best-chain selection.
  pub fn accept_block(
    &mut self,
    header: BtcHeader,
    verifier: &impl PowVerifier,
  ) -> Result<BlockHash, ValidationError> {
    stateless::check_btc_block(&header, verifier)?;

    let hash = header.hash();
    let parent_hash = header.previous_block;
    let parent_work = self
      .tree
      .get(&parent_hash)
      .ok_or_else(|| ValidationError::InvalidBtcBlock("unknown parent".into()))?
      .addon
      .cumulative_work;

    let cumulative_work = parent_work
      .checked_add(header.work())
      .ok_or_else(|| ValidationError::InvalidBtcBlock("work overflow".into()))?;

    self
      .tree
      .insert_raw(header, hash, parent_hash, BtcAddon { cumulative_work, ref_counter: 0 }, false)
      .map_err(|e| match e {
        InsertError::UnknownParent => ValidationError::InvalidBtcBlock("unknown parent".into()),
        InsertError::ParentFailed => ValidationError::InvalidBtcBlock("parent is failed".into()),
        InsertError::Duplicate => ValidationError::InvalidBtcBlock("duplicate block".into()),
      })?;

    self.determine_best_chain();
    Ok(hash)
  }

  /// Increments the refcounter of `hash`, rejecting references to blocks
  /// the tree has never heard of (spec §3 invariant 6).
  pub fn inc_ref(&mut self, hash: BlockHash) -> Result<(), ValidationError> {
    let idx = self
      .tree
      .get_mut(&hash)
      .ok_or_else(|| ValidationError::VtbStatelesslyInvalid("unknown BTC anchor block".into()))?;
    idx.addon.ref_counter += 1;
    Ok(())
  }

  pub fn dec_ref(&mut self, hash: BlockHash) {
    if let Some(idx) = self.tree.get_mut(&hash) {
      idx.addon.ref_counter = idx.addon.ref_counter.saturating_sub(1);
    }
  }

  /// Picks the tip with the greatest cumulative work, tie-broken by
  /// lexicographic hash compare with earlier-seen winning exact ties
  /// (spec §4.1).
  fn determine_best_chain(&mut self) {
    let mut best: Option<BlockHash> = None;
    for tip in self.tree.tips() {
      let idx = match self.tree.get(tip) {
        Some(i) if !i.failed() => i,
        _ => continue,
      };
      best = Some(match best {
        None => *tip,
        Some(cur) => {
          let cur_work = self.tree.get(&cur).unwrap().addon.cumulative_work;
          if idx.addon.cumulative_work > cur_work {
            *tip
          } else if idx.addon.cumulative_work == cur_work {
            if self.tree.seen_order(tip) < self.tree.seen_order(&cur) {
              *tip
            } else {
              cur
            }
          } else {
            cur
          }
        }
      });
    }
    if let Some(tip) = best {
      self.tree.set_active_tip(tip);
    }
  }

  pub fn params(&self) -> &BtcParams {
    &self.params
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stateless::DefaultPowVerifier;

  fn genesis() -> BtcHeader {
    BtcHeader {
      version: 1,
      previous_block: crate::primitives::hash_bytes(b"none"),
      merkle_root: crate::primitives::hash_bytes(b"root"),
      timestamp: 0,
      bits: 0x207f_ffff,
      nonce: 0,
    }
  }

  fn child_of(parent: &BtcHeader, nonce: u32) -> BtcHeader {
    BtcHeader {
      version: 1,
      previous_block: parent.hash(),
      merkle_root: crate::primitives::hash_bytes(b"root"),
      timestamp: parent.timestamp + 600,
      bits: parent.bits,
      nonce,
    }
  }

  #[test]
  fn picks_heaviest_tip() {
    let g = genesis();
    let params = BtcParams { pow_limit: 0x207f_ffff, retarget_interval: 2016, retarget_period_seconds: 1_209_600 };
    let mut tree = BtcTree::bootstrap(g.clone(), 0, params);

    let a = child_of(&g, 1);
    let a_hash = tree.accept_block(a.clone(), &DefaultPowVerifier).unwrap();
    assert_eq!(tree.active_tip(), a_hash);

    let b = child_of(&g, 2);
    tree.accept_block(b, &DefaultPowVerifier).unwrap();
    // equal work, tie-break keeps the earlier-seen tip (`a`).
    assert_eq!(tree.active_tip(), a_hash);
  }

  #[test]
  fn refcounter_tracks_vtb_anchors() {
    let g = genesis();
    let params = BtcParams { pow_limit: 0x207f_ffff, retarget_interval: 2016, retarget_period_seconds: 1_209_600 };
    let mut tree = BtcTree::bootstrap(g.clone(), 0, params);
    let a = child_of(&g, 1);
    let a_hash = tree.accept_block(a, &DefaultPowVerifier).unwrap();
    tree.inc_ref(a_hash).unwrap();
    assert_eq!(tree.get(&a_hash).unwrap().addon.ref_counter, 1);
    tree.dec_ref(a_hash);
    assert_eq!(tree.get(&a_hash).unwrap().addon.ref_counter, 0);
  }
}
