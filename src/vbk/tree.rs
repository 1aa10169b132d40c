//! VBK tree: proof-of-work block tree carrying VTBs that anchor its
//! blocks into BTC (spec §4.3). Resolves each header's truncated
//! `previous_block` reference against an internal reverse index before
//! handing off to the generic `BlockTree`, which only ever deals in full
//! hashes.

use std::collections::HashMap;

use crate::blocktree::{BlockIndex, BlockTree, InsertError};
use crate::btc::BtcTree;
use crate::config::VbkParams;
use crate::entities::{Endorsement, VbkHeader, Vtb, VtbId};
use crate::error::ValidationError;
use crate::primitives::{BlockHash, VbkPreviousBlockHash};
use crate::stateless;
use crate::vbk::VbkAddon;

#[derive(Clone)]
pub struct VbkTree {
  tree: BlockTree<VbkHeader, VbkAddon>,
  prev_index: HashMap<VbkPreviousBlockHash, BlockHash>,
  params: VbkParams,
}

impl VbkTree {
  pub fn bootstrap(genesis: VbkHeader, params: VbkParams) -> Self {
    let hash = genesis.hash();
    let work = genesis.work();
    let height = genesis.height;
    let mut prev_index = HashMap::new();
    prev_index.insert(VbkPreviousBlockHash::truncate(&hash), hash);
    let tree = BlockTree::new(genesis, hash, height, VbkAddon { cumulative_work: work, ..Default::default() });
    VbkTree { tree, prev_index, params }
  }

  pub fn get(&self, hash: &BlockHash) -> Option<&BlockIndex<VbkHeader, VbkAddon>> {
    self.tree.get(hash)
  }

  pub fn active_tip(&self) -> BlockHash {
    self.tree.active_tip()
  }

  pub fn contains(&self, hash: &BlockHash) -> bool {
    self.tree.contains(hash)
  }

  pub fn is_ancestor(&self, ancestor: BlockHash, of: BlockHash) -> bool {
    self.tree.is_ancestor(ancestor, of)
  }

  pub fn accept_block(&mut self, header: VbkHeader) -> Result<BlockHash, ValidationError> {
    stateless::check_vbk_block(&header, self.params.minimum_difficulty)?;

    let hash = header.hash();
    let parent_hash = *self
      .prev_index
      .get(&header.previous_block)
      .ok_or_else(|| ValidationError::InvalidVbkBlock("unknown parent".into()))?;
    let parent_work = self
      .tree
      .get(&parent_hash)
      .ok_or_else(|| ValidationError::InvalidVbkBlock("unknown parent".into()))?
      .addon
      .cumulative_work;
    let cumulative_work = parent_work
      .checked_add(header.work())
      .ok_or_else(|| ValidationError::InvalidVbkBlock("work overflow".into()))?;

    self
      .tree
      .insert_raw(
        header,
        hash,
        parent_hash,
        VbkAddon { cumulative_work, ..Default::default() },
        false,
      )
      .map_err(|e| match e {
        InsertError::UnknownParent => ValidationError::InvalidVbkBlock("unknown parent".into()),
        InsertError::ParentFailed => ValidationError::InvalidVbkBlock("parent is failed".into()),
        InsertError::Duplicate => ValidationError::InvalidVbkBlock("duplicate block".into()),
      })?;

    self.prev_index.insert(VbkPreviousBlockHash::truncate(&hash), hash);
    self.determine_best_chain();
    Ok(hash)
  }

  /// Attaches `vtbs` to `containing_hash`, validating each statelessly,
  /// dropping any whose id already endorsed the same chain within the
  /// settlement window, resolving its BTC anchor, and registering the
  /// endorsement on both ends. Structural: happens regardless of whether
  /// `containing_hash` is on the currently active chain, since the VBK
  /// tree's own fork choice is pure proof-of-work and does not need
  /// apply-gated endorsement visibility the way the ALT tree's
  /// PoP-aware comparator does.
  ///
  /// Atomic: on any contextual failure, both this tree and `btc` are
  /// restored to their pre-call state before the error is returned.
  pub fn add_payloads(&mut self, containing_hash: BlockHash, vtbs: &[Vtb], btc: &mut BtcTree) -> Result<(), ValidationError> {
    if !self.tree.contains(&containing_hash) {
      return Err(ValidationError::InvalidVbkBlock("unknown containing block".into()));
    }

    let tree_snapshot = self.tree.clone();
    let btc_snapshot = btc.clone();

    let result = (|| {
      for vtb in vtbs {
        stateless::check_vtb_statelessly(vtb)
          .map_err(|e| e.with_context(format!("vtb {}", vtb.id)))?;
        if vtb.containing_block != containing_hash {
          return Err(ValidationError::VtbStatelesslyInvalid("containing_block mismatch".into()));
        }
        if !self.tree.contains(&vtb.endorsed_hash) {
          return Err(ValidationError::VtbStatelesslyInvalid("unknown endorsed VBK block".into()));
        }
        if self.is_duplicate_endorsement(containing_hash, vtb.id) {
          continue;
        }
        btc.inc_ref(vtb.block_of_proof)?;

        let endorsement = Endorsement::from_vtb(vtb, containing_hash);
        self.tree.get_mut(&containing_hash).unwrap().addon.vtb_ids.push(vtb.id);
        self.tree.get_mut(&vtb.endorsed_hash).unwrap().addon.endorsed_by.push(endorsement.id);
      }
      Ok(())
    })();

    if result.is_err() {
      self.tree = tree_snapshot;
      *btc = btc_snapshot;
    }
    result
  }

  /// True if `id` already endorsed some block within `settlement_interval`
  /// ancestors of `containing_hash` (inclusive), i.e. re-submitting it on
  /// the same chain would be a duplicate endorsement.
  pub fn is_duplicate_endorsement(&self, containing_hash: BlockHash, id: VtbId) -> bool {
    let start_height = match self.tree.get(&containing_hash) {
      Some(i) => i.height,
      None => return false,
    };
    for h in self.tree.ancestors(containing_hash) {
      let idx = match self.tree.get(&h) {
        Some(i) => i,
        None => continue,
      };
      if (start_height - idx.height) as u32 > self.params.settlement_interval {
        break;
      }
      if idx.addon.vtb_ids.contains(&id) {
        return true;
      }
    }
    false
  }

  /// Whether `prev` resolves to a known VBK block, i.e. whether a header
  /// carrying it as `previous_block` could be accepted right now.
  pub fn contains_previous(&self, prev: VbkPreviousBlockHash) -> bool {
    self.prev_index.contains_key(&prev)
  }

  /// Records a VTB id against `containing_hash` without touching BTC
  /// refcounters, so `is_duplicate_endorsement` sees it during mempool
  /// assembly. Paired with `untrial_attach_vtb`; neither call represents
  /// a real endorsement until the payload is actually submitted through
  /// `add_payloads`.
  pub fn trial_attach_vtb(&mut self, containing_hash: BlockHash, id: VtbId) {
    if let Some(idx) = self.tree.get_mut(&containing_hash) {
      idx.addon.vtb_ids.push(id);
    }
  }

  pub fn untrial_attach_vtb(&mut self, containing_hash: BlockHash, id: VtbId) {
    if let Some(idx) = self.tree.get_mut(&containing_hash) {
      if let Some(pos) = idx.addon.vtb_ids.iter().position(|v| *v == id) {
        idx.addon.vtb_ids.remove(pos);
      }
    }
  }

  /// Reverses a trial `accept_block`: removes the subtree rooted at
  /// `hash`, clears its reverse-previous-hash entries, and re-runs best
  /// chain selection. Used by the mempool assembler to probe whether a
  /// chain of pending context blocks would connect, without leaving any
  /// trace in the tree once it is done looking.
  pub fn remove_trial(&mut self, hash: BlockHash) {
    let removed = self.tree.remove_subtree(hash);
    for idx in &removed {
      let truncated = VbkPreviousBlockHash::truncate(&idx.hash);
      if self.prev_index.get(&truncated) == Some(&idx.hash) {
        self.prev_index.remove(&truncated);
      }
    }
    self.determine_best_chain();
  }

  pub fn remove_payloads(&mut self, containing_hash: BlockHash, vtbs: &[Vtb], btc: &mut BtcTree) {
    for vtb in vtbs {
      btc.dec_ref(vtb.block_of_proof);
      if let Some(idx) = self.tree.get_mut(&containing_hash) {
        idx.addon.vtb_ids.retain(|id| *id != vtb.id);
      }
      if let Some(idx) = self.tree.get_mut(&vtb.endorsed_hash) {
        idx.addon.endorsed_by.retain(|id| *id != vtb.id);
      }
    }
  }

  pub fn endorsed_by(&self, hash: &BlockHash) -> &[VtbId] {
    self.tree.get(hash).map(|i| i.addon.endorsed_by.as_slice()).unwrap_or(&[])
  }

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
          } else if idx.addon.cumulative_work == cur_work && self.tree.seen_order(tip) < self.tree.seen_order(&cur) {
            *tip
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
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::primitives::hash_bytes;

  fn genesis() -> VbkHeader {
    VbkHeader {
      height: 0,
      version: 2,
      previous_block: VbkPreviousBlockHash([0u8; 12]),
      merkle_root: crate::entities::VbkMerkleRoot([0u8; 16]),
      timestamp: 0,
      difficulty: 1,
      nonce: 0,
    }
  }

  fn child_of(parent: &VbkHeader, nonce: u64) -> VbkHeader {
    VbkHeader {
      height: parent.height + 1,
      version: 2,
      previous_block: VbkPreviousBlockHash::truncate(&parent.hash()),
      merkle_root: crate::entities::VbkMerkleRoot([0u8; 16]),
      timestamp: parent.timestamp + 30,
      difficulty: parent.difficulty,
      nonce,
    }
  }

  fn params() -> VbkParams {
    VbkParams { network_magic: 1, minimum_difficulty: 1, settlement_interval: 400 }
  }

  #[test]
  fn resolves_truncated_previous_hash() {
    let g = genesis();
    let mut tree = VbkTree::bootstrap(g.clone(), params());
    let c = child_of(&g, 1);
    let hash = tree.accept_block(c).unwrap();
    assert_eq!(tree.active_tip(), hash);
  }

  #[test]
  fn add_payloads_registers_endorsement_and_refcount() {
    let g = genesis();
    let mut vbk = VbkTree::bootstrap(g.clone(), params());
    let c = child_of(&g, 1);
    let c_hash = vbk.accept_block(c).unwrap();

    let btc_params = crate::config::BtcParams { pow_limit: 0x207f_ffff, retarget_interval: 2016, retarget_period_seconds: 1_209_600 };
    let btc_genesis = crate::entities::BtcHeader {
      version: 1,
      previous_block: hash_bytes(b"none"),
      merkle_root: hash_bytes(b"root"),
      timestamp: 0,
      bits: 0x207f_ffff,
      nonce: 0,
    };
    let mut btc = BtcTree::bootstrap(btc_genesis.clone(), 0, btc_params);
    let btc_hash = btc
      .accept_block(
        crate::entities::BtcHeader { previous_block: btc_genesis.hash(), nonce: 7, ..btc_genesis.clone() },
        &crate::stateless::DefaultPowVerifier,
      )
      .unwrap();

    let vtb = Vtb { id: hash_bytes(b"vtb1").into(), endorsed_hash: g.hash(), containing_block: c_hash, block_of_proof: btc_hash };
    vbk.add_payloads(c_hash, &[vtb.clone()], &mut btc).unwrap();

    assert_eq!(btc.get(&btc_hash).unwrap().addon.ref_counter, 1);
    assert_eq!(vbk.endorsed_by(&g.hash()), &[vtb.id]);

    vbk.remove_payloads(c_hash, &[vtb], &mut btc);
    assert_eq!(btc.get(&btc_hash).unwrap().addon.ref_counter, 0);
    assert!(vbk.endorsed_by(&g.hash()).is_empty());
  }
}
