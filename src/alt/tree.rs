//! ALT tree: the protected chain itself (spec §4.4). Wraps a generic
//! `BlockTree<H, AltAddon>` plus the VBK tree its ATVs/VTBs/context blocks
//! attach to, and drives fork choice through the PoP-aware comparator
//! rather than raw chain length.

use crate::alt::AltAddon;
use crate::blocktree::{BlockTree, InsertError};
use crate::btc::BtcTree;
use crate::comparator::PopAwareComparator;
use crate::config::AltParams;
use crate::entities::{AltHeader, Endorsement, PopData};
use crate::error::ValidationError;
use crate::primitives::BlockHash;
use crate::stateless;
use crate::statemachine;
use crate::vbk::VbkTree;
use std::cmp::Ordering;

#[derive(Clone)]
pub struct AltTree<H: AltHeader> {
  tree: BlockTree<H, AltAddon>,
  vbk: VbkTree,
  params: AltParams,
}

impl<H: AltHeader> AltTree<H> {
  pub fn bootstrap(genesis: H, vbk: VbkTree, params: AltParams) -> Self {
    let hash = genesis.hash();
    let height = genesis.height();
    let tree = BlockTree::new(genesis, hash, height, AltAddon::default());
    AltTree { tree, vbk, params }
  }

  pub fn get(&self, hash: &BlockHash) -> Option<&crate::blocktree::BlockIndex<H, AltAddon>> {
    self.tree.get(hash)
  }

  pub fn active_tip(&self) -> BlockHash {
    self.tree.active_tip()
  }

  pub fn inner(&self) -> &BlockTree<H, AltAddon> {
    &self.tree
  }

  pub fn vbk(&self) -> &VbkTree {
    &self.vbk
  }

  pub fn vbk_mut(&mut self) -> &mut VbkTree {
    &mut self.vbk
  }

  pub fn params(&self) -> &AltParams {
    &self.params
  }

  /// Accepts a new header: resolves the parent, checks block-time drift
  /// against median-time-past, and inserts. Does not touch the active
  /// tip; callers run fork choice separately via `determine_best_chain`.
  pub fn accept_block(&mut self, header: H) -> Result<BlockHash, ValidationError> {
    let hash = header.hash();
    let parent_hash = header.previous_hash();
    if !self.tree.contains(&parent_hash) {
      return Err(ValidationError::AltBadCommand("unknown parent".into()));
    }

    let ancestor_timestamps: Vec<i64> = self
      .tree
      .ancestors(parent_hash)
      .take(self.params.median_time_past_blocks)
      .filter_map(|h| self.tree.get(&h))
      .map(|idx| idx.header.timestamp())
      .collect();
    stateless::check_block_time(&header, &ancestor_timestamps, self.params.max_block_time_drift)?;

    self
      .tree
      .insert_raw(header, hash, parent_hash, AltAddon::default(), false)
      .map_err(|e| match e {
        InsertError::UnknownParent => ValidationError::AltBadCommand("unknown parent".into()),
        InsertError::ParentFailed => ValidationError::AltBadCommand("parent is failed".into()),
        InsertError::Duplicate => ValidationError::AltBadCommand("duplicate block".into()),
      })?;
    Ok(hash)
  }

  /// Attaches `pop` to `containing_hash`: learns any new VBK context
  /// blocks, registers the VTBs with the VBK tree, validates and
  /// registers the ATVs, and records every payload id on the containing
  /// block's addon. Structural, like the VBK level: it does not itself
  /// decide whether `containing_hash` becomes part of the active chain.
  ///
  /// Atomic: a failure at any step (a bad ATV, an unresolvable VBK
  /// context block, a VTB rejected by the VBK tree) restores this tree,
  /// the VBK tree, and `btc` to exactly their pre-call state before the
  /// error is returned. No partial VBK context, VTB registration, or BTC
  /// refcounter increment survives a failed call.
  pub fn add_payloads(&mut self, containing_hash: BlockHash, pop: &PopData, btc: &mut BtcTree) -> Result<(), ValidationError> {
    if !self.tree.contains(&containing_hash) {
      return Err(ValidationError::AltBadCommand("unknown containing block".into()));
    }

    let tree_snapshot = self.tree.clone();
    let vbk_snapshot = self.vbk.clone();
    let btc_snapshot = btc.clone();

    let result = (|| {
      let mut vbk_ids = Vec::new();
      for vbk_header in &pop.context {
        let hash = vbk_header.hash();
        if !self.vbk.contains(&hash) {
          self.vbk.accept_block(vbk_header.clone()).map_err(|e| e.with_context("alt pop context"))?;
        }
        vbk_ids.push(hash.into());
      }

      for vtb in &pop.vtbs {
        self.vbk.add_payloads(vtb.containing_block, std::slice::from_ref(vtb), btc)
          .map_err(|e| e.with_context(format!("vtb {}", vtb.id)))?;
      }

      let mut atv_endorsements = Vec::new();
      for atv in &pop.atvs {
        stateless::check_atv_statelessly(atv).map_err(|e| e.with_context(format!("atv {}", atv.id)))?;
        if !self.vbk.contains(&atv.block_of_proof) {
          return Err(ValidationError::AtvStatelesslyInvalid("unknown VBK block of proof".into()));
        }
        if !self.tree.contains(&atv.endorsed_hash) {
          return Err(ValidationError::AtvStatelesslyInvalid("unknown endorsed ALT block".into()));
        }
        atv_endorsements.push(Endorsement::from_atv(atv, containing_hash));
      }

      for endorsement in &atv_endorsements {
        self.tree.get_mut(&endorsement.endorsed_hash).unwrap().addon.endorsed_by.push(endorsement.id);
      }

      let idx = self.tree.get_mut(&containing_hash).unwrap();
      idx.addon.vbk_ids.extend(vbk_ids);
      idx.addon.vtb_ids.extend(pop.vtbs.iter().map(|v| v.id));
      idx.addon.atvs.extend(atv_endorsements);
      Ok(())
    })();

    if result.is_err() {
      self.tree = tree_snapshot;
      self.vbk = vbk_snapshot;
      *btc = btc_snapshot;
    }
    result
  }

  pub fn remove_payloads(&mut self, containing_hash: BlockHash, pop: &PopData, btc: &mut BtcTree) {
    for vtb in &pop.vtbs {
      self.vbk.remove_payloads(vtb.containing_block, std::slice::from_ref(vtb), btc);
    }
    if let Some(idx) = self.tree.get_mut(&containing_hash) {
      let removed_ids: Vec<_> = idx.addon.atvs.iter().map(|e| e.id).collect();
      idx.addon.atvs.clear();
      idx.addon.vtb_ids.clear();
      idx.addon.vbk_ids.clear();
      for atv in &pop.atvs {
        if removed_ids.contains(&atv.id) {
          if let Some(endorsed) = self.tree.get_mut(&atv.endorsed_hash) {
            endorsed.addon.endorsed_by.retain(|id| *id != atv.id);
          }
        }
      }
    }
  }

  /// Re-runs fork choice across all non-failed tips using the PoP-aware
  /// comparator, validating each improving candidate's payload proofs via
  /// the state machine before committing to it. A candidate whose
  /// payloads fail contextual validation is marked `FAILED_POP` and
  /// skipped in favor of the next-best tip.
  pub fn determine_best_chain(&mut self) -> Result<(), ValidationError> {
    let comparator = PopAwareComparator::new(self.params.endorsement_settlement_interval);
    loop {
      let tips: Vec<BlockHash> = self.tree.tips().copied().collect();
      let mut best = self.tree.active_tip();
      for tip in tips {
        if self.tree.get(&tip).map(|i| i.failed()).unwrap_or(true) {
          continue;
        }
        if comparator.compare(&self.tree, &self.vbk, tip, best) == Ordering::Greater {
          best = tip;
        }
      }
      if best == self.tree.active_tip() {
        return Ok(());
      }

      match self.commit_tip(best) {
        Ok(()) => return Ok(()),
        Err(_) => {
          self.tree.invalidate_subtree(best, crate::blocktree::BlockStatus::FAILED_POP);
        }
      }
    }
  }

  /// Directly compares two candidate tips with the PoP-aware comparator
  /// and, if one of them beats the tree's current active tip, commits it
  /// via the state machine. Returns `-1`/`0`/`1` for left-loses/tie/
  /// left-wins. As a documented side effect, a non-zero result leaves
  /// the active tip at the winner (of `h_left`/`h_right`), not restored
  /// to whatever it was before the call.
  pub fn compare_pop_score(&mut self, h_left: BlockHash, h_right: BlockHash) -> Result<i8, ValidationError> {
    let comparator = PopAwareComparator::new(self.params.endorsement_settlement_interval);
    let ordering = comparator.compare(&self.tree, &self.vbk, h_left, h_right);
    let (winner, result) = match ordering {
      Ordering::Equal => return Ok(0),
      Ordering::Greater => (h_left, 1i8),
      Ordering::Less => (h_right, -1i8),
    };
    self.commit_tip(winner)?;
    Ok(result)
  }

  /// Validates `candidate`'s payload proofs still resolve against the
  /// current VBK tree and, if so, switches the active tip to it via the
  /// state machine. Shared by `determine_best_chain`'s tip search and
  /// `compare_pop_score`'s direct two-way comparison.
  fn commit_tip(&mut self, candidate: BlockHash) -> Result<(), ValidationError> {
    let vbk = &self.vbk;
    statemachine::set_state(&mut self.tree, candidate, |idx| {
      for vbk_id in &idx.addon.vbk_ids {
        let v = vbk.get(&vbk_id.0).ok_or_else(|| ValidationError::AltBadCommand("missing vbk context block".into()))?;
        if v.failed() {
          return Err(ValidationError::AltBadCommand("vbk context block failed".into()));
        }
      }
      for endorsement in &idx.addon.atvs {
        let v = vbk
          .get(&endorsement.block_of_proof)
          .ok_or_else(|| ValidationError::AtvStatelesslyInvalid("vbk proof block missing".into()))?;
        if v.failed() {
          return Err(ValidationError::AtvStatelesslyInvalid("vbk proof block failed".into()));
        }
      }
      Ok(())
    })
  }
}
