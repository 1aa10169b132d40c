//! Proof-of-Proof cross-chain security protocol engine: three interlocked
//! block trees (ALT/VBK/BTC), a PoP state machine, a PoP-aware
//! fork-resolution comparator, and a mempool/`PopData` assembler.
//!
//! `PopContext` is the single entry point embedders drive; everything
//! else in this crate is reachable through it or usable standalone for
//! an embedder that wants finer control over one tree at a time.

pub mod alt;
pub mod blocktree;
pub mod btc;
pub mod comparator;
pub mod config;
pub mod entities;
pub mod error;
pub mod mempool;
pub mod payloads;
pub mod primitives;
pub mod stateless;
pub mod statemachine;
pub mod storage;
pub mod vbk;

/// Header/params builders shared by this crate's own unit tests and by
/// `tests/`'s cross-module scenarios. Not behind `cfg(test)`: the
/// `tests/` integration binaries depend on `pop_core` as an ordinary
/// library crate, where `cfg(test)` does not apply.
pub mod testkit;

use crate::alt::AltTree;
use crate::btc::BtcTree;
use crate::config::{AltParams, BtcParams, VbkParams};
use crate::entities::{AltHeader, PopData};
use crate::error::{CoreError, ValidationError};
use crate::mempool::{MemPool, PopDataAssembler};
use crate::primitives::BlockHash;
use crate::stateless::PowVerifier;
use crate::vbk::VbkTree;

/// Top-level facade gluing the three trees, the mempool, and fork choice
/// together (spec §2/F.2.1), grounded in the teacher's `Blockchain` type
/// in spirit: a single owner of consensus state that the rest of an
/// embedder's node talks to instead of reaching into the trees directly.
pub struct PopContext<H: AltHeader> {
  btc: BtcTree,
  alt: AltTree<H>,
  mempool: MemPool,
  poisoned: bool,
}

impl<H: AltHeader> PopContext<H> {
  pub fn new(
    btc_genesis: crate::entities::BtcHeader,
    btc_genesis_height: i32,
    btc_params: BtcParams,
    vbk_genesis: crate::entities::VbkHeader,
    vbk_params: VbkParams,
    alt_genesis: H,
    alt_params: AltParams,
  ) -> Self {
    let btc = BtcTree::bootstrap(btc_genesis, btc_genesis_height, btc_params);
    let vbk = VbkTree::bootstrap(vbk_genesis, vbk_params);
    let alt = AltTree::bootstrap(alt_genesis, vbk, alt_params);
    PopContext { btc, alt, mempool: MemPool::new(), poisoned: false }
  }

  fn check_poisoned(&self) -> Result<(), CoreError> {
    if self.poisoned {
      return Err(CoreError::Poisoned);
    }
    Ok(())
  }

  pub fn accept_btc_block(
    &mut self,
    header: crate::entities::BtcHeader,
    verifier: &impl PowVerifier,
  ) -> Result<BlockHash, ValidationError> {
    self.btc.accept_block(header, verifier)
  }

  pub fn accept_vbk_block(&mut self, header: crate::entities::VbkHeader) -> Result<BlockHash, ValidationError> {
    self.alt.vbk_mut().accept_block(header)
  }

  pub fn accept_alt_block(&mut self, header: H) -> Result<BlockHash, ValidationError> {
    self.alt.accept_block(header)
  }

  /// Attaches `pop` to `containing_hash` and re-runs fork choice. A
  /// rejected payload is returned as a recoverable `ValidationError`; the
  /// only way this poisons the context is if fork choice itself hits an
  /// invariant it cannot recover from (two tips with no common ancestor),
  /// which never happens on a tree grown from a single genesis (spec §7).
  pub fn add_pop_payloads(&mut self, containing_hash: BlockHash, pop: &PopData) -> Result<(), ValidationError> {
    self.check_poisoned().map_err(|_| ValidationError::AltBadCommand("context poisoned".into()))?;
    self.alt.add_payloads(containing_hash, pop, &mut self.btc)?;
    if let Err(e) = self.alt.determine_best_chain() {
      self.poisoned = true;
      return Err(e.with_context("determine best chain"));
    }
    Ok(())
  }

  pub fn remove_pop_payloads(&mut self, containing_hash: BlockHash, pop: &PopData) {
    self.alt.remove_payloads(containing_hash, pop, &mut self.btc);
  }

  pub fn submit_atv(&mut self, atv: crate::entities::Atv) -> Result<(), ValidationError> {
    self.mempool.submit_atv(atv)
  }

  pub fn submit_vtb(&mut self, vtb: crate::entities::Vtb) -> Result<(), ValidationError> {
    self.mempool.submit_vtb(vtb)
  }

  pub fn submit_vbk(&mut self, vbk: crate::entities::VbkBlock) -> Result<(), ValidationError> {
    self.mempool.submit_vbk(vbk)
  }

  /// Assembles a `PopData` for the next ALT block from whatever the
  /// mempool currently holds. Trial-applies candidate VBK context against
  /// the live VBK tree to test connectivity and settlement-window
  /// duplication, then rolls all of it back — the tree is unaffected by
  /// calling this.
  pub fn get_pop(&mut self) -> PopData {
    let max_items = self.alt.params().max_pop_data_per_block;
    PopDataAssembler::get_pop(&self.mempool, self.alt.vbk_mut(), max_items)
  }

  /// Directly compares two ALT blocks with the PoP-aware comparator,
  /// moving the active tip to whichever one wins. Returns `-1`/`0`/`1` for
  /// left-loses/tie/left-wins.
  pub fn compare_pop_score(&mut self, h_left: BlockHash, h_right: BlockHash) -> Result<i8, ValidationError> {
    self.alt.compare_pop_score(h_left, h_right)
  }

  pub fn get_pop_payout(&self, tip: BlockHash, base_reward: f64) -> Vec<crate::alt::PopPayout> {
    crate::alt::get_pop_payout(self.alt_tree(), self.alt.vbk(), self.alt.params(), tip, base_reward)
  }

  pub fn alt_tip(&self) -> BlockHash {
    self.alt.active_tip()
  }

  pub fn btc_tip(&self) -> BlockHash {
    self.btc.active_tip()
  }

  pub fn vbk_tip(&self) -> BlockHash {
    self.alt.vbk().active_tip()
  }

  fn alt_tree(&self) -> &blocktree::BlockTree<H, alt::AltAddon> {
    // `AltTree` doesn't expose its inner `BlockTree` publicly outside the
    // crate; `get_pop_payout` is a free function over that type, so this
    // narrow accessor exists purely to bridge the two within the crate.
    self.alt.inner()
  }
}
