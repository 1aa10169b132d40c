//! Mempool (spec §4.8): holds payloads an embedder has submitted but that
//! haven't yet been attached to an ALT block, rejecting duplicates
//! up front via the shared `PayloadsIndex`.

mod assembler;

pub use assembler::PopDataAssembler;

use crate::entities::{Atv, AtvId, VbkBlock, VbkId, Vtb, VtbId};
use crate::error::ValidationError;
use crate::payloads::PayloadsIndex;
use crate::stateless;
use indexmap::IndexMap;

#[derive(Default)]
pub struct MemPool {
  atvs: IndexMap<AtvId, Atv>,
  vtbs: IndexMap<VtbId, Vtb>,
  vbks: IndexMap<VbkId, VbkBlock>,
  index: PayloadsIndex,
}

impl MemPool {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn submit_atv(&mut self, atv: Atv) -> Result<(), ValidationError> {
    stateless::check_atv_statelessly(&atv)?;
    if self.index.is_known(&atv.id.0) || self.atvs.contains_key(&atv.id) {
      return Err(ValidationError::MempoolAdd("atv", "duplicate endorsement".into()));
    }
    self.atvs.insert(atv.id, atv);
    Ok(())
  }

  pub fn submit_vtb(&mut self, vtb: Vtb) -> Result<(), ValidationError> {
    stateless::check_vtb_statelessly(&vtb)?;
    if self.index.is_known(&vtb.id.0) || self.vtbs.contains_key(&vtb.id) {
      return Err(ValidationError::MempoolAdd("vtb", "duplicate endorsement".into()));
    }
    self.vtbs.insert(vtb.id, vtb);
    Ok(())
  }

  pub fn submit_vbk(&mut self, vbk: VbkBlock) -> Result<(), ValidationError> {
    let id: VbkId = vbk.hash().into();
    if self.vbks.contains_key(&id) {
      return Err(ValidationError::MempoolAdd("vbk", "already pending".into()));
    }
    self.vbks.insert(id, vbk);
    Ok(())
  }

  /// Called once a payload has actually been attached to an ALT block,
  /// so it stops being offered by future `getPop` calls and duplicate
  /// submissions of the same id are rejected from then on.
  pub fn mark_included(&mut self, containing_hash: crate::primitives::BlockHash, atv_ids: &[AtvId], vtb_ids: &[VtbId], vbk_ids: &[VbkId]) {
    for id in atv_ids {
      self.atvs.shift_remove(id);
      self.index.add(id.0, containing_hash);
    }
    for id in vtb_ids {
      self.vtbs.shift_remove(id);
      self.index.add(id.0, containing_hash);
    }
    for id in vbk_ids {
      self.vbks.shift_remove(id);
      self.index.add(id.0, containing_hash);
    }
  }

  pub fn pending_atvs(&self) -> impl Iterator<Item = &Atv> {
    self.atvs.values()
  }

  pub fn pending_vtbs(&self) -> impl Iterator<Item = &Vtb> {
    self.vtbs.values()
  }

  pub fn pending_vbks(&self) -> impl Iterator<Item = &VbkBlock> {
    self.vbks.values()
  }

  pub fn len(&self) -> usize {
    self.atvs.len() + self.vtbs.len() + self.vbks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
