//! Payload source trait (spec §4.8): decouples the mempool/state machine
//! from however an embedder actually stores ATVs/VTBs/VBK blocks.

use crate::entities::{Atv, PopData, VbkBlock, Vtb};
use crate::error::CoreError;
use crate::primitives::BlockHash;

pub trait PayloadsProvider {
  fn get_atvs(&self, ids: &[BlockHash]) -> Result<Vec<Atv>, CoreError>;
  fn get_vtbs(&self, ids: &[BlockHash]) -> Result<Vec<Vtb>, CoreError>;
  fn get_vbks(&self, ids: &[BlockHash]) -> Result<Vec<VbkBlock>, CoreError>;

  /// Every payload attached to an ALT block, in wire order.
  fn get_pop_data(&self, containing_hash: BlockHash) -> Result<PopData, CoreError>;
}
