//! VTB: proves a VBK block was published into a BTC block.

use crate::entities::VtbId;
use crate::primitives::BlockHash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vtb {
  pub id: VtbId,
  /// VBK block being endorsed into BTC.
  pub endorsed_hash: BlockHash,
  /// VBK block that contains this VTB (spec §4.4 step 3 refers to this as
  /// `vtb.containingBlock`).
  pub containing_block: BlockHash,
  /// BTC block the publication proof is anchored to.
  pub block_of_proof: BlockHash,
}
