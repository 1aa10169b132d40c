use crate::blocktree::Addon;
use crate::entities::VtbId;
use crate::primitives::ChainWork;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VbkAddon {
  pub cumulative_work: ChainWork,
  /// Incremented once per ATV whose `block_of_proof` is this VBK block,
  /// protecting it from `removeSubtree` while an ALT endorsement still
  /// anchors here (spec §3 invariant 6).
  pub ref_counter: u32,
  /// VTBs whose `endorsed_hash` is this block, i.e. proofs that this VBK
  /// block was published into BTC.
  pub endorsed_by: Vec<VtbId>,
  /// VTBs physically carried by this block (`containing_block == this`).
  pub vtb_ids: Vec<VtbId>,
}

impl Addon for VbkAddon {}
