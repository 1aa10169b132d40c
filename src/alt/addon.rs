use crate::blocktree::Addon;
use crate::entities::{AtvId, Endorsement, VbkId, VtbId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AltAddon {
  /// VBK context blocks this ALT block's `PopData` introduced.
  pub vbk_ids: Vec<VbkId>,
  /// VTBs this ALT block's `PopData` carried (already registered with the
  /// VBK tree by the time this is populated).
  pub vtb_ids: Vec<VtbId>,
  /// ATVs physically carried by this block, full record so the state
  /// machine can re-validate each `block_of_proof` on every reorg without
  /// a second lookup table.
  pub atvs: Vec<Endorsement<AtvId>>,
  /// ATVs whose `endorsed_hash` is this block, i.e. proofs that this ALT
  /// block was published into VBK.
  pub endorsed_by: Vec<AtvId>,
}

impl Addon for AltAddon {}
