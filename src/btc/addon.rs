use crate::blocktree::Addon;
use crate::primitives::ChainWork;
use serde::{Deserialize, Serialize};

/// BTC blocks carry no payloads of their own; their only chain-specific
/// state is the running cumulative work used to pick the best tip and the
/// refcounter that keeps VTB-referenced anchors from being pruned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BtcAddon {
  pub cumulative_work: ChainWork,
  pub ref_counter: u32,
}

impl Addon for BtcAddon {}
