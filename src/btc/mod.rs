//! BTC block tree (spec §4.2): pure proof-of-work, no payloads. The
//! bottom rung of the three-tree hierarchy; VBK anchors its VTBs here.

mod addon;
mod tree;

pub use addon::BtcAddon;
pub use tree::BtcTree;
