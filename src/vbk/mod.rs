//! VBK block tree (spec §4.3): proof-of-work tree carrying VTBs that
//! endorse its own blocks into BTC. Middle rung of the three-tree
//! hierarchy.

mod addon;
mod tree;

pub use addon::VbkAddon;
pub use tree::VbkTree;
