//! ALT tree (spec §4.4): the protected chain, fork-resolved through the
//! PoP-aware comparator instead of raw chain length. Top rung of the
//! three-tree hierarchy.

mod addon;
mod payout;
mod tree;

pub use addon::AltAddon;
pub use payout::{get_pop_payout, PopPayout};
pub use tree::AltTree;
