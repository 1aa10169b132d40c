//! Generic, chain-agnostic block tree (spec §4.1): status flags, the
//! hash-keyed index, and structural tree operations shared by the BTC, VBK,
//! and ALT trees.

mod index;
mod status;
mod tree;

#[cfg(test)]
pub mod testkit;

pub use index::{Addon, BlockIndex};
pub use status::BlockStatus;
pub use tree::{BlockTree, InsertError};
