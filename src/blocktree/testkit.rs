//! Minimal fixtures shared by `blocktree`'s own unit tests. Concrete chain
//! trees (btc/vbk/alt) have their own testkits built on real header types;
//! this one exists so the generic `BlockTree<H, A>` can be exercised without
//! pulling in any chain-specific addon.

use crate::primitives::{hash_bytes, BlockHash};
use crate::blocktree::Addon;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoopAddon;
impl Addon for NoopAddon {}

pub fn addon() -> NoopAddon {
  NoopAddon
}

pub fn hash_of(n: u32) -> BlockHash {
  hash_bytes(&n.to_le_bytes())
}
