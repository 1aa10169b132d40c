//! 256-bit cumulative chain work, as tracked on BTC and VBK indices.
//!
//! The teacher's PoS chain has no notion of work (`consensus::chain::Chain`
//! picks a head by vote weight, not accumulated difficulty), so this is
//! pulled in from the pack's `polkadot-sdk` examples, which depend on
//! `primitive-types` for fixed-width integers of this shape.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ChainWork(pub U256);

impl ChainWork {
  pub const ZERO: ChainWork = ChainWork(U256::zero());

  pub fn from_compact_bits(bits: u32) -> Self {
    ChainWork(expand_work(bits))
  }

  pub fn checked_add(self, other: ChainWork) -> Option<ChainWork> {
    self.0.checked_add(other.0).map(ChainWork)
  }
}

impl fmt::Display for ChainWork {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:#x}", self.0)
  }
}

impl std::ops::Add for ChainWork {
  type Output = ChainWork;
  fn add(self, rhs: ChainWork) -> ChainWork {
    ChainWork(self.0 + rhs.0)
  }
}

/// Converts a compact PoW target ("bits") into the work contributed by a
/// single block at that difficulty: `work = 2**256 / (target + 1)`.
/// Matches Bitcoin's `GetBlockProof`.
fn expand_work(bits: u32) -> U256 {
  let target = expand_target(bits);
  if target.is_zero() {
    return U256::zero();
  }
  // 2**256 - 1, since U256 cannot represent 2**256 directly.
  let max = U256::MAX;
  (max - target) / (target + U256::one()) + U256::one()
}

/// Decodes the compact "nBits" representation into a full 256-bit target.
pub fn expand_target(bits: u32) -> U256 {
  let exponent = (bits >> 24) as u32;
  let mantissa = bits & 0x007f_ffff;
  if exponent <= 3 {
    U256::from(mantissa >> (8 * (3 - exponent)))
  } else {
    U256::from(mantissa) << (8 * (exponent - 3))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn work_increases_as_bits_tighten() {
    let easy = ChainWork::from_compact_bits(0x1d00_ffff);
    let hard = ChainWork::from_compact_bits(0x1c00_ffff);
    assert!(hard.0 > easy.0);
  }

  #[test]
  fn work_is_additive() {
    let a = ChainWork::from_compact_bits(0x1d00_ffff);
    let b = ChainWork::from_compact_bits(0x1d00_ffff);
    let sum = a.checked_add(b).unwrap();
    assert_eq!(sum, a + b);
    assert!(sum.0 > a.0);
  }
}
