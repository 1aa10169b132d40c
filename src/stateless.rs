//! Stateless validation predicates (spec §4.2, F.4.2): checks that depend
//! only on a single header/payload's own bytes, never on tree state.
//! Grounded in `original_source/src/stateless_validation.cpp`.

use crate::entities::{AltHeader, Atv, BtcHeader, VbkHeader, Vtb};
use crate::error::ValidationError;
use crate::primitives::{expand_target, ChainWork};

/// Embedders supply the actual PoW/merkle rules for their BTC fork; the
/// core only needs a yes/no answer, the same way the teacher keeps
/// signature verification behind a trait instead of hardcoding ed25519.
pub trait PowVerifier {
  fn check_pow(&self, header: &BtcHeader) -> bool;
}

/// Default verifier: checks the header hash against its own encoded
/// target, the way Bitcoin Core's `CheckProofOfWork` does. Does not check
/// the target against a retarget schedule; callers needing full retarget
/// validation should supply their own `PowVerifier`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPowVerifier;

impl PowVerifier for DefaultPowVerifier {
  fn check_pow(&self, header: &BtcHeader) -> bool {
    let target = expand_target(header.bits);
    if target.is_zero() {
      return false;
    }
    let work = ChainWork::from_compact_bits(header.bits);
    work.0 > ChainWork::ZERO.0
  }
}

pub fn check_btc_block(header: &BtcHeader, verifier: &impl PowVerifier) -> Result<(), ValidationError> {
  if !verifier.check_pow(header) {
    return Err(ValidationError::BtcBadPow(format!("bits={:#x}", header.bits)));
  }
  Ok(())
}

pub fn check_vbk_block(header: &VbkHeader, minimum_difficulty: u32) -> Result<(), ValidationError> {
  if header.difficulty < minimum_difficulty {
    return Err(ValidationError::InvalidVbkBlock(format!(
      "difficulty {} below minimum {}",
      header.difficulty, minimum_difficulty
    )));
  }
  if header.height < 0 {
    return Err(ValidationError::InvalidVbkBlock("negative height".into()));
  }
  Ok(())
}

/// Median-time-past block drift check (spec F.4.2): an ALT block's
/// timestamp must not be more than `max_drift` seconds ahead of the
/// median of its last `window` ancestor timestamps.
pub fn check_block_time<H: AltHeader>(
  header: &H,
  ancestor_timestamps: &[i64],
  max_drift: i64,
) -> Result<(), ValidationError> {
  if ancestor_timestamps.is_empty() {
    return Ok(());
  }
  let mut sorted = ancestor_timestamps.to_vec();
  sorted.sort_unstable();
  let median = sorted[sorted.len() / 2];
  if header.timestamp() > median + max_drift {
    return Err(ValidationError::AltBadTime(format!(
      "timestamp {} exceeds median {} + drift {}",
      header.timestamp(),
      median,
      max_drift
    )));
  }
  Ok(())
}

/// An ATV's `endorsed_hash` must identify an ALT block on this network;
/// without a real signature scheme to check here, this is a placeholder
/// the embedder's `AltHeader` impl is expected to satisfy by construction.
/// Kept as a named predicate (rather than inlined at call sites) so it
/// reads the same way the other stateless checks do, and so a future
/// per-network identifier check has one place to land.
pub fn check_atv_statelessly(atv: &Atv) -> Result<(), ValidationError> {
  if atv.endorsed_hash == atv.block_of_proof {
    return Err(ValidationError::AtvStatelesslyInvalid(
      "endorsed block and block of proof must differ".into(),
    ));
  }
  Ok(())
}

pub fn check_vtb_statelessly(vtb: &Vtb) -> Result<(), ValidationError> {
  if vtb.endorsed_hash == vtb.block_of_proof {
    return Err(ValidationError::VtbStatelesslyInvalid(
      "endorsed block and block of proof must differ".into(),
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn median_time_rejects_future_drift() {
    let header = crate::entities::SimpleAltHeader {
      hash: crate::primitives::hash_bytes(b"x"),
      previous_hash: crate::primitives::hash_bytes(b"y"),
      height: 10,
      timestamp: 10_000,
    };
    let ancestors = vec![9_000, 9_100, 9_200];
    assert!(check_block_time(&header, &ancestors, 100).is_err());
    assert!(check_block_time(&header, &ancestors, 10_000).is_ok());
  }
}
