//! Minimal header builders shared by this crate's integration tests,
//! mirroring the teacher's own `src/test` fixtures module.

use crate::config::{AltParams, BtcParams, PayoutCurvePoint, VbkParams};
use crate::entities::{BtcHeader, SimpleAltHeader, VbkHeader, VbkMerkleRoot};
use crate::primitives::{hash_bytes, VbkPreviousBlockHash};

pub fn btc_genesis() -> BtcHeader {
  BtcHeader {
    version: 1,
    previous_block: hash_bytes(b"btc-genesis-parent"),
    merkle_root: hash_bytes(b"btc-genesis-root"),
    timestamp: 0,
    bits: 0x207f_ffff,
    nonce: 0,
  }
}

pub fn btc_child(parent: &BtcHeader, nonce: u32) -> BtcHeader {
  BtcHeader {
    version: 1,
    previous_block: parent.hash(),
    merkle_root: parent.merkle_root,
    timestamp: parent.timestamp + 600,
    bits: parent.bits,
    nonce,
  }
}

pub fn btc_params() -> BtcParams {
  BtcParams { pow_limit: 0x207f_ffff, retarget_interval: 2016, retarget_period_seconds: 1_209_600 }
}

pub fn vbk_genesis() -> VbkHeader {
  VbkHeader {
    height: 0,
    version: 2,
    previous_block: VbkPreviousBlockHash([0u8; 12]),
    merkle_root: VbkMerkleRoot([0u8; 16]),
    timestamp: 0,
    difficulty: 1,
    nonce: 0,
  }
}

pub fn vbk_child(parent: &VbkHeader, nonce: u64) -> VbkHeader {
  VbkHeader {
    height: parent.height + 1,
    version: 2,
    previous_block: VbkPreviousBlockHash::truncate(&parent.hash()),
    merkle_root: parent.merkle_root,
    timestamp: parent.timestamp + 30,
    difficulty: parent.difficulty,
    nonce,
  }
}

pub fn vbk_params() -> VbkParams {
  VbkParams { network_magic: 1, minimum_difficulty: 1, settlement_interval: 400 }
}

pub fn alt_genesis() -> SimpleAltHeader {
  SimpleAltHeader { hash: hash_bytes(b"alt-genesis"), previous_hash: hash_bytes(b"alt-none"), height: 0, timestamp: 0 }
}

pub fn alt_child(parent: &SimpleAltHeader, salt: &[u8]) -> SimpleAltHeader {
  let mut seed = bincode::serialize(&parent.hash).expect("BlockHash is always serializable");
  seed.extend_from_slice(salt);
  SimpleAltHeader {
    hash: hash_bytes(&seed),
    previous_hash: parent.hash,
    height: parent.height + 1,
    timestamp: parent.timestamp + 60,
  }
}

pub fn alt_params() -> AltParams {
  AltParams {
    network_id: 1,
    endorsement_settlement_interval: 400,
    payout_delay: 50,
    payout_window_size: 20,
    max_pop_data_per_block: 64,
    max_block_time_drift: 600,
    median_time_past_blocks: 11,
    payout_curve: vec![
      PayoutCurvePoint { ratio: 0.0, multiplier: 0.0 },
      PayoutCurvePoint { ratio: 1.0, multiplier: 1.0 },
      PayoutCurvePoint { ratio: 3.0, multiplier: 1.5 },
    ],
  }
}
