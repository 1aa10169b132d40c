//! The abstracted endorsement record: "block X is endorsed by containing
//! block Y, with proof at block Z". Both VTB-carried (VBK→BTC)
//! and ATV-carried (ALT→VBK) endorsements are represented by this one
//! quadruple; the two payload kinds only differ in how they are
//! constructed (`Endorsement::from_vtb` / `Endorsement::from_atv`).

use crate::entities::{Atv, Vtb};
use crate::primitives::BlockHash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement<Id> {
  pub id: Id,
  /// Hash of the block being endorsed.
  pub endorsed_hash: BlockHash,
  /// Hash of the block that carries the payload (on the same chain as the
  /// endorsed block).
  pub containing_hash: BlockHash,
  /// Hash of the block, on the chain below, where the proof is anchored.
  pub block_of_proof: BlockHash,
  /// Payout-script bytes the endorser wants credited (only meaningful for
  /// ATV-carried endorsements; empty for VTBs, which never contribute to
  /// `getPopPayout`).
  pub payout_info: Vec<u8>,
}

impl Endorsement<crate::entities::VtbId> {
  pub fn from_vtb(vtb: &Vtb, containing_hash: BlockHash) -> Self {
    Endorsement {
      id: vtb.id,
      endorsed_hash: vtb.endorsed_hash,
      containing_hash,
      block_of_proof: vtb.block_of_proof,
      payout_info: Vec::new(),
    }
  }
}

impl Endorsement<crate::entities::AtvId> {
  pub fn from_atv(atv: &Atv, containing_hash: BlockHash) -> Self {
    Endorsement {
      id: atv.id,
      endorsed_hash: atv.endorsed_hash,
      containing_hash,
      block_of_proof: atv.block_of_proof,
      payout_info: atv.payout_info.clone(),
    }
  }
}
