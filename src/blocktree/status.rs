//! Bitwise block-index status flags (spec §3).

use bitflags::bitflags;

bitflags! {
  #[derive(Default, serde::Serialize, serde::Deserialize)]
  pub struct BlockStatus: u32 {
    /// Header and (if applicable) PoW/merkle-root checks passed.
    const VALID_TREE     = 0b0000_0001;
    /// Header or work itself is invalid.
    const FAILED_BLOCK   = 0b0000_0010;
    /// One or more contained payloads are invalid under the current
    /// active-chain state.
    const FAILED_POP     = 0b0000_0100;
    /// An ancestor is `FAILED_BLOCK` or `FAILED_POP` (transitive).
    const FAILED_CHILD   = 0b0000_1000;
    /// This block's commands are part of the active tree state right now.
    const APPLIED        = 0b0001_0000;
    /// This block has been successfully applied at least once.
    const CAN_BE_APPLIED = 0b0010_0000;
  }
}

impl BlockStatus {
  pub fn is_failed(self) -> bool {
    self.intersects(BlockStatus::FAILED_BLOCK | BlockStatus::FAILED_POP | BlockStatus::FAILED_CHILD)
  }
}
