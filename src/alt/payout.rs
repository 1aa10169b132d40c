//! Endorsement payout calculation: rewards whoever an endorsement names
//! in its payout script for endorsements that settled within an ALT
//! block's payout window, scaled by how much harder the endorsing (VBK)
//! proof was relative to the endorsed ALT block's own difficulty.

use std::collections::HashMap;

use crate::alt::AltAddon;
use crate::blocktree::BlockTree;
use crate::config::AltParams;
use crate::entities::AltHeader;
use crate::primitives::BlockHash;
use crate::vbk::VbkTree;

#[derive(Debug, Clone, PartialEq)]
pub struct PopPayout {
  /// Payout-script bytes the reward is owed to.
  pub payout_info: Vec<u8>,
  pub amount: f64,
}

/// Walks back from `tip` by `payout_delay`, then scans `payout_window_size`
/// blocks for endorsements whose payout is due, scaling each by the
/// configured difficulty-ratio curve and summing same-script rewards
/// together. Ties in the returned ordering are broken by (amount desc,
/// representative proof hash asc).
pub fn get_pop_payout<H: AltHeader>(
  tree: &BlockTree<H, AltAddon>,
  vbk: &VbkTree,
  params: &AltParams,
  tip: BlockHash,
  base_reward: f64,
) -> Vec<PopPayout> {
  let tip_height = match tree.get(&tip) {
    Some(idx) => idx.height,
    None => return Vec::new(),
  };
  let window_end = tip_height - params.payout_delay as i32;
  let window_start = window_end - params.payout_window_size as i32;

  // Keyed by payout script; value accumulates the total reward and keeps
  // the lexicographically smallest VBK proof hash seen for that script,
  // used only to break ties deterministically in the final ordering.
  let mut by_script: HashMap<Vec<u8>, (f64, BlockHash)> = HashMap::new();

  for h in tree.ancestors(tip) {
    let idx = match tree.get(&h) {
      Some(i) => i,
      None => continue,
    };
    if idx.height < window_start {
      break;
    }
    if idx.height > window_end {
      continue;
    }
    for endorsement in &idx.addon.atvs {
      let endorsed = match tree.get(&endorsement.endorsed_hash) {
        Some(e) => e,
        None => continue,
      };
      let proof_work = match vbk.get(&endorsement.block_of_proof) {
        Some(proof) => proof.addon.cumulative_work.0.low_u64() as f64,
        None => continue,
      };
      let ratio = endorsed.header.difficulty() / proof_work.max(f64::EPSILON);
      let amount = base_reward * params.payout_multiplier(ratio);

      let entry = by_script
        .entry(endorsement.payout_info.clone())
        .or_insert((0.0, endorsement.block_of_proof));
      entry.0 += amount;
      if endorsement.block_of_proof.digest() < entry.1.digest() {
        entry.1 = endorsement.block_of_proof;
      }
    }
  }

  let mut payouts: Vec<(Vec<u8>, f64, BlockHash)> =
    by_script.into_iter().map(|(info, (amount, vbk_hash))| (info, amount, vbk_hash)).collect();
  payouts.sort_by(|a, b| {
    b.1
      .partial_cmp(&a.1)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then_with(|| a.2.digest().cmp(b.2.digest()))
  });

  payouts.into_iter().map(|(payout_info, amount, _)| PopPayout { payout_info, amount }).collect()
}
