//! `getPop`: assembles a `PopData` for the next ALT block from whatever
//! the mempool currently holds. Reconstructs the VBK context each picked
//! VTB/ATV needs by walking the mempool's own pending VBK blocks back to
//! wherever they connect to the real tree, trial-applies that context
//! (and, for VTBs, the settlement-window bookkeeping) against the real
//! `VbkTree`, and rolls every bit of it back before returning — so a
//! caller can assemble speculatively as often as it likes without ever
//! committing anything.
//!
//! This does not synthesize a hypothetical containing ALT block to
//! trial-apply against: the ALT header type is an opaque generic this
//! module never sees one of. What actually needs probing — does the VBK
//! context connect, is a VTB a duplicate endorsement within the
//! settlement window — only touches the VBK tree, so that's as far as
//! the trial application reaches.

use std::collections::{HashMap, HashSet};

use crate::entities::{Atv, Vtb, VtbId};
use crate::mempool::MemPool;
use crate::primitives::{BlockHash, VbkPreviousBlockHash};
use crate::vbk::VbkTree;

pub struct PopDataAssembler;

enum Candidate {
  Vtb(Vtb),
  Atv(Atv),
}

impl PopDataAssembler {
  /// Orders pending payloads by their VBK anchor height ascending, then
  /// for each one (until `max_items` total items are collected): resolves
  /// the chain of pending VBK headers needed to connect its anchor to the
  /// real tree, trial-inserts that chain, and either keeps the payload
  /// (recording its context) or drops it if the chain doesn't resolve, or
  /// — for a VTB — if it would duplicate an endorsement already settled
  /// on the same chain within the settlement window. Every trial
  /// insertion is undone before returning.
  pub fn get_pop(mempool: &MemPool, vbk: &mut VbkTree, max_items: usize) -> crate::entities::PopData {
    let mut pop = crate::entities::PopData::default();
    if max_items == 0 {
      return pop;
    }

    let pending_by_hash: HashMap<BlockHash, crate::entities::VbkBlock> =
      mempool.pending_vbks().map(|b| (b.hash(), b.clone())).collect();

    let anchor_height = |vbk: &VbkTree, hash: BlockHash| -> Option<i32> {
      vbk.get(&hash).map(|i| i.height).or_else(|| pending_by_hash.get(&hash).map(|b| b.height))
    };

    let mut candidates: Vec<(i32, Candidate)> = Vec::new();
    for vtb in mempool.pending_vtbs() {
      if let Some(h) = anchor_height(vbk, vtb.containing_block) {
        candidates.push((h, Candidate::Vtb(vtb.clone())));
      }
    }
    for atv in mempool.pending_atvs() {
      if let Some(h) = anchor_height(vbk, atv.block_of_proof) {
        candidates.push((h, Candidate::Atv(atv.clone())));
      }
    }
    candidates.sort_by_key(|(h, _)| *h);

    let mut inserted_context: Vec<BlockHash> = Vec::new();
    let mut context_included: HashSet<BlockHash> = HashSet::new();
    let mut trial_vtb_attachments: Vec<(BlockHash, VtbId)> = Vec::new();

    for (_, candidate) in candidates {
      if pop.len() >= max_items {
        break;
      }
      let anchor = match &candidate {
        Candidate::Vtb(v) => v.containing_block,
        Candidate::Atv(a) => a.block_of_proof,
      };

      let chain = match reachable_context(vbk, &pending_by_hash, anchor) {
        Some(c) => c,
        None => continue,
      };

      let mut newly_inserted = Vec::new();
      let mut chain_ok = true;
      for block in &chain {
        let hash = block.hash();
        if vbk.contains(&hash) {
          continue;
        }
        match vbk.accept_block(block.clone()) {
          Ok(h) => newly_inserted.push(h),
          Err(_) => {
            chain_ok = false;
            break;
          }
        }
      }
      if !chain_ok {
        for h in newly_inserted.iter().rev() {
          vbk.remove_trial(*h);
        }
        continue;
      }

      for h in &newly_inserted {
        if context_included.insert(*h) {
          if let Some(b) = pending_by_hash.get(h) {
            pop.context.push(b.clone());
          }
        }
      }
      inserted_context.extend(newly_inserted);

      match candidate {
        Candidate::Vtb(vtb) => {
          if vbk.is_duplicate_endorsement(vtb.containing_block, vtb.id) {
            continue;
          }
          vbk.trial_attach_vtb(vtb.containing_block, vtb.id);
          trial_vtb_attachments.push((vtb.containing_block, vtb.id));
          pop.vtbs.push(vtb);
        }
        Candidate::Atv(atv) => {
          pop.atvs.push(atv);
        }
      }
    }

    for (containing, id) in trial_vtb_attachments.into_iter().rev() {
      vbk.untrial_attach_vtb(containing, id);
    }
    for hash in inserted_context.into_iter().rev() {
      vbk.remove_trial(hash);
    }

    pop
  }
}

/// Walks back from `anchor` through the mempool's pending VBK blocks
/// (oldest first) until reaching one whose `previous_block` already
/// resolves in `vbk`, or returns `None` if the chain runs out without
/// connecting. An anchor already known to `vbk` needs no context at all.
fn reachable_context(
  vbk: &VbkTree,
  pending_by_hash: &HashMap<BlockHash, crate::entities::VbkBlock>,
  anchor: BlockHash,
) -> Option<Vec<crate::entities::VbkBlock>> {
  if vbk.contains(&anchor) {
    return Some(Vec::new());
  }
  let mut chain = Vec::new();
  let mut current = anchor;
  for _ in 0..=pending_by_hash.len() {
    let block = pending_by_hash.get(&current)?.clone();
    let prev = block.previous_block;
    chain.push(block);
    if vbk.contains_previous(prev) {
      chain.reverse();
      return Some(chain);
    }
    current = pending_by_hash
      .keys()
      .copied()
      .find(|h| VbkPreviousBlockHash::truncate(h) == prev)?;
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entities::{VbkHeader, VbkMerkleRoot};
  use crate::primitives::hash_bytes;

  fn params() -> crate::config::VbkParams {
    crate::config::VbkParams { network_magic: 1, minimum_difficulty: 1, settlement_interval: 400 }
  }

  fn vbk_genesis() -> VbkHeader {
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

  #[test]
  fn drops_payloads_with_unresolvable_context() {
    let mut mempool = MemPool::new();
    let atv = Atv {
      id: hash_bytes(b"atv").into(),
      endorsed_hash: hash_bytes(b"alt-block"),
      block_of_proof: hash_bytes(b"unknown-vbk"),
      payout_info: Vec::new(),
    };
    mempool.submit_atv(atv).unwrap();

    let mut vbk = VbkTree::bootstrap(vbk_genesis(), params());
    let pop = PopDataAssembler::get_pop(&mempool, &mut vbk, 10);
    assert!(pop.atvs.is_empty());
  }

  #[test]
  fn pulls_in_pending_vbk_context_for_a_vtb() {
    let mut mempool = MemPool::new();
    let g = vbk_genesis();
    let mut vbk = VbkTree::bootstrap(g.clone(), params());

    let pending = VbkHeader {
      height: 1,
      version: 2,
      previous_block: VbkPreviousBlockHash::truncate(&g.hash()),
      merkle_root: VbkMerkleRoot([0u8; 16]),
      timestamp: 30,
      difficulty: 1,
      nonce: 1,
    };
    let pending_hash = pending.hash();
    mempool.submit_vbk(pending.clone()).unwrap();

    let vtb = crate::entities::Vtb {
      id: hash_bytes(b"vtb").into(),
      endorsed_hash: g.hash(),
      containing_block: pending_hash,
      block_of_proof: hash_bytes(b"btc-proof"),
    };
    mempool.submit_vtb(vtb).unwrap();

    let pop = PopDataAssembler::get_pop(&mempool, &mut vbk, 10);
    assert_eq!(pop.vtbs.len(), 1);
    assert_eq!(pop.context.len(), 1);
    assert_eq!(pop.context[0].hash(), pending_hash);

    // the trial context/attachment must have been rolled back.
    assert!(!vbk.contains(&pending_hash));
  }

  #[test]
  fn drops_duplicate_endorsement_within_settlement_window() {
    let mut mempool = MemPool::new();
    let g = vbk_genesis();
    let mut vbk = VbkTree::bootstrap(g.clone(), params());

    let btc_params = crate::config::BtcParams { pow_limit: 0x207f_ffff, retarget_interval: 2016, retarget_period_seconds: 1_209_600 };
    let btc_genesis = crate::entities::BtcHeader {
      version: 1,
      previous_block: hash_bytes(b"none"),
      merkle_root: hash_bytes(b"root"),
      timestamp: 0,
      bits: 0x207f_ffff,
      nonce: 0,
    };
    let mut btc = crate::btc::BtcTree::bootstrap(btc_genesis.clone(), 0, btc_params);
    let btc_hash = btc
      .accept_block(
        crate::entities::BtcHeader { previous_block: btc_genesis.hash(), nonce: 7, ..btc_genesis.clone() },
        &crate::stateless::DefaultPowVerifier,
      )
      .unwrap();

    let vtb_id: VtbId = hash_bytes(b"vtb-dup").into();
    let already_settled = crate::entities::Vtb { id: vtb_id, endorsed_hash: g.hash(), containing_block: g.hash(), block_of_proof: btc_hash };
    vbk.add_payloads(g.hash(), &[already_settled], &mut btc).unwrap();

    // a later block on the same chain carries a pending VTB with the same
    // id — the mempool itself has never seen this id before, so only the
    // assembler's settlement-window scan against the real tree catches it.
    let c = VbkHeader {
      height: 1,
      version: 2,
      previous_block: VbkPreviousBlockHash::truncate(&g.hash()),
      merkle_root: VbkMerkleRoot([0u8; 16]),
      timestamp: 30,
      difficulty: 1,
      nonce: 1,
    };
    let c_hash = vbk.accept_block(c).unwrap();
    let reused_id_vtb = crate::entities::Vtb { id: vtb_id, endorsed_hash: g.hash(), containing_block: c_hash, block_of_proof: btc_hash };
    // this id was already registered on an ancestor (`g`) within the
    // settlement window, so the mempool-level assembler must drop it even
    // though nothing rejected the raw submission.
    mempool.submit_vtb(reused_id_vtb).unwrap();

    let pop = PopDataAssembler::get_pop(&mempool, &mut vbk, 10);
    assert!(pop.vtbs.is_empty());
  }
}
