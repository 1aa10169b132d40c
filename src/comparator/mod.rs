//! PoP-aware fork-resolution comparator: scores two ALT tips by the
//! key points their endorsements plant in the protecting (VBK) chain,
//! rather than by chain length alone, so a shorter but better-endorsed
//! fork can outrank a longer one.
//!
//! A key point is the pair `(endorsedHeight, proofDepth)` for one
//! endorsement on a tip's unique suffix past the two tips' common
//! ancestor: `endorsedHeight` is how far back on the *ALT* side the
//! endorsed block sits, `proofDepth` is how many VBK blocks now sit on
//! top of the block the endorsement proof anchors to. Earlier
//! endorsements (lower `endorsedHeight`) matter more than later ones;
//! among endorsements at the same height, a deeper proof (more VBK
//! confirmations) matters more. The two tips' key-point lists are
//! compared position by position under that rule; the first point of
//! difference decides, falling back to ALT height and then lexicographic
//! hash if the lists tie entirely.
//!
//! Depth is read off the VBK tree's *current* active tip rather than by
//! switching its state to each candidate side in turn and re-reading from
//! there — recorded as a deliberate simplification in `DESIGN.md`, since
//! `block_of_proof` itself never moves and candidates here are always
//! compared against one shared, already-settled protecting chain.
//!
//! Comparison is inherently non-transitive: `compare(a, b)` only ever
//! looks at the two chains' unique suffixes past their own `lca`, never
//! at a third chain, so `a > b` and `b > c` do not imply `a > c`.

use crate::alt::AltAddon;
use crate::blocktree::BlockTree;
use crate::entities::AltHeader;
use crate::primitives::BlockHash;
use crate::vbk::VbkTree;
use std::cmp::{Ordering, Reverse};

pub struct PopAwareComparator {
  pub endorsement_settlement_interval: u32,
}

/// One endorsement's contribution to a tip's key-point list. Ordered so
/// that plain tuple `Ord` encodes the pair rule directly: ascending
/// `endorsed_height`, and within a height, descending `proof_depth` via
/// the `Reverse` wrapper. A numerically smaller key point is the
/// *better* one.
type KeyPoint = (i32, Reverse<i64>);

impl PopAwareComparator {
  pub fn new(endorsement_settlement_interval: u32) -> Self {
    PopAwareComparator { endorsement_settlement_interval }
  }

  /// `Greater` if `a` should be preferred over `b`.
  pub fn compare<H: AltHeader>(
    &self,
    tree: &BlockTree<H, AltAddon>,
    vbk: &VbkTree,
    a: BlockHash,
    b: BlockHash,
  ) -> Ordering {
    if a == b {
      return Ordering::Equal;
    }
    let lca = match tree.lca(a, b) {
      Some(l) => l,
      None => return Ordering::Equal,
    };
    let points_a = self.keypoints(tree, vbk, lca, a);
    let points_b = self.keypoints(tree, vbk, lca, b);
    // Smaller key-point list is better; reverse the natural `Vec::cmp`
    // so that `Greater` here means "a is preferred".
    points_b
      .cmp(&points_a)
      .then_with(|| tree.get(&a).unwrap().height.cmp(&tree.get(&b).unwrap().height))
      .then_with(|| b.digest().cmp(a.digest()))
  }

  /// Key points for every ATV endorsement carried on `tip`'s unique
  /// suffix past `lca`, restricted to the settlement window (endorsements
  /// older than `endorsement_settlement_interval` ALT blocks no longer
  /// count), sorted `(endorsedHeight asc, proofDepth desc)`.
  fn keypoints<H: AltHeader>(
    &self,
    tree: &BlockTree<H, AltAddon>,
    vbk: &VbkTree,
    lca: BlockHash,
    tip: BlockHash,
  ) -> Vec<KeyPoint> {
    let tip_height = tree.get(&tip).unwrap().height;
    let vbk_tip_height = vbk.get(&vbk.active_tip()).map(|i| i.height).unwrap_or(0);
    let mut points = Vec::new();
    for h in tree.ancestors(tip) {
      if h == lca {
        break;
      }
      let idx = tree.get(&h).unwrap();
      let age = (tip_height - idx.height).max(0) as u32;
      if age > self.endorsement_settlement_interval {
        continue;
      }
      for endorsement in &idx.addon.atvs {
        let endorsed_height = match tree.get(&endorsement.endorsed_hash) {
          Some(e) => e.height,
          None => continue,
        };
        let proof_height = match vbk.get(&endorsement.block_of_proof) {
          Some(p) => p.height,
          None => continue,
        };
        let proof_depth = (vbk_tip_height - proof_height) as i64;
        points.push((endorsed_height, Reverse(proof_depth)));
      }
    }
    points.sort();
    points
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::VbkParams;
  use crate::entities::{Endorsement, SimpleAltHeader, VbkHeader, VbkMerkleRoot};
  use crate::primitives::{hash_bytes, VbkPreviousBlockHash};

  fn header(n: u8, parent: BlockHash, height: i32) -> SimpleAltHeader {
    SimpleAltHeader { hash: hash_bytes(&[n]), previous_hash: parent, height, timestamp: height as i64 * 10 }
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

  fn vbk_child(parent: &VbkHeader, nonce: u64) -> VbkHeader {
    VbkHeader {
      height: parent.height + 1,
      version: 2,
      previous_block: VbkPreviousBlockHash::truncate(&parent.hash()),
      merkle_root: VbkMerkleRoot([0u8; 16]),
      timestamp: parent.timestamp + 30,
      difficulty: parent.difficulty,
      nonce,
    }
  }

  /// Builds a VBK chain of the given length past genesis and returns it
  /// along with the hash at each height (index 0 is genesis).
  fn vbk_chain(len: i32) -> (VbkTree, Vec<BlockHash>) {
    let g = vbk_genesis();
    let params = VbkParams { network_magic: 1, minimum_difficulty: 1, settlement_interval: 400 };
    let mut tree = VbkTree::bootstrap(g.clone(), params);
    let mut hashes = vec![g.hash()];
    let mut prev = g;
    for i in 1..=len {
      let c = vbk_child(&prev, i as u64);
      let h = tree.accept_block(c.clone()).unwrap();
      hashes.push(h);
      prev = c;
    }
    (tree, hashes)
  }

  #[test]
  fn better_endorsed_shorter_fork_wins() {
    let g = header(0, hash_bytes(b"root"), 0);
    let mut tree: BlockTree<SimpleAltHeader, AltAddon> = BlockTree::new(g.clone(), g.hash, 0, AltAddon::default());

    let long_tip = header(1, g.hash, 1);
    tree.insert_raw(long_tip.clone(), long_tip.hash, g.hash, AltAddon::default(), false).unwrap();
    let long_tip2 = header(2, long_tip.hash, 2);
    tree.insert_raw(long_tip2.clone(), long_tip2.hash, long_tip.hash, AltAddon::default(), false).unwrap();

    let (vbk, vbk_hashes) = vbk_chain(50);

    let short_tip = header(3, g.hash, 1);
    let mut addon = AltAddon::default();
    addon.atvs.push(Endorsement {
      id: hash_bytes(b"atv").into(),
      endorsed_hash: g.hash,
      containing_hash: short_tip.hash,
      block_of_proof: vbk_hashes[0],
      payout_info: Vec::new(),
    });
    tree.insert_raw(short_tip.clone(), short_tip.hash, g.hash, addon, false).unwrap();

    let cmp = PopAwareComparator::new(400);
    assert_eq!(cmp.compare(&tree, &vbk, short_tip.hash, long_tip2.hash), Ordering::Greater);
  }

  /// Three tips whose single endorsement each plants the key points
  /// `(10, 50)`, `(11, 49)`, `(12, 40)`. A scalar endorsement-count score
  /// cannot distinguish any of these (one ATV each); the key-point rule
  /// must, by comparing `endorsedHeight` first and `proofDepth` only as a
  /// tie-break.
  #[test]
  fn scenario_four_keypoint_vectors_are_compared_pairwise() {
    let root = hash_bytes(b"root");
    let g = header(0, root, 0);
    let mut tree: BlockTree<SimpleAltHeader, AltAddon> = BlockTree::new(g.clone(), g.hash, 0, AltAddon::default());

    // Three independent endorsed ALT blocks at heights 10, 11, 12, each
    // endorsed by exactly one ATV from a same-height tip.
    let endorsed_a = header(1, g.hash, 10);
    let endorsed_b = header(2, g.hash, 11);
    let endorsed_c = header(3, g.hash, 12);
    for e in [&endorsed_a, &endorsed_b, &endorsed_c] {
      tree.insert_raw(e.clone(), e.hash, g.hash, AltAddon::default(), false).unwrap();
    }

    let (vbk, vbk_hashes) = vbk_chain(60);
    // vbk tip height is 60; proof_depth = 60 - proof_height.
    // (10, 50) -> proof_height 10; (11, 49) -> proof_height 11; (12, 40) -> proof_height 20.
    let proof_a = vbk_hashes[10];
    let proof_b = vbk_hashes[11];
    let proof_c = vbk_hashes[20];

    let tip_a = header(4, endorsed_a.hash, 20);
    let mut addon_a = AltAddon::default();
    addon_a.atvs.push(Endorsement {
      id: hash_bytes(b"atv-a").into(),
      endorsed_hash: endorsed_a.hash,
      containing_hash: tip_a.hash,
      block_of_proof: proof_a,
      payout_info: Vec::new(),
    });
    tree.insert_raw(tip_a.clone(), tip_a.hash, endorsed_a.hash, addon_a, false).unwrap();

    let tip_b = header(5, endorsed_b.hash, 20);
    let mut addon_b = AltAddon::default();
    addon_b.atvs.push(Endorsement {
      id: hash_bytes(b"atv-b").into(),
      endorsed_hash: endorsed_b.hash,
      containing_hash: tip_b.hash,
      block_of_proof: proof_b,
      payout_info: Vec::new(),
    });
    tree.insert_raw(tip_b.clone(), tip_b.hash, endorsed_b.hash, addon_b, false).unwrap();

    let tip_c = header(6, endorsed_c.hash, 20);
    let mut addon_c = AltAddon::default();
    addon_c.atvs.push(Endorsement {
      id: hash_bytes(b"atv-c").into(),
      endorsed_hash: endorsed_c.hash,
      containing_hash: tip_c.hash,
      block_of_proof: proof_c,
      payout_info: Vec::new(),
    });
    tree.insert_raw(tip_c.clone(), tip_c.hash, endorsed_c.hash, addon_c, false).unwrap();

    let cmp = PopAwareComparator::new(400);
    // (10, 50) vs (11, 49): lower endorsedHeight wins regardless of depth.
    assert_eq!(cmp.compare(&tree, &vbk, tip_a.hash, tip_b.hash), Ordering::Greater);
    // (11, 49) vs (12, 40): lower endorsedHeight wins.
    assert_eq!(cmp.compare(&tree, &vbk, tip_b.hash, tip_c.hash), Ordering::Greater);
    // (10, 50) vs (12, 40): lower endorsedHeight wins.
    assert_eq!(cmp.compare(&tree, &vbk, tip_a.hash, tip_c.hash), Ordering::Greater);
  }
}
