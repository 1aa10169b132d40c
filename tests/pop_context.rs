//! End-to-end scenarios over `PopContext` (spec §8): bootstrap, plain
//! extension, and an endorsement improving a weaker fork.

use pop_core::entities::{Atv, PopData};
use pop_core::stateless::DefaultPowVerifier;
use pop_core::{testkit, PopContext};

fn fresh_context() -> PopContext<pop_core::entities::SimpleAltHeader> {
  PopContext::new(
    testkit::btc_genesis(),
    0,
    testkit::btc_params(),
    testkit::vbk_genesis(),
    testkit::vbk_params(),
    testkit::alt_genesis(),
    testkit::alt_params(),
  )
}

#[test]
fn bootstrap_tips_equal_genesis() {
  let ctx = fresh_context();
  assert_eq!(ctx.alt_tip(), testkit::alt_genesis().hash);
  assert_eq!(ctx.vbk_tip(), testkit::vbk_genesis().hash());
  assert_eq!(ctx.btc_tip(), testkit::btc_genesis().hash());
}

#[test]
fn plain_extension_advances_alt_tip() {
  let mut ctx = fresh_context();
  let genesis = testkit::alt_genesis();
  let next = testkit::alt_child(&genesis, b"a");
  let hash = ctx.accept_alt_block(next.clone()).unwrap();
  assert_ne!(ctx.alt_tip(), hash); // accept_block alone does not move the tip...
  ctx.add_pop_payloads(hash, &PopData::default()).unwrap();
  assert_eq!(ctx.alt_tip(), hash); // ...fork choice does, once payloads (even empty) are applied.
}

#[test]
fn endorsement_lets_a_shorter_fork_win() {
  let mut ctx = fresh_context();
  let genesis = testkit::alt_genesis();

  let long_a = testkit::alt_child(&genesis, b"long-a");
  let long_a_hash = ctx.accept_alt_block(long_a.clone()).unwrap();
  ctx.add_pop_payloads(long_a_hash, &PopData::default()).unwrap();
  let long_b = testkit::alt_child(&long_a, b"long-b");
  let long_b_hash = ctx.accept_alt_block(long_b).unwrap();
  ctx.add_pop_payloads(long_b_hash, &PopData::default()).unwrap();
  assert_eq!(ctx.alt_tip(), long_b_hash);

  // a one-block fork off genesis, endorsed into VBK.
  let short = testkit::alt_child(&genesis, b"short");
  let short_hash = ctx.accept_alt_block(short).unwrap();

  let vbk_genesis = testkit::vbk_genesis();
  let proof_vbk = testkit::vbk_child(&vbk_genesis, 1);
  let proof_vbk_hash = ctx.accept_vbk_block(proof_vbk).unwrap();

  let atv = Atv {
    id: pop_core::primitives::hash_bytes(b"atv-1").into(),
    endorsed_hash: short_hash,
    block_of_proof: proof_vbk_hash,
    payout_info: b"miner-1".to_vec(),
  };
  let pop = PopData { context: Vec::new(), vtbs: Vec::new(), atvs: vec![atv] };
  ctx.add_pop_payloads(short_hash, &pop).unwrap();

  assert_eq!(ctx.alt_tip(), short_hash);
}

#[test]
fn btc_tree_extends_with_pow_check() {
  let mut ctx = fresh_context();
  let genesis = testkit::btc_genesis();
  let child = testkit::btc_child(&genesis, 1);
  let hash = ctx.accept_btc_block(child, &DefaultPowVerifier).unwrap();
  assert_eq!(ctx.btc_tip(), hash);
}
