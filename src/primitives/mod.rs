mod hash;
mod work;

pub use hash::{hash_bytes, BlockHash, Sha256Hash, VbkPreviousBlockHash};
pub use work::{expand_target, ChainWork};
