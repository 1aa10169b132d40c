//! Durable storage for block indices and payloads (spec §6), behind a
//! `Repository` trait so the core never hardcodes an engine. Grounded in
//! the teacher's `storage::Error`/`storage::blocks::BlockStore` pattern,
//! generalized from a single block-shape store to a generic key/value
//! repository keyed by content hash.

mod inmem;
mod sled_repo;

pub use inmem::InMemoryRepository;
pub use sled_repo::SledRepository;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("serialization error: {0}")]
  Serialization(#[from] bincode::Error),

  #[error("storage engine error: {0}")]
  StorageEngine(#[from] sled::Error),

  #[error("system io error: {0}")]
  SystemIo(#[from] std::io::Error),
}

/// A batch of writes applied atomically (spec §6: `newBatch`/`commit`).
pub trait WriteBatch {
  fn put(&mut self, key: &[u8], value: &[u8]);
  fn remove(&mut self, key: &[u8]);
}

/// Byte-oriented key/value repository. Concrete trees serialize their
/// indices with `bincode` and key them by content hash before handing
/// them to this trait, so the trait itself never needs to know about
/// `BlockIndex<H, A>`.
pub trait Repository {
  type Batch: WriteBatch;

  fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;
  fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;
  fn remove(&self, key: &[u8]) -> Result<(), StorageError>;
  fn get_many(&self, keys: &[&[u8]]) -> Result<Vec<Option<Vec<u8>>>, StorageError> {
    keys.iter().map(|k| self.get(k)).collect()
  }

  fn new_batch(&self) -> Self::Batch;
  fn commit(&self, batch: Self::Batch) -> Result<(), StorageError>;

  /// All values currently stored, for a cold-start reindex.
  fn iter_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;
}
