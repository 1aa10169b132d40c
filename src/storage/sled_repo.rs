//! `sled`-backed `Repository`, grounded in the teacher's `storage::blocks::
//! BlockStore::new` (open-or-create under a data directory, `thiserror`
//! wrapping of engine errors).

use super::{Repository, StorageError, WriteBatch};
use std::path::Path;
use tracing::debug;

pub struct SledRepository {
  tree: sled::Tree,
}

impl SledRepository {
  pub fn open(directory: impl AsRef<Path>, tree_name: &str) -> Result<Self, StorageError> {
    let db = sled::open(directory)?;
    let tree = db.open_tree(tree_name)?;
    debug!(tree_name, "opened sled tree");
    Ok(SledRepository { tree })
  }
}

#[derive(Default)]
pub struct SledBatch {
  inner: sled::Batch,
}

impl WriteBatch for SledBatch {
  fn put(&mut self, key: &[u8], value: &[u8]) {
    self.inner.insert(key, value);
  }

  fn remove(&mut self, key: &[u8]) {
    self.inner.remove(key);
  }
}

impl Repository for SledRepository {
  type Batch = SledBatch;

  fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
    Ok(self.tree.get(key)?.map(|v| v.to_vec()))
  }

  fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
    self.tree.insert(key, value)?;
    Ok(())
  }

  fn remove(&self, key: &[u8]) -> Result<(), StorageError> {
    self.tree.remove(key)?;
    Ok(())
  }

  fn new_batch(&self) -> Self::Batch {
    SledBatch::default()
  }

  fn commit(&self, batch: Self::Batch) -> Result<(), StorageError> {
    self.tree.apply_batch(batch.inner)?;
    Ok(())
  }

  fn iter_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
    self
      .tree
      .iter()
      .map(|entry| entry.map(|(k, v)| (k.to_vec(), v.to_vec())).map_err(StorageError::from))
      .collect()
  }
}
