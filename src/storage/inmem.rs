//! Reference `Repository` impl backed by a plain mutex-guarded map.
//! Used by tests and by embedders who don't need durability.

use super::{Repository, StorageError, WriteBatch};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryRepository {
  map: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

pub enum InMemoryOp {
  Put(Vec<u8>, Vec<u8>),
  Remove(Vec<u8>),
}

#[derive(Default)]
pub struct InMemoryBatch {
  ops: Vec<InMemoryOp>,
}

impl WriteBatch for InMemoryBatch {
  fn put(&mut self, key: &[u8], value: &[u8]) {
    self.ops.push(InMemoryOp::Put(key.to_vec(), value.to_vec()));
  }

  fn remove(&mut self, key: &[u8]) {
    self.ops.push(InMemoryOp::Remove(key.to_vec()));
  }
}

impl Repository for InMemoryRepository {
  type Batch = InMemoryBatch;

  fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
    Ok(self.map.lock().unwrap().get(key).cloned())
  }

  fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
    self.map.lock().unwrap().insert(key.to_vec(), value.to_vec());
    Ok(())
  }

  fn remove(&self, key: &[u8]) -> Result<(), StorageError> {
    self.map.lock().unwrap().remove(key);
    Ok(())
  }

  fn new_batch(&self) -> Self::Batch {
    InMemoryBatch::default()
  }

  fn commit(&self, batch: Self::Batch) -> Result<(), StorageError> {
    let mut map = self.map.lock().unwrap();
    for op in batch.ops {
      match op {
        InMemoryOp::Put(k, v) => {
          map.insert(k, v);
        }
        InMemoryOp::Remove(k) => {
          map.remove(&k);
        }
      }
    }
    Ok(())
  }

  fn iter_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
    Ok(self.map.lock().unwrap().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn batch_commits_atomically() {
    let repo = InMemoryRepository::new();
    repo.put(b"a", b"1").unwrap();
    let mut batch = repo.new_batch();
    batch.put(b"a", b"2");
    batch.put(b"b", b"3");
    batch.remove(b"a");
    repo.commit(batch).unwrap();
    assert_eq!(repo.get(b"a").unwrap(), None);
    assert_eq!(repo.get(b"b").unwrap(), Some(b"3".to_vec()));
  }
}
