//! Wire bundle carried inside an ALT block (spec §3).

use crate::entities::{Atv, VbkBlock, Vtb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopData {
  pub context: Vec<VbkBlock>,
  pub vtbs: Vec<Vtb>,
  pub atvs: Vec<Atv>,
}

impl PopData {
  pub fn is_empty(&self) -> bool {
    self.context.is_empty() && self.vtbs.is_empty() && self.atvs.is_empty()
  }

  pub fn len(&self) -> usize {
    self.context.len() + self.vtbs.len() + self.atvs.len()
  }
}
