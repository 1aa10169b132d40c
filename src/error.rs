//! Two disjoint failure modes (spec §7): `Invalid` is a recoverable
//! validation rejection, `Error` is an unrecoverable internal fault.
//!
//! Grounded in the teacher's `storage::Error` / `state::MachineError`
//! pattern: `thiserror::Error` enums with `#[error("...")]` messages and
//! `#[from]` conversions, rather than a boxed `dyn Error` or string errors.

use thiserror::Error;

/// A recoverable validation rejection. The tree is left in (or restored to)
/// a consistent pre-call state whenever this is returned. Variant names and
/// messages reuse the error-kind strings from spec §7 and §8 verbatim, since
/// embedders match on them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("btc-bad-pow: {0}")]
  BtcBadPow(String),
  #[error("btc-bad-command: {0}")]
  BtcBadCommand(String),
  #[error("invalid-btc-block: {0}")]
  InvalidBtcBlock(String),

  #[error("invalid-vbk-block: {0}")]
  InvalidVbkBlock(String),
  #[error("vbk-bad-command: {0}")]
  VbkBadCommand(String),
  #[error("pop-vtb-statelessly-invalid: {0}")]
  VtbStatelesslyInvalid(String),

  #[error("alt-bad-time: {0}")]
  AltBadTime(String),
  #[error("alt-bad-command: {0}")]
  AltBadCommand(String),
  #[error("atv-bad-identifier: {0}")]
  AtvBadIdentifier(String),
  #[error("pop-atv-statelessly-invalid: {0}")]
  AtvStatelesslyInvalid(String),

  #[error("{0}-marked-invalid: {1}")]
  MarkedInvalid(&'static str, String),

  #[error("mempool-add-{0}: {1}")]
  MempoolAdd(&'static str, String),

  #[error("{context}: {source}")]
  Context {
    context: String,
    #[source]
    source: Box<ValidationError>,
  },
}

impl ValidationError {
  /// Prefixes a context tag onto an existing validation error, the way
  /// spec §7 requires each layer (command → group → block → segment →
  /// `setState`) to tag the error as it bubbles up.
  pub fn with_context(self, context: impl Into<String>) -> ValidationError {
    ValidationError::Context {
      context: context.into(),
      source: Box::new(self),
    }
  }
}

/// An unrecoverable internal fault: provider I/O failure, or a database
/// inconsistency discovered during recovery. Never compensated for by the
/// core; the caller must tear the tree down.
#[derive(Debug, Error)]
pub enum CoreError {
  #[error("payloads provider failure: {0}")]
  Provider(String),

  #[error("storage failure: {0}")]
  Storage(#[from] crate::storage::StorageError),

  #[error("tree was poisoned by a prior unrecoverable error and must be torn down")]
  Poisoned,
}

/// Outcome of an operation that can fail either way, mirroring the
/// `Result`/`Invalid`/`Error` three-way split spec §7 describes. Plain
/// `Result<T, ValidationError>` would conflate "rejected" with "fatal";
/// keeping them as distinct error types (rather than folding `CoreError`
/// into `ValidationError`) is what lets `Error` short-circuit without any
/// compensating action, per the propagation policy.
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type CoreResult<T> = Result<T, CoreError>;
