//! # Domain Layer - Mempool
//!
//! Pure admission logic; no locking, no I/O.
//!
//! ## Components
//!
//! - `verdict`: result kinds, reject reasons, per-tx and package verdicts
//! - `sanitizer`: package shape checks run before the pool lock
//! - `policy`: consensus structure and standardness rules
//! - `validator`: the per-transaction admission checks
//! - `view`: pool plus staged package members, as seen by the validator
//! - `commit`: undo log applying a validated package to the pool
//! - `pool`: the transaction store and its maintenance (trim, block removal)
//! - `family`: ancestor/descendant linkage
//! - `entities`: `PoolEntry`, `MempoolConfig`
//! - `value_objects`: `FeeRate`, `ValidationMode`, `PoolStatus`
//! - `errors`: `PoolError`, `AdmissionError`, `ConfigError`

pub mod commit;
pub mod entities;
pub mod errors;
pub mod family;
pub mod policy;
pub mod pool;
pub mod sanitizer;
pub mod validator;
pub mod value_objects;
pub mod verdict;
pub mod view;

pub use commit::{CommitOutcome, StagedCommit};
pub use entities::*;
pub use errors::*;
pub use family::{AncestorInfo, DescendantInfo, TransactionFamily};
pub use pool::TransactionPool;
pub use sanitizer::{sanitize, PackageLimits, PackageRejection};
pub use validator::{validate, AcceptedEntry, ValidationContext};
pub use value_objects::*;
pub use verdict::*;
pub use view::{PackageView, Spender};
