//! # Transaction & Package Admission Engine
//!
//! Decides whether a transaction, or an ordered package of related
//! transactions, may enter the node's shared transaction pool.
//!
//! ## Purpose
//!
//! Combines consensus checks (identical verdicts on every node), local relay
//! policy (size, fee and chain limits) and strict atomicity: a package is
//! evaluated under the pool's exclusive lock and admitted as a unit, or not
//! at all.
//!
//! ## Admission Flow
//!
//! ```text
//! package ──→ sanitize ──→ lock pool ──→ validate each member ──→ all valid?
//!               │                          (pool + staged view)      │
//!               ↓                                                    ├─ DryRun → insert all, trim, undo
//!        PolicyViolation                                             ├─ Commit → insert all, trim
//!                                                                    └─ any invalid → report, pool untouched
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | All-or-nothing commit | `domain/commit.rs` - `StagedCommit` drop guard |
//! | Dry run never mutates | `service.rs` - dry runs always undo their `StagedCommit` |
//! | Admitted members stay pooled | `domain/commit.rs` - trim runs inside the commit |
//! | Same decision in both modes | `domain/validator.rs` - one `validate()` for both |
//! | Every member gets a verdict | `service.rs` - no short circuit across members |
//! | No double spend in pool | `domain/pool.rs` - spent-outpoint index in `insert()` |
//! | Deterministic script verdicts | `domain/validator.rs` - lowest failing input reported |
//!
//! ## Failure Kinds
//!
//! | Kind | Example reasons | Retry |
//! |------|-----------------|-------|
//! | `PolicyViolation` | `package-too-many-transactions`, `package-too-large` | yes |
//! | `TransactionRejected` | `tx-size`, `missing-inputs`, `min relay fee not met` | yes |
//! | `ConsensusViolation` | `bad-txns-in-belowout`, `mandatory-script-verify-flag-failed` | never |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - InMemoryChainState, StandardVerifierAdapter        │
//! │  service.rs - PackageAdmissionService                           │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - PackageAdmissionApi trait                  │
//! │  ports/outbound.rs - ChainState, ScriptVerifier traits          │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/sanitizer.rs - package shape rules                      │
//! │  domain/validator.rs - per-transaction checks                   │
//! │  domain/pool.rs      - TransactionPool, trimming               │
//! │  domain/verdict.rs   - RejectReason, TxVerdict, PackageResult   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod pool_lock;
pub mod ports;
pub mod service;

/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{InMemoryChainState, StandardVerifierAdapter};
pub use domain::*;
pub use pool_lock::SharedPool;
pub use ports::*;
pub use service::PackageAdmissionService;
