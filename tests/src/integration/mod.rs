//! Admission scenarios spanning the mempool, script verification and the
//! shared data model.

pub mod concurrency;
pub mod package_properties;
pub mod pool_maintenance;
pub mod replacement;
pub mod signed_flow;
