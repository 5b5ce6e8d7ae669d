//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: Optionally reclaims expired cache entries that no lookup
//!   has touched yet

mod sweep;

pub use sweep::spawn_sweep_task;
