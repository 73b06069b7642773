//! Storage layer for card velocity. Provides:
//! - Per-card usage history ([`Ledger`])
//! - The expiry rule applied on every query ([`RetentionPolicy`])
//! - The concurrent, per-card locked store tying them together ([`VelocityStore`])
//!
//! Everything is held in memory for the lifetime of the process.

mod ledger;
mod retention;
mod velocity;

pub use ledger::Ledger;
pub use retention::{RetentionPolicy, DEFAULT_RETENTION_HOURS};
pub use velocity::{provider, VelocityConfig, VelocityProvider, VelocityStore};
