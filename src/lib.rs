mod csv_utils;
mod dto;
mod engine;
mod error;
mod runner;
mod stores;

pub use dto::{Assessment, CardKey, CardUsage, Payment};
pub use engine::Engine;
pub use error::{Error, Result};
pub use runner::{run, run_async};
pub use stores::{
    provider, Ledger, RetentionPolicy, VelocityConfig, VelocityProvider, VelocityStore,
    DEFAULT_RETENTION_HOURS,
};
