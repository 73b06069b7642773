//! Concurrent card velocity store.
//!
//! Every observed card owns one mutex, and that mutex owns the card's
//! [`Ledger`]. The map from card to mutex doubles as the lock table: an entry
//! is inserted atomically the first time a card is registered and is never
//! removed afterwards, so both ledgers and locks live for the whole process.
//!
//! Expiry is piggy-backed on the read path. There is no background sweeper,
//! which means a card that is never queried again keeps its entries (and its
//! lock) forever. History is in-memory only and is lost on restart.

use chrono::TimeDelta;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Ledger, RetentionPolicy};
use crate::dto::{CardKey, CardUsage};
use crate::error::{Error, Result};

/// Contract consumed by the risk-assessment pipeline.
pub trait VelocityProvider: Send + Sync {
    /// How many times the payment's card was used within `window` before the
    /// payment's own timestamp. The payment itself is not counted.
    fn card_usage_count(&self, payment: &dyn CardUsage, window: TimeDelta) -> Result<usize>;

    /// Records a processed payment so later queries see it.
    fn register_payment(&self, payment: &dyn CardUsage);
}

#[derive(Debug, Clone)]
pub struct VelocityConfig {
    /// Entries older than this, relative to the queried payment, are dropped
    pub retention: TimeDelta,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            retention: RetentionPolicy::default().max_age(),
        }
    }
}

static PROVIDER: Lazy<VelocityStore> = Lazy::new(VelocityStore::new);

/// Process-wide store, created on first access and never torn down.
///
/// Prefer constructing a [`VelocityStore`] and passing it explicitly; this
/// accessor exists for callers that cannot thread one through.
pub fn provider() -> &'static VelocityStore {
    &PROVIDER
}

#[derive(Debug, Default)]
pub struct VelocityStore {
    ledgers: DashMap<CardKey, Arc<Mutex<Ledger>>>,
    retention: RetentionPolicy,
}

impl VelocityStore {
    pub fn new() -> Self {
        Self::with_config(VelocityConfig::default())
    }

    pub fn with_config(config: VelocityConfig) -> Self {
        Self {
            ledgers: DashMap::new(),
            retention: RetentionPolicy::new(config.retention),
        }
    }

    /// Prunes the card's expired entries relative to the payment's timestamp,
    /// then counts the remaining ones whose age is at most `window`.
    ///
    /// An unseen card yields 0 and leaves no trace in the store.
    pub fn count_usage<U>(&self, payment: &U, window: TimeDelta) -> Result<usize>
    where
        U: CardUsage + ?Sized,
    {
        if window < TimeDelta::zero() {
            warn!(card = %payment.card_key(), %window, "Rejected negative usage window");
            return Err(Error::NegativeWindow(window));
        }
        let Some(ledger) = self.existing_ledger(payment.card_key()) else {
            return Ok(0);
        };

        let reference = payment.timestamp();
        let mut ledger = ledger.lock();
        let pruned = ledger.prune(reference, &self.retention);
        if pruned > 0 {
            debug!(
                card = %payment.card_key(),
                pruned,
                remaining = ledger.len(),
                "Pruned expired usage entries"
            );
        }
        Ok(ledger.count_within(reference, window))
    }

    /// Appends the payment to its card's ledger, creating the ledger on first
    /// sight. Takes the same per-card lock as [`count_usage`](Self::count_usage)
    /// so an append can never be lost to a concurrent prune.
    pub fn register_payment<U>(&self, payment: &U)
    where
        U: CardUsage + ?Sized,
    {
        let ledger = self.ledger_or_create(payment.card_key());
        ledger.lock().append(payment.timestamp());
    }

    /// Number of cards ever registered. Never decreases.
    pub fn tracked_cards(&self) -> usize {
        self.ledgers.len()
    }

    /// Number of retained entries for a card, without pruning.
    pub fn retained_entries(&self, card: &CardKey) -> usize {
        self.existing_ledger(card)
            .map(|ledger| ledger.lock().len())
            .unwrap_or(0)
    }

    /// Clones the card's lock handle out of the map so the shard guard is
    /// released before the per-card lock is taken. Holding both would make
    /// unrelated cards in the same shard wait on each other.
    fn existing_ledger(&self, card: &CardKey) -> Option<Arc<Mutex<Ledger>>> {
        self.ledgers.get(card).map(|entry| Arc::clone(entry.value()))
    }

    fn ledger_or_create(&self, card: &CardKey) -> Arc<Mutex<Ledger>> {
        if let Some(ledger) = self.existing_ledger(card) {
            return ledger;
        }
        let entry = self.ledgers.entry(card.clone()).or_insert_with(|| {
            debug!(%card, "Tracking new card");
            Arc::new(Mutex::new(Ledger::new()))
        });
        Arc::clone(entry.value())
    }
}

impl VelocityProvider for VelocityStore {
    fn card_usage_count(&self, payment: &dyn CardUsage, window: TimeDelta) -> Result<usize> {
        self.count_usage(payment, window)
    }

    fn register_payment(&self, payment: &dyn CardUsage) {
        VelocityStore::register_payment(self, payment)
    }
}
