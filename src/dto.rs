use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque, already-anonymized card identifier.
///
/// The store never sees a raw card number. Cloning is cheap, since the same key
/// is held both by the lock table and by every payment referring to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardKey(Arc<str>);

impl CardKey {
    pub fn new(hashed: impl AsRef<str>) -> Self {
        Self(Arc::from(hashed.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardKey {
    fn from(hashed: &str) -> Self {
        Self::new(hashed)
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the store needs to know about a payment: which card and when.
/// Any other payment fields are irrelevant to velocity counting.
pub trait CardUsage {
    fn card_key(&self) -> &CardKey;
    fn timestamp(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub card: CardKey,
    pub timestamp: DateTime<Utc>,
}

impl Payment {
    pub fn new(card: impl Into<CardKey>, timestamp: DateTime<Utc>) -> Self {
        Self {
            card: card.into(),
            timestamp,
        }
    }
}

impl CardUsage for Payment {
    fn card_key(&self) -> &CardKey {
        &self.card
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One output row of the replay runners: the velocity seen for a payment
/// at the moment it was assessed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Assessment {
    pub card: CardKey,
    pub timestamp: DateTime<Utc>,
    pub usage_count: usize,
}
