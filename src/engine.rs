//! Risk-assessment driver around a [`VelocityProvider`].
//!
//! For every payment the engine asks for the card's velocity first and
//! registers the payment only afterwards, so a payment never counts itself.

use chrono::TimeDelta;
use std::sync::Arc;

use crate::dto::{Assessment, Payment};
use crate::error::{Error, Result};
use crate::stores::VelocityProvider;

pub struct Engine<P: VelocityProvider + ?Sized> {
    provider: Arc<P>,
    window: TimeDelta,
}

impl<P: VelocityProvider + ?Sized> Clone for Engine<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            window: self.window,
        }
    }
}

impl<P: VelocityProvider + ?Sized> Engine<P> {
    /// Creates an engine counting usage within `window`.
    /// Returns an error up front if the window is negative.
    pub fn new(provider: Arc<P>, window: TimeDelta) -> Result<Self> {
        if window < TimeDelta::zero() {
            return Err(Error::NegativeWindow(window));
        }
        Ok(Self { provider, window })
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn assess(&self, payment: Payment) -> Result<Assessment> {
        let usage_count = self.provider.card_usage_count(&payment, self.window)?;
        self.provider.register_payment(&payment);
        Ok(Assessment {
            card: payment.card,
            timestamp: payment.timestamp,
            usage_count,
        })
    }
}
