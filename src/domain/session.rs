//! Scoped brokerage session.
//!
//! `open` logs in, `close` logs out. A session dropped without `close` (an
//! early `?` return) still logs out; the logout error is only logged there
//! since the phase error is already propagating.

use crate::domain::error::TraderError;
use crate::ports::broker_port::BrokerPort;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

pub struct BrokerSession<'a, B: BrokerPort + ?Sized> {
    broker: &'a mut B,
    active: bool,
}

impl<'a, B: BrokerPort + ?Sized> BrokerSession<'a, B> {
    pub fn open(broker: &'a mut B) -> Result<Self, TraderError> {
        broker.login()?;
        debug!("broker session opened");
        Ok(Self {
            broker,
            active: true,
        })
    }

    pub fn close(mut self) -> Result<(), TraderError> {
        self.active = false;
        debug!("broker session closed");
        self.broker.logout()
    }
}

impl<B: BrokerPort + ?Sized> Deref for BrokerSession<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.broker
    }
}

impl<B: BrokerPort + ?Sized> DerefMut for BrokerSession<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.broker
    }
}

impl<B: BrokerPort + ?Sized> Drop for BrokerSession<'_, B> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            match self.broker.logout() {
                Ok(()) => debug!("broker session released on error path"),
                Err(e) => warn!("logout after failed broker phase also failed: {e}"),
            }
        }
    }
}
