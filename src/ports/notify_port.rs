//! Operator notification port trait.

use crate::domain::error::TraderError;

pub trait NotifyPort {
    fn send(&self, text: &str) -> Result<(), TraderError>;
}
