//! Notifier that writes operator messages to the log.

use crate::domain::error::TraderError;
use crate::ports::notify_port::NotifyPort;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotifyPort for LogNotifier {
    fn send(&self, text: &str) -> Result<(), TraderError> {
        for line in text.lines() {
            info!(target: "notify", "{line}");
        }
        Ok(())
    }
}
