//! Port traits for every external collaborator.

pub mod broker_port;
pub mod clock_port;
pub mod config_port;
pub mod history_port;
pub mod notify_port;
