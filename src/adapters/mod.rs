//! Concrete adapter implementations for ports.

pub mod cached_history_adapter;
pub mod csv_adapter;
pub mod discord_notifier;
pub mod file_config_adapter;
pub mod fugle_adapter;
pub mod log_notifier;
pub mod paper_broker_adapter;
pub mod system_clock;
