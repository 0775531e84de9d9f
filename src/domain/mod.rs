//! Core domain types and trading logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod order;
pub mod sizing;
pub mod schedule;
pub mod session;
pub mod cycle;
pub mod report;
pub mod config;
pub mod config_validation;
pub mod universe;
pub mod error;
