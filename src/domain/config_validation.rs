//! Configuration validation.
//!
//! Validates every config field before the trader starts, reporting the
//! first offending key.

use crate::domain::config::{parse_dates, parse_holdings, parse_time, parse_timezone, required};
use crate::domain::error::TraderError;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;

pub fn validate_trader_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_symbols(config)?;
    validate_numbers(config)?;
    validate_windows(config)?;
    validate_reserved_balance(config)?;
    validate_sizing(config)?;
    validate_schedule(config)?;
    validate_history(config)?;
    validate_broker(config)?;
    validate_notify(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let raw = required(config, "trader", "symbols")?;
    parse_codes(&raw)?;
    Ok(())
}

const INTEGER_KEYS: [(&str, &str); 6] = [
    ("trader", "short_window"),
    ("trader", "long_window"),
    ("trader", "lookback_months"),
    ("sizing", "lot_size"),
    ("sizing", "min_odd_lot_shares"),
    ("schedule", "fetch_cooldown_ms"),
];

const DECIMAL_KEYS: [(&str, &str); 3] = [
    ("trader", "reserved_balance"),
    ("broker", "cash"),
    ("broker", "trade_limit"),
];

/// Numeric getters fall back to defaults on garbage, so reject it here.
fn validate_numbers(config: &dyn ConfigPort) -> Result<(), TraderError> {
    for (section, key) in INTEGER_KEYS {
        if let Some(raw) = config.get_string(section, key) {
            if raw.parse::<i64>().is_err() {
                return Err(invalid(section, key, &format!("'{raw}' is not an integer")));
            }
        }
    }
    for (section, key) in DECIMAL_KEYS {
        if let Some(raw) = config.get_string(section, key) {
            if !raw.parse::<f64>().is_ok_and(f64::is_finite) {
                return Err(invalid(section, key, &format!("'{raw}' is not a number")));
            }
        }
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let short = config.get_int("trader", "short_window", 15);
    let long = config.get_int("trader", "long_window", 60);
    if short < 1 {
        return Err(invalid("trader", "short_window", "short_window must be at least 1"));
    }
    if long < 1 {
        return Err(invalid("trader", "long_window", "long_window must be at least 1"));
    }
    if short >= long {
        return Err(invalid(
            "trader",
            "short_window",
            "short_window must be less than long_window",
        ));
    }
    let lookback = config.get_int("trader", "lookback_months", 11);
    if lookback < 1 {
        return Err(invalid("trader", "lookback_months", "lookback_months must be at least 1"));
    }
    Ok(())
}

fn validate_reserved_balance(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let value = config.get_double("trader", "reserved_balance", 0.0);
    if value < 0.0 {
        return Err(invalid(
            "trader",
            "reserved_balance",
            "reserved_balance must be non-negative",
        ));
    }
    Ok(())
}

fn validate_sizing(config: &dyn ConfigPort) -> Result<(), TraderError> {
    if config.get_int("sizing", "lot_size", 1000) < 1 {
        return Err(invalid("sizing", "lot_size", "lot_size must be at least 1"));
    }
    if config.get_int("sizing", "min_odd_lot_shares", 50) < 0 {
        return Err(invalid(
            "sizing",
            "min_odd_lot_shares",
            "min_odd_lot_shares must be non-negative",
        ));
    }
    Ok(())
}

fn validate_schedule(config: &dyn ConfigPort) -> Result<(), TraderError> {
    if let Some(tz) = config.get_string("schedule", "timezone") {
        parse_timezone(&tz)?;
    }

    let cutoff_raw = config
        .get_string("schedule", "pre_open_cutoff")
        .unwrap_or_else(|| "08:00".to_string());
    let open_raw = config
        .get_string("schedule", "market_open")
        .unwrap_or_else(|| "09:00".to_string());

    let cutoff = parse_time(&cutoff_raw).ok_or_else(|| {
        invalid("schedule", "pre_open_cutoff", "invalid pre_open_cutoff, expected HH:MM")
    })?;
    let open = parse_time(&open_raw)
        .ok_or_else(|| invalid("schedule", "market_open", "invalid market_open, expected HH:MM"))?;

    if cutoff >= open {
        return Err(invalid(
            "schedule",
            "pre_open_cutoff",
            "pre_open_cutoff must be before market_open",
        ));
    }

    if config.get_int("schedule", "fetch_cooldown_ms", 1200) < 0 {
        return Err(invalid(
            "schedule",
            "fetch_cooldown_ms",
            "fetch_cooldown_ms must be non-negative",
        ));
    }
    Ok(())
}

fn validate_history(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let source = config
        .get_string("history", "source")
        .unwrap_or_else(|| "csv".to_string());
    match source.trim().to_lowercase().as_str() {
        "csv" => Ok(()),
        "fugle" => required(config, "history", "api_key").map(|_| ()),
        _ => Err(invalid(
            "history",
            "source",
            "history source must be csv or fugle",
        )),
    }
}

fn validate_broker(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let cash = config.get_double("broker", "cash", 0.0);
    if cash < 0.0 {
        return Err(invalid("broker", "cash", "cash must be non-negative"));
    }
    if config.get_double("broker", "trade_limit", cash) < 0.0 {
        return Err(invalid("broker", "trade_limit", "trade_limit must be non-negative"));
    }
    parse_holdings(&config.get_string("broker", "holdings").unwrap_or_default())?;
    parse_dates(&config.get_string("broker", "holidays").unwrap_or_default())?;
    Ok(())
}

fn validate_notify(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let kind = config
        .get_string("notify", "kind")
        .unwrap_or_else(|| "log".to_string());
    match kind.trim().to_lowercase().as_str() {
        "log" => Ok(()),
        "discord" => required(config, "notify", "webhook_url").map(|_| ()),
        _ => Err(invalid("notify", "kind", "notify kind must be log or discord")),
    }
}
