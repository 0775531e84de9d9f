//! Typed trader configuration, built once at startup from a [`ConfigPort`].

use crate::domain::error::TraderError;
use crate::domain::schedule::Schedule;
use crate::domain::signal::SignalWindows;
use crate::domain::sizing::{Holding, SizingPolicy};
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use std::path::PathBuf;

pub const DEFAULT_FUGLE_URL: &str = "https://api.fugle.tw/marketdata/v1.0";

#[derive(Debug, Clone, PartialEq)]
pub enum HistorySource {
    Csv,
    Fugle { api_key: String, base_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySettings {
    pub source: HistorySource,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperBrokerSettings {
    pub cash: f64,
    pub trade_limit: f64,
    pub holdings: Vec<Holding>,
    pub holidays: Vec<NaiveDate>,
    pub journal: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotifySettings {
    Log,
    Discord { webhook_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderConfig {
    pub symbols: Vec<String>,
    pub windows: SignalWindows,
    pub reserved_balance: f64,
    pub sizing: SizingPolicy,
    pub schedule: Schedule,
    pub fetch_cooldown: TimeDelta,
    pub history: HistorySettings,
    pub broker: PaperBrokerSettings,
    pub notify: NotifySettings,
}

pub fn build_trader_config(config: &dyn ConfigPort) -> Result<TraderConfig, TraderError> {
    let symbols_raw = required(config, "trader", "symbols")?;
    let symbols = parse_codes(&symbols_raw)?;

    let windows = SignalWindows {
        short: non_negative(config, "trader", "short_window", 15)? as usize,
        long: non_negative(config, "trader", "long_window", 60)? as usize,
    };

    let sizing = SizingPolicy {
        lot_size: non_negative(config, "sizing", "lot_size", 1000)? as u64,
        min_odd_lot_shares: non_negative(config, "sizing", "min_odd_lot_shares", 50)? as u64,
    };

    let schedule = Schedule {
        timezone: parse_timezone(
            &config
                .get_string("schedule", "timezone")
                .unwrap_or_else(|| "Asia/Taipei".to_string()),
        )?,
        pre_open_cutoff: time_or(config, "pre_open_cutoff", "08:00")?,
        market_open: time_or(config, "market_open", "09:00")?,
        lookback_months: non_negative(config, "trader", "lookback_months", 11)? as u32,
    };

    let fetch_cooldown =
        TimeDelta::milliseconds(non_negative(config, "schedule", "fetch_cooldown_ms", 1200)?);

    let cash = config.get_double("broker", "cash", 0.0);

    Ok(TraderConfig {
        symbols,
        windows,
        reserved_balance: config.get_double("trader", "reserved_balance", 0.0),
        sizing,
        schedule,
        fetch_cooldown,
        history: build_history_settings(config)?,
        broker: PaperBrokerSettings {
            cash,
            trade_limit: config.get_double("broker", "trade_limit", cash),
            holdings: parse_holdings(&config.get_string("broker", "holdings").unwrap_or_default())?,
            holidays: parse_dates(&config.get_string("broker", "holidays").unwrap_or_default())?,
            journal: config.get_string("broker", "journal").map(PathBuf::from),
        },
        notify: build_notify_settings(config)?,
    })
}

fn build_history_settings(config: &dyn ConfigPort) -> Result<HistorySettings, TraderError> {
    let data_dir = PathBuf::from(
        config
            .get_string("history", "data_dir")
            .unwrap_or_else(|| "data/history".to_string()),
    );
    let kind = config
        .get_string("history", "source")
        .unwrap_or_else(|| "csv".to_string());

    let source = match kind.trim().to_lowercase().as_str() {
        "csv" => HistorySource::Csv,
        "fugle" => HistorySource::Fugle {
            api_key: required(config, "history", "api_key")?,
            base_url: config
                .get_string("history", "base_url")
                .unwrap_or_else(|| DEFAULT_FUGLE_URL.to_string()),
        },
        other => {
            return Err(TraderError::ConfigInvalid {
                section: "history".into(),
                key: "source".into(),
                reason: format!("unknown history source '{other}' (expected csv or fugle)"),
            });
        }
    };

    Ok(HistorySettings { source, data_dir })
}

fn build_notify_settings(config: &dyn ConfigPort) -> Result<NotifySettings, TraderError> {
    let kind = config
        .get_string("notify", "kind")
        .unwrap_or_else(|| "log".to_string());
    match kind.trim().to_lowercase().as_str() {
        "log" => Ok(NotifySettings::Log),
        "discord" => Ok(NotifySettings::Discord {
            webhook_url: required(config, "notify", "webhook_url")?,
        }),
        other => Err(TraderError::ConfigInvalid {
            section: "notify".into(),
            key: "kind".into(),
            reason: format!("unknown notifier '{other}' (expected log or discord)"),
        }),
    }
}

pub(crate) fn required(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, TraderError> {
    match config.get_string(section, key) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(TraderError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        }),
    }
}

fn non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, TraderError> {
    let value = config.get_int(section, key, default);
    if value < 0 {
        return Err(TraderError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("{key} must be non-negative"),
        });
    }
    Ok(value)
}

fn time_or(config: &dyn ConfigPort, key: &str, default: &str) -> Result<NaiveTime, TraderError> {
    let raw = config
        .get_string("schedule", key)
        .unwrap_or_else(|| default.to_string());
    parse_time(&raw).ok_or_else(|| TraderError::ConfigInvalid {
        section: "schedule".into(),
        key: key.into(),
        reason: format!("invalid time '{raw}', expected HH:MM"),
    })
}

pub(crate) fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub(crate) fn parse_timezone(raw: &str) -> Result<Tz, TraderError> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| TraderError::ConfigInvalid {
            section: "schedule".into(),
            key: "timezone".into(),
            reason: format!("unknown timezone '{}'", raw.trim()),
        })
}

/// `SYMBOL:SHARES` comma list, e.g. `2330:1500, 0050:200`.
pub(crate) fn parse_holdings(raw: &str) -> Result<Vec<Holding>, TraderError> {
    let invalid = |reason: String| TraderError::ConfigInvalid {
        section: "broker".into(),
        key: "holdings".into(),
        reason,
    };

    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| {
            let (symbol, shares) = token
                .split_once(':')
                .ok_or_else(|| invalid(format!("'{token}' is not SYMBOL:SHARES")))?;
            let shares = shares
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(format!("'{token}': {e}")))?;
            Ok(Holding {
                symbol: symbol.trim().to_uppercase(),
                shares,
            })
        })
        .collect()
}

pub(crate) fn parse_dates(raw: &str) -> Result<Vec<NaiveDate>, TraderError> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| {
            NaiveDate::parse_from_str(token, "%Y-%m-%d").map_err(|_| TraderError::ConfigInvalid {
                section: "broker".into(),
                key: "holidays".into(),
                reason: format!("invalid date '{token}', expected YYYY-MM-DD"),
            })
        })
        .collect()
}
