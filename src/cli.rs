//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::cached_history_adapter::{CachedHistoryAdapter, default_window};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::discord_notifier::DiscordNotifier;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fugle_adapter::FugleAdapter;
use crate::adapters::log_notifier::LogNotifier;
use crate::adapters::paper_broker_adapter::PaperBroker;
use crate::adapters::system_clock::SystemClock;
use crate::domain::config::{HistorySource, NotifySettings, TraderConfig, build_trader_config};
use crate::domain::config_validation::validate_trader_config;
use crate::domain::cycle::DailyCycle;
use crate::domain::error::TraderError;
use crate::domain::report;
use crate::logging::setup_logger;
use crate::ports::clock_port::Clock;
use crate::ports::history_port::HistoryPort;
use crate::ports::notify_port::NotifyPort;

#[derive(Parser, Debug)]
#[command(name = "crosstrader", about = "Daily SMA-crossover equity trader")]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the daily trading cycle until interrupted
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Compute and print today's crossover signals
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        /// Exchange-local date to evaluate (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Compute signals and the order plan without placing anything
    Plan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Fill the history cache for the default multi-year window
    FetchHistory {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    setup_logger(cli.verbose);

    let result = match cli.command {
        Command::Run { config } => run_trader(&config),
        Command::Signals { config, date } => run_signals(&config, date),
        Command::Plan { config, date } => run_plan(&config, date),
        Command::Validate { config } => run_validate(&config),
        Command::FetchHistory { config, symbol } => run_fetch_history(&config, symbol.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Parse, validate and convert the INI file at `path`.
pub fn load_config(path: &Path) -> Result<TraderConfig, TraderError> {
    info!("loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_trader_config(&adapter)?;
    build_trader_config(&adapter)
}

pub fn build_history_port(
    config: &TraderConfig,
    today: NaiveDate,
) -> Box<dyn HistoryPort> {
    let store = CsvAdapter::new(config.history.data_dir.clone());
    match &config.history.source {
        HistorySource::Csv => Box::new(store),
        HistorySource::Fugle { api_key, base_url } => {
            Box::new(CachedHistoryAdapter::new(
                FugleAdapter::new(base_url, api_key, config.fetch_cooldown, SystemClock),
                store,
                default_window(today),
            ))
        }
    }
}

pub fn build_notifier(config: &TraderConfig) -> Box<dyn NotifyPort> {
    match &config.notify {
        NotifySettings::Log => Box::new(LogNotifier),
        NotifySettings::Discord { webhook_url } => Box::new(DiscordNotifier::new(webhook_url)),
    }
}

fn run_trader(config_path: &Path) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    let clock = SystemClock;
    let today = config.schedule.local_date(clock.now());

    let history = build_history_port(&config, today);
    let notifier = build_notifier(&config);
    let mut broker = PaperBroker::new(&config.broker, config.schedule, SystemClock);

    info!(
        "watching {} symbols, SMA({}) / SMA({})",
        config.symbols.len(),
        config.windows.short,
        config.windows.long
    );
    let mut cycle = DailyCycle::new(
        &config,
        history.as_ref(),
        &mut broker,
        notifier.as_ref(),
        &clock,
    );
    cycle.announce_startup();
    cycle.run_forever()
}

pub fn run_signals(config_path: &Path, date: Option<NaiveDate>) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    let clock = SystemClock;
    let date = date.unwrap_or_else(|| config.schedule.local_date(clock.now()));

    let history = build_history_port(&config, date);
    let notifier = LogNotifier;
    let mut broker = PaperBroker::new(&config.broker, config.schedule, SystemClock);
    let cycle = DailyCycle::new(&config, history.as_ref(), &mut broker, &notifier, &clock);

    let signals = cycle.compute_signals(date)?;
    if signals.is_empty() {
        println!("{}", report::no_signal(date));
    } else {
        println!("{}", report::signals(date, &signals));
    }
    Ok(())
}

pub fn run_plan(config_path: &Path, date: Option<NaiveDate>) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    let clock = SystemClock;
    let date = date.unwrap_or_else(|| config.schedule.local_date(clock.now()));

    let history = build_history_port(&config, date);
    let notifier = LogNotifier;
    let mut broker = PaperBroker::new(&config.broker, config.schedule, SystemClock);
    let mut cycle = DailyCycle::new(&config, history.as_ref(), &mut broker, &notifier, &clock);

    let signals = cycle.compute_signals(date)?;
    if signals.is_empty() {
        println!("{}", report::no_signal(date));
        return Ok(());
    }
    println!("{}", report::signals(date, &signals));

    let plan = cycle.compute_orders(&signals)?;
    if plan.is_empty() {
        println!("{}", report::no_orders(date));
    } else {
        println!("{}", report::planned_orders(date, &plan));
        println!("Remaining balance: {:.0}", plan.remaining_balance);
    }
    Ok(())
}

pub fn run_validate(config_path: &Path) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    println!("Symbols:   {}", config.symbols.join(", "));
    println!(
        "Signal:    SMA({}) / SMA({}), {} month lookback",
        config.windows.short, config.windows.long, config.schedule.lookback_months
    );
    println!(
        "Schedule:  {} cutoff {} open {}",
        config.schedule.timezone, config.schedule.pre_open_cutoff, config.schedule.market_open
    );
    println!(
        "Sizing:    lot {} shares, odd lot above {} shares",
        config.sizing.lot_size, config.sizing.min_odd_lot_shares
    );
    println!("Configuration is valid.");
    Ok(())
}

pub fn run_fetch_history(config_path: &Path, symbol: Option<&str>) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    let HistorySource::Fugle { api_key, base_url } = &config.history.source else {
        return Err(TraderError::ConfigInvalid {
            section: "history".into(),
            key: "source".into(),
            reason: "fetch-history needs a remote source (source = fugle)".into(),
        });
    };

    let clock = SystemClock;
    let today = config.schedule.local_date(clock.now());
    let cache = CachedHistoryAdapter::new(
        FugleAdapter::new(base_url, api_key, config.fetch_cooldown, SystemClock),
        CsvAdapter::new(config.history.data_dir.clone()),
        default_window(today),
    );
    let (from, to) = cache.default_window();

    let symbols: Vec<String> = match symbol {
        Some(s) => vec![s.trim().to_uppercase()],
        None => config.symbols.clone(),
    };

    let mut failures = 0usize;
    for (i, symbol) in symbols.iter().enumerate() {
        if i > 0 {
            clock.sleep(config.fetch_cooldown);
        }
        match cache.fetch_history(symbol, from, to) {
            Ok(bars) => println!("{symbol}: {} bars, {from} to {to}", bars.len()),
            Err(e) => {
                warn!("{e}");
                failures += 1;
            }
        }
    }

    if failures == symbols.len() && !symbols.is_empty() {
        return Err(TraderError::history(
            &symbols.join(","),
            "every history request failed",
        ));
    }
    Ok(())
}
