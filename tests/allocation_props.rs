//! Property tests for signal generation and order sizing.

use chrono::{Days, NaiveDate};
use crosstrader::domain::ohlcv::OhlcvBar;
use crosstrader::domain::order::{LotKind, Side};
use crosstrader::domain::signal::{Intention, Signal, SignalSet, SignalWindows, compute_signal};
use crosstrader::domain::sizing::{Budget, Holding, SizingPolicy, allocate_orders};
use proptest::prelude::*;

fn bars(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let date = start.checked_add_days(Days::new(i as u64)).unwrap();
            OhlcvBar::new(date, c, c, c, c)
        })
        .collect()
}

fn mean(closes: &[f64], end: usize, period: usize) -> f64 {
    closes[end + 1 - period..=end].iter().sum::<f64>() / period as f64
}

fn signal(symbol: &str, intention: Intention, price: f64) -> Signal {
    Signal {
        symbol: symbol.to_string(),
        intention,
        reference_price: price,
    }
}

fn windows() -> impl Strategy<Value = SignalWindows> {
    (1usize..6).prop_flat_map(|short| {
        (short + 1..12).prop_map(move |long| SignalWindows { short, long })
    })
}

fn buy_signals() -> impl Strategy<Value = Vec<Signal>> {
    prop::collection::vec(1.0f64..2000.0, 0..8).prop_map(|prices| {
        prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| signal(&format!("B{i}"), Intention::Buy, price))
            .collect()
    })
}

proptest! {
    #[test]
    fn signal_matches_crossing_rule(
        w in windows(),
        closes in prop::collection::vec(1.0f64..500.0, 0..40),
    ) {
        let got = compute_signal("X", &bars(&closes), w);

        if closes.len() < w.min_bars() {
            prop_assert_eq!(got.intention, Intention::None);
            prop_assert!(got.reference_price.is_nan());
            return Ok(());
        }

        let last = closes.len() - 1;
        let (a0, b0) = (mean(&closes, last - 1, w.short), mean(&closes, last - 1, w.long));
        let (a1, b1) = (mean(&closes, last, w.short), mean(&closes, last, w.long));
        let expected = if a0 <= b0 && a1 > b1 {
            Intention::Buy
        } else if a0 >= b0 && a1 < b1 {
            Intention::Sell
        } else {
            Intention::None
        };

        prop_assert_eq!(got.intention, expected);
        if expected == Intention::None {
            prop_assert!(got.reference_price.is_nan());
        } else {
            prop_assert_eq!(got.reference_price, closes[last]);
        }
    }

    #[test]
    fn history_shorter_than_long_window_is_none(
        w in windows(),
        closes in prop::collection::vec(1.0f64..500.0, 0..12),
    ) {
        prop_assume!(closes.len() < w.long);
        prop_assert_eq!(compute_signal("X", &bars(&closes), w).intention, Intention::None);
    }

    #[test]
    fn buys_never_exceed_budget(
        buys in buy_signals(),
        balance in 0.0f64..5_000_000.0,
        settlements in -200_000.0f64..200_000.0,
        reserved in 0.0f64..500_000.0,
        trade_limit in 0.0f64..3_000_000.0,
        min_odd in 0u64..200,
    ) {
        let available = Budget { balance, settlements, reserved, trade_limit }.available();
        let policy = SizingPolicy { lot_size: 1000, min_odd_lot_shares: min_odd };
        let set = SignalSet { buys, sells: Vec::new() };

        let plan = allocate_orders(&set, available, &[], &policy);
        let spent: f64 = plan.buys.iter().map(|o| o.notional()).sum();

        prop_assert!(available <= trade_limit.max(0.0));
        prop_assert!(spent <= available + 1e-6);
        prop_assert!(spent <= trade_limit + 1e-6);
        prop_assert!(plan.remaining_balance >= 0.0);
        prop_assert!((available - spent - plan.remaining_balance).abs() < 1e-3);

        for order in &plan.buys {
            prop_assert_eq!(order.side, Side::Buy);
            prop_assert!(order.quantity > 0);
            match order.lot_kind {
                LotKind::Round => prop_assert_eq!(order.quantity % 1000, 0),
                LotKind::Odd => {
                    prop_assert!(order.quantity < 1000);
                    prop_assert!(order.quantity >= min_odd);
                }
            }
        }
    }

    #[test]
    fn sells_liquidate_exactly_the_holding(
        owned in prop::collection::vec(0u64..10_000, 1..6),
        lot_size in 1u64..2000,
    ) {
        let holdings: Vec<Holding> = owned
            .iter()
            .enumerate()
            .map(|(i, &shares)| Holding { symbol: format!("S{i}"), shares })
            .collect();
        let sells: Vec<Signal> = holdings
            .iter()
            .map(|h| signal(&h.symbol, Intention::Sell, 42.0))
            .collect();
        let set = SignalSet { buys: Vec::new(), sells };
        let policy = SizingPolicy { lot_size, min_odd_lot_shares: 50 };

        let plan = allocate_orders(&set, 0.0, &holdings, &policy);

        for h in &holdings {
            let orders: Vec<_> = plan.sells.iter().filter(|o| o.symbol == h.symbol).collect();
            let total: u64 = orders.iter().map(|o| o.quantity).sum();
            prop_assert_eq!(total, h.shares);
            prop_assert!(orders.len() <= 2);
            for o in orders {
                match o.lot_kind {
                    LotKind::Round => prop_assert_eq!(o.quantity % lot_size, 0),
                    LotKind::Odd => prop_assert!(o.quantity < lot_size),
                }
            }
        }
    }

    #[test]
    fn allocation_is_deterministic(
        buys in buy_signals(),
        balance in 0.0f64..5_000_000.0,
        owned in 0u64..5000,
    ) {
        let holdings = vec![Holding { symbol: "S".into(), shares: owned }];
        let set = SignalSet { buys, sells: vec![signal("S", Intention::Sell, 10.0)] };
        let policy = SizingPolicy::default();

        let first = allocate_orders(&set, balance, &holdings, &policy);
        let second = allocate_orders(&set, balance, &holdings, &policy);

        prop_assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }
}

#[test]
fn round_lot_scenario_spends_everything() {
    let set = SignalSet {
        buys: vec![signal("2330", Intention::Buy, 500.0)],
        sells: Vec::new(),
    };
    let plan = allocate_orders(&set, 1_000_000.0, &[], &SizingPolicy::default());
    assert_eq!(plan.buys.len(), 1);
    assert_eq!(plan.buys[0].quantity, 2000);
    assert_eq!(plan.buys[0].lot_kind, LotKind::Round);
    assert_eq!(plan.remaining_balance, 0.0);
}
