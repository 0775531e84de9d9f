//! Exchange calendar arithmetic.
//!
//! All day boundaries are taken in the exchange's local timezone; instants
//! handed to the clock are UTC.

use chrono::{
    DateTime, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub timezone: Tz,
    /// A cycle may only start while local time is before this.
    pub pre_open_cutoff: NaiveTime,
    pub market_open: NaiveTime,
    pub lookback_months: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Taipei,
            pre_open_cutoff: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            market_open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            lookback_months: 11,
        }
    }
}

impl Schedule {
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        now.with_timezone(&self.timezone).time() < self.pre_open_cutoff
    }

    /// Start of the next local day, strictly after `now`.
    ///
    /// Where a DST change skips midnight the day starts at the first local
    /// time that exists.
    pub fn next_day_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut day = self.local_date(now);
        loop {
            let Some(next) = day.checked_add_days(Days::new(1)) else {
                return now + TimeDelta::days(1);
            };
            let boundary = self.local_instant(next.and_time(NaiveTime::MIN));
            if boundary > now {
                return boundary;
            }
            day = next;
        }
    }

    pub fn market_open_at(&self, date: NaiveDate) -> DateTime<Utc> {
        self.local_instant(date.and_time(self.market_open))
    }

    /// Trailing `[from, to]` history range ending on `date`.
    pub fn history_window(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let from = date
            .checked_sub_months(Months::new(self.lookback_months))
            .unwrap_or(NaiveDate::MIN);
        (from, date)
    }

    /// Resolve a local wall-clock reading, moving forward out of a DST gap.
    fn local_instant(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let mut probe = local;
        // Gaps are at most a few hours; a day of quarter-hour steps covers any zone.
        for _ in 0..96 {
            if let Some(t) = self.timezone.from_local_datetime(&probe).earliest() {
                return t.with_timezone(&Utc);
            }
            probe += TimeDelta::minutes(15);
        }
        Utc.from_utc_datetime(&local)
    }
}
