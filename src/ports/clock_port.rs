//! Wall clock and timed suspension.

use chrono::{DateTime, TimeDelta, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Block until `deadline`. Returns immediately if it has already passed.
    fn sleep_until(&self, deadline: DateTime<Utc>);

    fn sleep(&self, duration: TimeDelta) {
        self.sleep_until(self.now() + duration);
    }
}
