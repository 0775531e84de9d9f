//! Wall clock backed by the OS.

use crate::ports::clock_port::Clock;
use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep_until(&self, deadline: DateTime<Utc>) {
        let now = Utc::now();
        if let Ok(wait) = (deadline - now).to_std() {
            debug!("sleeping {}s until {deadline}", wait.as_secs());
            std::thread::sleep(wait);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn past_deadline_returns_immediately() {
        let clock = SystemClock;
        let before = std::time::Instant::now();
        clock.sleep_until(clock.now() - TimeDelta::hours(1));
        assert!(before.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn short_sleep_waits() {
        let clock = SystemClock;
        let start = clock.now();
        clock.sleep(TimeDelta::milliseconds(20));
        assert!(clock.now() - start >= TimeDelta::milliseconds(20));
    }
}
