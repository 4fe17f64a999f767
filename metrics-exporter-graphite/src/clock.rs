use std::time::SystemTime;

/// A source of wall-clock time.
///
/// Used to fill in the timestamp of metrics that are sent without one.
pub trait Clock: Send + Sync {
    /// Returns the current time, in seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// A [`Clock`] backed by the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        // A system clock set before the epoch is treated as the epoch itself.
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()
            .and_then(|d| i64::try_from(d.as_secs()).ok())
            .unwrap_or(0)
    }
}

impl<F> Clock for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn now(&self) -> i64 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::{Clock, SystemClock};

    #[test]
    fn system_clock_tracks_system_time() {
        let before = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64;
        let now = SystemClock.now();
        let after = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64;

        assert!(before <= now && now <= after);
    }

    #[test]
    fn closures_are_clocks() {
        let clock = || 1_700_000_000_i64;
        assert_eq!(clock.now(), 1_700_000_000);
    }
}
