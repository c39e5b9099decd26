use std::time::{Duration, Instant};

/// Periodic tick source. Stopped until `start` is called.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker { period, next: None }
    }

    #[cfg(test)]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    /// Cancels the pending tick and schedules the next one a full new period
    /// from `now`.
    pub fn restart(&mut self, period: Duration, now: Instant) {
        self.period = period;
        self.start(now);
    }

    /// How long the caller may wait for input before the next tick is due.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(now))
    }

    /// Consumes at most one due tick. Missed periods are dropped instead of
    /// being replayed in a burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now >= next => {
                let following = next + self.period;
                self.next = Some(if following > now { following } else { now + self.period });
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn stopped_ticker_never_fires() {
        let mut ticker = Ticker::new(MS * 130);
        let now = Instant::now();
        assert!(!ticker.is_running());
        assert!(!ticker.poll(now + MS * 1000));
        assert_eq!(ticker.time_until(now), None);
    }

    #[test]
    fn fires_once_per_period() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(MS * 100);
        ticker.start(t0);

        assert!(!ticker.poll(t0 + MS * 99));
        assert_eq!(ticker.time_until(t0 + MS * 40), Some(MS * 60));
        assert!(ticker.poll(t0 + MS * 100));
        assert!(!ticker.poll(t0 + MS * 150));
        assert!(ticker.poll(t0 + MS * 205));
        assert_eq!(ticker.time_until(t0 + MS * 205), Some(MS * 95));
    }

    #[test]
    fn late_poll_does_not_burst() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(MS * 100);
        ticker.start(t0);

        assert!(ticker.poll(t0 + MS * 1000));
        assert!(!ticker.poll(t0 + MS * 1001));
        assert_eq!(ticker.time_until(t0 + MS * 1000), Some(MS * 100));
    }

    #[test]
    fn restart_reschedules_from_now() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(MS * 130);
        ticker.start(t0);

        ticker.restart(MS * 120, t0 + MS * 130);
        assert_eq!(ticker.period(), MS * 120);
        assert!(!ticker.poll(t0 + MS * 249));
        assert!(ticker.poll(t0 + MS * 250));
    }

    #[test]
    fn stop_cancels() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(MS * 10);
        ticker.start(t0);
        ticker.stop();
        assert!(!ticker.poll(t0 + MS * 50));
    }
}
