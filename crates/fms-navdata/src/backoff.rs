//! Outage tracking for the navdata backend.
//!
//! The first transport failure opens an outage. While it lasts, requests are
//! refused until the retry deadline; each further failure pushes the deadline
//! out by a window that doubles with the failure count, up to a cap. The
//! first success closes the outage.

use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Outage {
    failures: u32,
    retry_at: Instant,
}

/// Why a request was refused without contacting the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refusal {
    pub remaining: Duration,
    pub failures: u32,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "backing off for another {}ms after {} consecutive failure{}",
            self.remaining.as_millis(),
            self.failures,
            if self.failures == 1 { "" } else { "s" }
        )
    }
}

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    outage: Option<Outage>,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        Self {
            base,
            max: max.max(base),
            outage: None,
        }
    }

    /// Retry window after `failures` consecutive failures: the base window
    /// for the first, doubling for each one after, never above the cap.
    pub fn window(&self, failures: u32) -> Duration {
        let doublings = failures.saturating_sub(1).min(31);
        self.base
            .checked_mul(1 << doublings)
            .map_or(self.max, |window| window.min(self.max))
    }

    /// `Err` while an outage is open and its deadline has not passed.
    pub fn check(&self) -> Result<(), Refusal> {
        match self.outage {
            Some(outage) if Instant::now() < outage.retry_at => Err(Refusal {
                remaining: outage.retry_at.saturating_duration_since(Instant::now()),
                failures: outage.failures,
            }),
            _ => Ok(()),
        }
    }

    /// Record a failure and return the window before the next attempt.
    pub fn record_failure(&mut self) -> Duration {
        let failures = self.outage.map_or(0, |o| o.failures).saturating_add(1);
        let window = self.window(failures);
        self.outage = Some(Outage {
            failures,
            retry_at: Instant::now() + window,
        });
        window
    }

    /// Close any open outage, returning how many failures it counted.
    pub fn record_success(&mut self) -> Option<u32> {
        self.outage.take().map(|o| o.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_outage_allows_requests() {
        let mut backoff = Backoff::new(Duration::from_millis(10), Duration::from_secs(1));
        assert!(backoff.check().is_ok());
        assert_eq!(backoff.record_success(), None);
    }

    #[test]
    fn test_failure_refuses_until_success() {
        let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(60));

        assert_eq!(backoff.record_failure(), Duration::from_secs(5));
        let refusal = backoff.check().unwrap_err();
        assert_eq!(refusal.failures, 1);
        assert!(refusal.remaining > Duration::from_secs(4));
        assert!(refusal.remaining <= Duration::from_secs(5));

        assert_eq!(backoff.record_success(), Some(1));
        assert!(backoff.check().is_ok());
    }

    #[test]
    fn test_window_doubles_per_failure_up_to_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(500));

        let windows: Vec<u64> = (0..5)
            .map(|_| backoff.record_failure().as_millis() as u64)
            .collect();
        assert_eq!(windows, vec![100, 200, 400, 500, 500]);
        assert_eq!(backoff.check().unwrap_err().failures, 5);
        assert_eq!(backoff.window(u32::MAX), Duration::from_millis(500));
    }

    #[test]
    fn test_elapsed_deadline_allows_retry_but_keeps_count() {
        let mut backoff = Backoff::new(Duration::from_millis(1), Duration::from_millis(1));
        backoff.record_failure();
        std::thread::sleep(Duration::from_millis(5));

        assert!(backoff.check().is_ok());
        assert_eq!(backoff.record_failure(), Duration::from_millis(1));
        assert_eq!(backoff.record_success(), Some(2));
    }

    #[test]
    fn test_refusal_message_counts_failures() {
        let refusal = Refusal {
            remaining: Duration::from_millis(1500),
            failures: 3,
        };
        assert_eq!(
            refusal.to_string(),
            "backing off for another 1500ms after 3 consecutive failures"
        );
    }
}
