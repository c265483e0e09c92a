//! Pure timing for source edits.
//!
//! Keeps only the latest edit. An edit is ready once no newer edit has
//! arrived for the quiet interval; a primed (seed) edit is ready at once.

use std::time::Duration;

use tokio::time::Instant;

/// Sleep used when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<String>,
    last_edit: Option<Instant>,
    /// Pending edit skips the quiet interval
    settled: bool,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_edit: None,
            settled: false,
        }
    }

    /// Record an edit, restarting the quiet interval.
    pub fn push(&mut self, source: String) {
        self.pending = Some(source);
        self.last_edit = Some(Instant::now());
        self.settled = false;
    }

    /// Record an edit that is settled already.
    pub fn prime(&mut self, source: String) {
        self.pending = Some(source);
        self.last_edit = Some(Instant::now());
        self.settled = true;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_ready(&self) -> bool {
        match self.last_edit {
            Some(last) => self.pending.is_some() && (self.settled || last.elapsed() >= self.quiet),
            None => false,
        }
    }

    /// Take the settled edit, if any.
    pub fn take_if_ready(&mut self) -> Option<String> {
        if !self.is_ready() {
            return None;
        }
        self.last_edit = None;
        self.settled = false;
        self.pending.take()
    }

    /// Precise sleep duration until the pending edit settles.
    pub fn sleep_duration(&self) -> Duration {
        let (Some(last), true) = (self.last_edit, self.pending.is_some()) else {
            return IDLE;
        };
        if self.settled {
            return Duration::from_millis(1);
        }
        self.quiet
            .saturating_sub(last.elapsed())
            .max(Duration::from_millis(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(1000);

    #[tokio::test(start_paused = true)]
    async fn test_idle() {
        let mut debouncer = Debouncer::new(QUIET);
        assert!(!debouncer.is_ready());
        assert_eq!(debouncer.take_if_ready(), None);
        assert_eq!(debouncer.sleep_duration(), IDLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settles_after_quiet() {
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.push("a".into());
        assert_eq!(debouncer.take_if_ready(), None);

        tokio::time::advance(Duration::from_millis(999)).await;
        assert_eq!(debouncer.take_if_ready(), None);
        assert_eq!(debouncer.sleep_duration(), Duration::from_millis(1));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(debouncer.take_if_ready().as_deref(), Some("a"));
        assert!(!debouncer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_resets_and_keeps_latest() {
        let mut debouncer = Debouncer::new(QUIET);
        for text in ["a", "ab", "abc"] {
            debouncer.push(text.into());
            tokio::time::advance(Duration::from_millis(600)).await;
            if text != "abc" {
                assert_eq!(debouncer.take_if_ready(), None);
            }
        }
        assert_eq!(debouncer.take_if_ready(), None);
        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(debouncer.take_if_ready().as_deref(), Some("abc"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_prime_is_ready_immediately() {
        let mut debouncer = Debouncer::new(QUIET);
        debouncer.prime("seed".into());
        assert_eq!(debouncer.take_if_ready().as_deref(), Some("seed"));
    }
}
