use std::time::Duration;

/// Monotonic session time advanced by the host loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    elapsed: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, delta: Duration) -> Duration {
        self.elapsed += delta;
        self.elapsed
    }
}

/// Restartable fixed-period timer.
///
/// `poll` reports at most one due tick per call. A late poll does not replay
/// the periods it missed; the next deadline is measured from the poll that
/// fired.
#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    period: Option<Duration>,
    next_due: Duration,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the timer. The first tick is due one period
    /// after `now`.
    pub fn start(&mut self, period: Duration, now: Duration) {
        self.period = Some(period);
        self.next_due = now + period;
    }

    pub fn stop(&mut self) {
        self.period = None;
    }

    pub fn poll(&mut self, now: Duration) -> bool {
        match self.period {
            Some(period) if now >= self.next_due => {
                self.next_due = now + period;
                true
            }
            _ => false,
        }
    }
}
