//! Animation driver
//!
//! A two-state machine (idle / running) stepped by a cooperative [`Ticker`].
//! The host loop polls the driver with the current time; each due tick calls
//! [`Session::animation_step`], which either decrements the shared phase and
//! regenerates, or rotates the ECG trace.
//!
//! Stopping is synchronous: once [`AnimationDriver::disable`] returns, no
//! pending tick is delivered.

use crate::config::AnimationConfig;
use crate::session::Session;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Upper bound on ticks delivered by a single poll after a stall
pub const MAX_CATCH_UP: u32 = 64;

/// Per-session animation parameters and on/off flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub enabled: bool,
    /// Phase decrement per tick for generated and synthesized signals
    pub phase_step: f64,
    /// Samples rotated per tick for the ECG trace
    pub shift_amount: usize,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

impl AnimationState {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            enabled: false,
            phase_step: config.phase_step,
            shift_amount: config.ecg_shift,
        }
    }
}

/// Repeating task with start/stop control, polled by the host loop
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
    max_catch_up: u32,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            max_catch_up: MAX_CATCH_UP,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Schedule the first tick one interval after `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Cancel the schedule; any ticks not yet collected are dropped
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Number of ticks that fell due up to `now`, capped at the catch-up
    /// limit. Ticks skipped by the cap are not replayed later.
    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(next) = self.next_due else {
            return 0;
        };
        if now < next {
            return 0;
        }
        if self.interval.is_zero() {
            self.next_due = Some(now);
            return 1;
        }

        let behind = now.duration_since(next).as_nanos() / self.interval.as_nanos();
        let elapsed_ticks = u32::try_from(behind.saturating_add(1)).unwrap_or(u32::MAX);
        self.next_due = Some(next + self.interval.saturating_mul(elapsed_ticks));
        elapsed_ticks.min(self.max_catch_up)
    }
}

/// Drives a session's animation from a [`Ticker`]
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    ticker: Ticker,
}

impl AnimationDriver {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            ticker: Ticker::new(Duration::from_millis(config.tick_interval_ms)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Idle -> Running. Has no effect while the session has no samples.
    pub fn enable(&mut self, session: &mut Session, now: Instant) -> bool {
        if self.is_running() {
            return true;
        }
        if !session.set_animation(true) {
            return false;
        }
        self.ticker.start(now);
        info!("Animation started ({:?} per tick)", self.ticker.interval());
        true
    }

    /// Running -> Idle. Stops the ticker before returning.
    pub fn disable(&mut self, session: &mut Session) {
        self.ticker.stop();
        session.set_animation(false);
        info!("Animation stopped");
    }

    /// Flip between idle and running; returns whether it is now running
    pub fn toggle(&mut self, session: &mut Session, now: Instant) -> bool {
        if self.is_running() {
            self.disable(session);
            false
        } else {
            self.enable(session, now)
        }
    }

    /// Deliver every tick due at `now`; returns how many were applied
    pub fn poll(&mut self, session: &mut Session, now: Instant) -> u32 {
        self.poll_at_most(session, now, u32::MAX)
    }

    /// Like [`poll`](Self::poll), but applies no more than `limit` ticks.
    /// Due ticks beyond the limit are dropped.
    pub fn poll_at_most(&mut self, session: &mut Session, now: Instant, limit: u32) -> u32 {
        if !session.animation().enabled {
            self.ticker.stop();
            return 0;
        }
        let due = self.ticker.due(now).min(limit);
        let mut applied = 0;
        for _ in 0..due {
            if session.animation_step() {
                applied += 1;
            }
        }
        if applied > 0 {
            debug!("Applied {} animation tick(s)", applied);
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::SignalFamily;

    #[test]
    fn test_ticker_not_due_before_interval() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(10));
        ticker.start(start);
        assert_eq!(ticker.due(start + Duration::from_millis(5)), 0);
        assert_eq!(ticker.due(start + Duration::from_millis(10)), 1);
        assert_eq!(ticker.due(start + Duration::from_millis(15)), 0);
        assert_eq!(ticker.due(start + Duration::from_millis(20)), 1);
    }

    #[test]
    fn test_ticker_counts_missed_ticks() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(10));
        ticker.start(start);
        assert_eq!(ticker.due(start + Duration::from_millis(45)), 4);
        assert_eq!(ticker.due(start + Duration::from_millis(49)), 0);
        assert_eq!(ticker.due(start + Duration::from_millis(50)), 1);
    }

    #[test]
    fn test_ticker_caps_catch_up() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(1));
        ticker.start(start);
        assert_eq!(ticker.due(start + Duration::from_secs(10)), MAX_CATCH_UP);
        // The backlog is dropped, not replayed
        assert_eq!(ticker.due(start + Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_ticker_stop_drops_pending() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(1));
        ticker.start(start);
        ticker.stop();
        assert!(!ticker.is_running());
        assert_eq!(ticker.due(start + Duration::from_millis(100)), 0);
    }

    #[test]
    fn test_zero_interval_ticks_every_poll() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::ZERO);
        ticker.start(start);
        assert_eq!(ticker.due(start), 1);
        assert_eq!(ticker.due(start), 1);
    }

    #[test]
    fn test_poll_at_most_caps_applied_ticks() {
        let config = Config::default();
        let mut session = Session::with_seed(config.clone(), 1).unwrap();
        session.select_family(SignalFamily::Basic);
        let mut driver = AnimationDriver::new(&config.animation);
        let start = Instant::now();
        assert!(driver.enable(&mut session, start));

        let interval = driver.ticker().interval();
        let applied = driver.poll_at_most(&mut session, start + interval * 5, 2);
        assert_eq!(applied, 2);
        let phase = session.spec().phase;
        assert!((phase + 2.0 * config.animation.phase_step).abs() < 1e-12, "Phase {}", phase);

        // The three ticks over the limit are not replayed
        assert_eq!(driver.poll(&mut session, start + interval * 5), 0);
    }

    #[test]
    fn test_state_from_config() {
        let state = AnimationState::default();
        assert!(!state.enabled);
        assert_eq!(state.phase_step, 0.05);
        assert_eq!(state.shift_amount, 15);
    }
}
