//! Tick sources for timed phases.
//!
//! A [`Clock`] is a 1 Hz subscription: while subscribed, each call to
//! [`Clock::wait_tick`] blocks until the next tick is due. Nothing runs in
//! the background, so ticks never overlap with user actions.

use std::time::{Duration, Instant};

/// Periodic tick subscription
pub trait Clock {
    /// Start delivering ticks. Subscribing twice is harmless.
    fn subscribe(&mut self);

    /// Stop delivering ticks. Idempotent.
    fn cancel(&mut self);

    fn is_subscribed(&self) -> bool;

    /// Block until the next tick. Returns `false` immediately when not
    /// subscribed.
    fn wait_tick(&mut self) -> bool;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn subscribe(&mut self) {
        (**self).subscribe()
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn is_subscribed(&self) -> bool {
        (**self).is_subscribed()
    }

    fn wait_tick(&mut self) -> bool {
        (**self).wait_tick()
    }
}

/// Wall-clock ticker, one tick per `period` (1 second by default)
#[derive(Debug)]
pub struct SystemClock {
    period: Duration,
    next_deadline: Option<Instant>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            next_deadline: None,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn subscribe(&mut self) {
        if self.next_deadline.is_none() {
            // A resumed timer waits a full period before its next tick
            self.next_deadline = Some(Instant::now() + self.period);
        }
    }

    fn cancel(&mut self) {
        self.next_deadline = None;
    }

    fn is_subscribed(&self) -> bool {
        self.next_deadline.is_some()
    }

    fn wait_tick(&mut self) -> bool {
        let Some(deadline) = self.next_deadline else {
            return false;
        };

        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        // Schedule from the deadline, not from wake-up, so ticks do not drift
        self.next_deadline = Some(deadline + self.period);
        true
    }
}

/// Ticker that fires immediately; drives sessions in tests and `--auto` runs
#[derive(Debug, Default)]
pub struct InstantClock {
    subscribed: bool,
    pub subscribe_count: usize,
    pub cancel_count: usize,
    pub ticks_delivered: usize,
}

impl InstantClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for InstantClock {
    fn subscribe(&mut self) {
        if !self.subscribed {
            self.subscribed = true;
            self.subscribe_count += 1;
        }
    }

    fn cancel(&mut self) {
        if self.subscribed {
            self.subscribed = false;
            self.cancel_count += 1;
        }
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    fn wait_tick(&mut self) -> bool {
        if self.subscribed {
            self.ticks_delivered += 1;
        }
        self.subscribed
    }
}
