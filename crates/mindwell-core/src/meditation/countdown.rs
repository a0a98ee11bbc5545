//! One-second countdown driver.
//!
//! A spawned task sends a [`CountdownTick`] per period to the owner of the
//! session state, which applies it on its own task. Every `start` bumps a
//! generation counter so ticks still queued from a cancelled run are
//! recognisable and dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    generation: u64,
}

#[derive(Debug)]
pub struct Countdown {
    period: Duration,
    tx: mpsc::UnboundedSender<CountdownTick>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl Countdown {
    pub fn new(tx: mpsc::UnboundedSender<CountdownTick>) -> Self {
        Self::with_period(tx, TICK_PERIOD)
    }

    pub fn with_period(tx: mpsc::UnboundedSender<CountdownTick>, period: Duration) -> Self {
        Self {
            period,
            tx,
            handle: None,
            generation: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether `tick` belongs to the currently running countdown.
    pub fn is_current(&self, tick: CountdownTick) -> bool {
        self.is_active() && tick.generation == self.generation
    }

    /// Start ticking. Does nothing if already active. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self) {
        if self.is_active() {
            return;
        }
        self.generation += 1;
        let tick = CountdownTick {
            generation: self.generation,
        };
        let tx = self.tx.clone();
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(tick).is_err() {
                    break;
                }
            }
        }));
    }

    /// Stop ticking. Safe to call any number of times; returns whether a
    /// running countdown was stopped.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
