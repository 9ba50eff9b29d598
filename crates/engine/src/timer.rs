//! Session countdown and the game-over latch
//!
//! The countdown runs independently of the cascade. Whichever of timer expiry
//! and deadlock detection trips the [`GameOverLatch`] first decides the
//! reason; the latch only trips once.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::presenter::Presenter;
use crate::types::GameOverReason;

const RUNNING: u8 = 0;
const DEADLOCK: u8 = 1;
const TIME_UP: u8 = 2;
const SUPERSEDED: u8 = 3;

/// Shared one-shot game-over flag
#[derive(Debug, Clone, Default)]
pub struct GameOverLatch {
    state: Arc<AtomicU8>,
}

impl GameOverLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the latch; `true` only for the first caller.
    pub fn trip(&self, reason: GameOverReason) -> bool {
        let code = match reason {
            GameOverReason::Deadlock => DEADLOCK,
            GameOverReason::TimeUp => TIME_UP,
        };
        self.state
            .compare_exchange(RUNNING, code, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn reason(&self) -> Option<GameOverReason> {
        match self.state.load(Ordering::Acquire) {
            DEADLOCK => Some(GameOverReason::Deadlock),
            TIME_UP => Some(GameOverReason::TimeUp),
            _ => None,
        }
    }

    /// True once tripped or superseded
    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) != RUNNING
    }

    /// Retire the latch after a reset; countdowns holding it stop quietly.
    pub fn supersede(&self) {
        self.state.store(SUPERSEDED, Ordering::Release);
    }
}

/// Format milliseconds as `mm:ss.mmm`
pub fn format_clock(ms: u32) -> String {
    format!("{:02}:{:02}.{:03}", ms / 60_000, (ms / 1000) % 60, ms % 1000)
}

/// Result of one countdown step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Milliseconds left
    Running(u32),
    /// This tick reached zero and tripped the latch
    Expired,
    /// The latch was already closed; nothing was done
    Halted,
}

/// Countdown that forces a time-up game over
#[derive(Debug)]
pub struct Countdown<P> {
    remaining_ms: u32,
    step_ms: u32,
    latch: GameOverLatch,
    presenter: P,
}

impl<P: Presenter> Countdown<P> {
    pub fn new(total_ms: u32, step_ms: u32, latch: GameOverLatch, presenter: P) -> Self {
        Self {
            remaining_ms: total_ms,
            step_ms: step_ms.max(1),
            latch,
            presenter,
        }
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    /// Advance by one step without waiting
    pub fn tick(&mut self) -> CountdownTick {
        if self.latch.is_closed() {
            return CountdownTick::Halted;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(self.step_ms);
        self.presenter.set_timer_text(&format_clock(self.remaining_ms));
        if self.remaining_ms > 0 {
            return CountdownTick::Running(self.remaining_ms);
        }
        if self.latch.trip(GameOverReason::TimeUp) {
            info!("time up");
            self.presenter.game_over(GameOverReason::TimeUp);
            CountdownTick::Expired
        } else {
            CountdownTick::Halted
        }
    }

    /// Tick every `step_ms` until expiry or until the latch closes.
    ///
    /// Returns `true` when this countdown ended the game.
    pub async fn run(mut self) -> bool {
        let mut ticker = interval(Duration::from_millis(self.step_ms as u64));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match self.tick() {
                CountdownTick::Running(_) => {}
                CountdownTick::Expired => return true,
                CountdownTick::Halted => {
                    debug!("countdown halted");
                    return false;
                }
            }
        }
    }
}
