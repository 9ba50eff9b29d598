//! Async game session on top of the pure rules core
//!
//! - [`session`]: [`GameSession`], the only place swaps enter the game
//! - [`resolver`]: ordered score / remove / gravity / refill cascade
//! - [`presenter`]: the [`Presenter`] seam plus instant implementations
//! - [`timer`]: the session countdown and the one-shot game-over latch
//! - [`config`]: [`GameConfig`] with file and environment overrides
//!
//! # Example
//!
//! ```
//! use tui_match3_engine::{AnimationTimings, GameConfig, GameSession, Headless};
//!
//! let config = GameConfig::default().with_animation(AnimationTimings::instant());
//! let mut session = GameSession::new(config, Headless).unwrap();
//!
//! let hint = session.hint().unwrap();
//! let outcome = tokio_test::block_on(session.request_swap(hint.from, hint.to)).unwrap();
//! assert!(outcome.is_accepted());
//! ```

pub mod config;
pub mod presenter;
pub mod resolver;
pub mod session;
pub mod timer;

pub use tui_match3_core as core;
pub use tui_match3_types as types;

pub use config::{AnimationTimings, ConfigError, GameConfig, CONFIG_PATH_ENV};
pub use presenter::{Event, Headless, Motion, Presenter, Recorder, ScreenPos};
pub use resolver::{BatchReport, MatchReport};
pub use session::{GameSession, SessionError, SessionSnapshot, SwapOutcome, TurnReport};
pub use timer::{format_clock, Countdown, CountdownTick, GameOverLatch};
