//! Terminal front end for the match-3 session.
//!
//! A small, game-oriented rendering layer: no widget toolkit, just a
//! framebuffer that is diffed and flushed to the terminal.
//!
//! - [`scene`]: sprite state shared with the session via [`TerminalPresenter`]
//! - [`board_view`]: pure scene-to-framebuffer mapping
//! - [`fb`]: styled cell framebuffer
//! - [`renderer`]: crossterm output with diff redraws

pub mod board_view;
pub mod fb;
pub mod renderer;
pub mod scene;

pub use tui_match3_engine as engine;
pub use tui_match3_types as types;

pub use board_view::{BoardFrame, BoardView, Viewport};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use scene::{Popup, Scene, Sprite, TerminalPresenter};
