//! TUI Match-3 (workspace facade crate).
//!
//! Re-exports the member crates as `tui_match3::{core,engine,term,types}` while
//! the implementation lives in dedicated crates under `crates/`.

pub use tui_match3_core as core;
pub use tui_match3_engine as engine;
pub use tui_match3_term as term;
pub use tui_match3_types as types;
