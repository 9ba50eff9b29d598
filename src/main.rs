//! Terminal match-3 runner (default binary).
//!
//! `tui-match3` runs an autoplay demo in the terminal: the session plays its
//! own hints while the countdown runs. Keys: `q`/`Esc`/`Ctrl-C` quit, `r`
//! restarts.
//!
//! `tui-match3 headless [--turns N]` plays without a terminal or countdown and
//! prints the final snapshot as JSON.
//!
//! Configuration comes from `MATCH3_CONFIG` / `MATCH3_*` (see
//! `GameConfig::load`). In terminal mode logs go to the file named by
//! `MATCH3_LOG_PATH`, if set; headless mode logs to stderr.

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{info, warn};

use tui_match3::engine::{AnimationTimings, GameConfig, GameSession, Headless};
use tui_match3::term::{BoardView, FrameBuffer, TerminalPresenter, TerminalRenderer, Viewport};
use tui_match3::types::TurnState;

const DEFAULT_HEADLESS_TURNS: u32 = 50;
const FRAME_MS: u64 = 33;
const THINK_MS: u64 = 600;
const SELECT_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Terminal,
    Headless { turns: u32 },
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Mode> {
    let Some(first) = args.next() else {
        return Ok(Mode::Terminal);
    };
    if first != "headless" {
        bail!("unknown argument {first:?}; usage: tui-match3 [headless [--turns N]]");
    }

    let mut turns = DEFAULT_HEADLESS_TURNS;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--turns" => {
                let value = args.next().context("--turns needs a value")?;
                turns = value
                    .parse()
                    .with_context(|| format!("invalid --turns value {value:?}"))?;
            }
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(Mode::Headless { turns })
}

fn init_tracing(mode: Mode) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match mode {
        Mode::Headless { .. } => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init()?;
        }
        Mode::Terminal => {
            // Anything written to the terminal would corrupt the alternate screen.
            let Some(path) = std::env::var("MATCH3_LOG_PATH")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
            else {
                return Ok(());
            };
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {path}"))?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(std::sync::Mutex::new(file)))
                .with(filter)
                .try_init()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let mode = parse_args(std::env::args().skip(1))?;
    init_tracing(mode)?;
    let config = GameConfig::load()?;
    info!(
        width = config.width,
        height = config.height,
        kinds = config.kinds,
        seed = config.seed,
        "starting"
    );

    let rt = tokio::runtime::Runtime::new()?;
    match mode {
        Mode::Headless { turns } => rt.block_on(run_headless(config, turns)),
        Mode::Terminal => {
            let mut term = TerminalRenderer::new();
            term.enter()?;
            let result = rt.block_on(run_terminal(&mut term, config));
            // Always try to restore terminal state.
            let _ = term.exit();
            result
        }
    }
}

async fn run_headless(config: GameConfig, turns: u32) -> Result<()> {
    let config = config.with_animation(AnimationTimings::instant());
    let mut session = GameSession::new(config, Headless)?;

    for _ in 0..turns {
        let Some(swap) = session.hint() else {
            break;
        };
        session.request_swap(swap.from, swap.to).await?;
    }

    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Quit,
    Restart,
    Resize,
}

/// Blocking crossterm reader on its own thread; stops when the receiver is gone.
fn spawn_key_pump() -> mpsc::UnboundedReceiver<Key> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(50)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!(error = %e, "input poll failed");
                    let _ = tx.send(Key::Quit);
                    return;
                }
            }
            let key = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => Some(Key::Quit),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        Some(Key::Quit)
                    }
                    KeyCode::Char('r') => Some(Key::Restart),
                    _ => None,
                },
                Ok(Event::Resize(_, _)) => Some(Key::Resize),
                Ok(_) => None,
                Err(_) => Some(Key::Quit),
            };
            if let Some(key) = key {
                if tx.send(key).is_err() {
                    return;
                }
            }
        }
    });
    rx
}

enum Completion<T> {
    Done(T),
    Quit,
}

/// Frame loop state: keeps drawing while the session awaits animations
struct Frontend<'a> {
    term: &'a mut TerminalRenderer,
    presenter: TerminalPresenter,
    view: BoardView,
    fb: FrameBuffer,
    keys: mpsc::UnboundedReceiver<Key>,
    pending: Option<Key>,
}

impl Frontend<'_> {
    fn draw(&mut self) -> Result<()> {
        let now = Instant::now();
        let scene = self.presenter.with_scene(|s| {
            s.prune(now);
            s.clone()
        });
        let viewport = self.term.viewport().unwrap_or(Viewport::new(80, 24));
        self.view.render_into(&scene, now, viewport, &mut self.fb);
        self.term.draw_swap(&mut self.fb)
    }

    fn on_key(&mut self, key: Option<Key>) -> Option<Key> {
        match key {
            None | Some(Key::Quit) => Some(Key::Quit),
            Some(Key::Resize) => {
                self.term.invalidate();
                None
            }
            Some(Key::Restart) => Some(Key::Restart),
        }
    }

    /// Drive `fut` to completion while drawing frames. A restart request is
    /// held until the future is done; quitting drops the future.
    async fn run_to_completion<F: Future>(&mut self, fut: F) -> Result<Completion<F::Output>> {
        tokio::pin!(fut);
        let mut frames = interval(Duration::from_millis(FRAME_MS));
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                out = &mut fut => {
                    self.draw()?;
                    return Ok(Completion::Done(out));
                }
                _ = frames.tick() => self.draw()?,
                key = self.keys.recv() => match self.on_key(key) {
                    Some(Key::Quit) => return Ok(Completion::Quit),
                    Some(other) => self.pending = Some(other),
                    None => {}
                },
            }
        }
    }

    /// Draw frames for `duration`; returns early with the first key.
    async fn idle(&mut self, duration: Duration) -> Result<Option<Key>> {
        if let Some(key) = self.pending.take() {
            return Ok(Some(key));
        }
        match self.run_to_completion(sleep(duration)).await? {
            Completion::Done(()) => Ok(self.pending.take()),
            Completion::Quit => Ok(Some(Key::Quit)),
        }
    }
}

async fn run_terminal(term: &mut TerminalRenderer, config: GameConfig) -> Result<()> {
    let presenter = TerminalPresenter::new(config.width, config.height);
    let mut session = GameSession::new(config, presenter.clone())?;
    let mut frontend = Frontend {
        term,
        presenter,
        view: BoardView::default(),
        fb: FrameBuffer::new(80, 24),
        keys: spawn_key_pump(),
        pending: None,
    };
    let mut countdown = tokio::spawn(session.countdown().run());

    loop {
        let key = match (session.state(), session.hint()) {
            (TurnState::Idle, Some(swap)) => match frontend.idle(Duration::from_millis(THINK_MS)).await? {
                Some(key) => Some(key),
                None => {
                    let _ = session.select(swap.from);
                    match frontend.idle(Duration::from_millis(SELECT_MS)).await? {
                        Some(key) => Some(key),
                        None => match frontend.run_to_completion(session.swap_selected(swap.to)).await? {
                            Completion::Done(outcome) => {
                                outcome?;
                                frontend.pending.take()
                            }
                            Completion::Quit => Some(Key::Quit),
                        },
                    }
                }
            },
            _ => frontend.idle(Duration::from_secs(3600)).await?,
        };

        match key {
            Some(Key::Quit) => break,
            Some(Key::Restart) => {
                countdown.abort();
                session.reset()?;
                countdown = tokio::spawn(session.countdown().run());
            }
            _ => {}
        }
    }

    countdown.abort();
    info!(score = session.progress().score(), turns = session.turns(), "quit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_modes() {
        assert_eq!(parse_args(args(&[])).unwrap(), Mode::Terminal);
        assert_eq!(
            parse_args(args(&["headless"])).unwrap(),
            Mode::Headless {
                turns: DEFAULT_HEADLESS_TURNS
            }
        );
        assert_eq!(
            parse_args(args(&["headless", "--turns", "7"])).unwrap(),
            Mode::Headless { turns: 7 }
        );
    }

    #[test]
    fn rejects_bad_args() {
        assert!(parse_args(args(&["play"])).is_err());
        assert!(parse_args(args(&["headless", "--turns"])).is_err());
        assert!(parse_args(args(&["headless", "--turns", "x"])).is_err());
    }
}
