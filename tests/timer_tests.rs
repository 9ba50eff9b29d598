//! Timer tests - countdown against a live session on a paused clock

use std::time::Duration;

use tokio::time::Instant;
use tui_match3::core::{find_future_move, Board};
use tui_match3::engine::{
    AnimationTimings, CountdownTick, Event, GameConfig, GameSession, Recorder, SwapOutcome,
};
use tui_match3::types::{GameOverReason, PieceKind, RejectReason, Tile, TurnState};

fn short_timer(timer_ms: u32) -> GameConfig {
    GameConfig {
        timer_ms,
        timer_step_ms: 10,
        ..GameConfig::default().with_animation(AnimationTimings::instant())
    }
}

fn time_ups(rec: &Recorder) -> usize {
    rec.count(|e| matches!(e, Event::GameOver(GameOverReason::TimeUp)))
}

#[tokio::test(start_paused = true)]
async fn test_countdown_ends_idle_session() {
    let rec = Recorder::new();
    let mut session = GameSession::new(short_timer(50), rec.clone()).unwrap();
    rec.take();

    let start = Instant::now();
    let expired = tokio::spawn(session.countdown().run()).await.unwrap();
    assert!(expired);
    assert_eq!(start.elapsed(), Duration::from_millis(50));

    assert_eq!(rec.count(|e| matches!(e, Event::Timer(_))), 5);
    assert_eq!(rec.last_timer().as_deref(), Some("00:00.000"));
    assert_eq!(time_ups(&rec), 1);
    assert_eq!(session.state(), TurnState::GameOver);
    assert_eq!(session.game_over_reason(), Some(GameOverReason::TimeUp));

    // Hints stop once the game is over; the board still has a legal move.
    assert_eq!(session.hint(), None);
    let swap = find_future_move(session.board()).unwrap();
    let before = session.board().clone();
    let outcome = session.request_swap(swap.from, swap.to).await.unwrap();
    assert_eq!(outcome, SwapOutcome::Rejected(RejectReason::GameOver));
    assert_eq!(session.select(swap.from), Err(RejectReason::GameOver));
    assert_eq!(session.board(), &before);
}

#[tokio::test(start_paused = true)]
async fn test_deadlock_halts_countdown() {
    let rec = Recorder::new();
    let board = Board::from_rows(&["OYG", "BPR", "RRB"]).unwrap();
    let mut session = GameSession::with_board(short_timer(1_000), board, rec.clone()).unwrap();
    session.script_refills([PieceKind::Purple, PieceKind::Yellow, PieceKind::Orange]);
    let countdown = tokio::spawn(session.countdown().run());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let outcome = session
        .request_swap(Tile::new(2, 1), Tile::new(2, 2))
        .await
        .unwrap();
    assert_eq!(
        outcome.report().and_then(|r| r.game_over),
        Some(GameOverReason::Deadlock)
    );

    assert!(!countdown.await.unwrap());
    assert_eq!(time_ups(&rec), 0);
    assert_eq!(session.game_over_reason(), Some(GameOverReason::Deadlock));
}

#[tokio::test(start_paused = true)]
async fn test_reset_retires_old_countdown() {
    let rec = Recorder::new();
    let mut session = GameSession::new(short_timer(40), rec.clone()).unwrap();
    let mut stale = session.countdown();
    assert_eq!(stale.tick(), CountdownTick::Running(30));

    session.reset().unwrap();
    assert_eq!(stale.tick(), CountdownTick::Halted);

    let fresh = session.countdown();
    assert_eq!(fresh.remaining_ms(), 40);
    assert!(fresh.run().await);
    assert_eq!(session.game_over_reason(), Some(GameOverReason::TimeUp));
    assert_eq!(time_ups(&rec), 1);

    // A restart after time-up starts over with a running session.
    session.reset().unwrap();
    assert_eq!(session.state(), TurnState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_force_game_over_is_one_shot() {
    let rec = Recorder::new();
    let session = GameSession::new(short_timer(30), rec.clone()).unwrap();

    assert!(session.force_game_over(GameOverReason::TimeUp));
    assert!(!session.force_game_over(GameOverReason::Deadlock));
    assert!(!session.countdown().run().await);
    assert_eq!(time_ups(&rec), 1);
}
