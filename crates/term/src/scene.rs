//! Scene state shared between the session and the frame loop.
//!
//! [`TerminalPresenter`] implements the engine's presenter on top of a
//! [`Scene`]: animations record a start/target pair on the sprite and then
//! sleep for their duration, while the frame loop samples sprite positions at
//! its own pace.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::engine::{Motion, Presenter, ScreenPos};
use crate::types::{GameOverReason, PieceId, PieceKind, Sound, Tile};

const POPUP_MS: u64 = 800;
const SOUND_FLASH_MS: u64 = 400;

/// One piece on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub kind: PieceKind,
    pub from: ScreenPos,
    pub to: ScreenPos,
    pub start: Instant,
    pub duration: Duration,
    /// Scaling out before removal
    pub vanishing: bool,
}

impl Sprite {
    pub fn position(&self, now: Instant) -> ScreenPos {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = now.saturating_duration_since(self.start).as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp(self.to, t)
    }
}

/// Floating points text
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub points: u32,
    pub at: ScreenPos,
    pub until: Instant,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u8,
    pub height: u8,
    sprites: HashMap<PieceId, Sprite>,
    pub score: String,
    pub level: String,
    pub progress: f32,
    pub timer: String,
    pub popups: Vec<Popup>,
    pub highlight: Option<Tile>,
    pub game_over: Option<GameOverReason>,
    pub sound: Option<(Sound, Instant)>,
}

impl Scene {
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            sprites: HashMap::new(),
            score: "0".to_string(),
            level: "1".to_string(),
            progress: 0.0,
            timer: String::new(),
            popups: Vec::new(),
            highlight: None,
            game_over: None,
            sound: None,
        }
    }

    pub fn sprites(&self) -> impl Iterator<Item = (&PieceId, &Sprite)> {
        self.sprites.iter()
    }

    pub fn sprite(&self, id: PieceId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn place(&mut self, id: PieceId, kind: PieceKind, at: ScreenPos, now: Instant) {
        self.sprites.insert(
            id,
            Sprite {
                kind,
                from: at,
                to: at,
                start: now,
                duration: Duration::ZERO,
                vanishing: false,
            },
        );
    }

    /// Start moving a sprite from wherever it is now
    pub fn retarget(&mut self, id: PieceId, to: ScreenPos, duration: Duration, now: Instant) {
        if let Some(sprite) = self.sprites.get_mut(&id) {
            sprite.from = sprite.position(now);
            sprite.to = to;
            sprite.start = now;
            sprite.duration = duration;
        }
    }

    pub fn vanish(&mut self, ids: &[PieceId]) {
        for id in ids {
            if let Some(sprite) = self.sprites.get_mut(id) {
                sprite.vanishing = true;
            }
        }
    }

    pub fn remove(&mut self, ids: &[PieceId]) {
        for id in ids {
            self.sprites.remove(id);
        }
    }

    /// Drop expired popups and sound flashes
    pub fn prune(&mut self, now: Instant) {
        self.popups.retain(|p| p.until > now);
        if matches!(self.sound, Some((_, at)) if now.saturating_duration_since(at) > Duration::from_millis(SOUND_FLASH_MS))
        {
            self.sound = None;
        }
    }

    pub fn reset(&mut self) {
        self.sprites.clear();
        self.popups.clear();
        self.highlight = None;
        self.game_over = None;
        self.sound = None;
    }
}

/// Presenter that animates a shared [`Scene`]
///
/// Clones share the scene, so the countdown task can update the timer text.
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    scene: Arc<Mutex<Scene>>,
}

impl TerminalPresenter {
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            scene: Arc::new(Mutex::new(Scene::new(width, height))),
        }
    }

    /// Run `f` with the scene locked. Never held across an await.
    pub fn with_scene<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> R {
        let mut guard = self.scene.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Copy of the scene for rendering
    pub fn snapshot(&self) -> Scene {
        self.with_scene(|s| s.clone())
    }
}

impl Presenter for TerminalPresenter {
    fn place(&self, piece: PieceId, kind: PieceKind, at: ScreenPos) {
        let now = Instant::now();
        self.with_scene(|s| s.place(piece, kind, at, now));
    }

    async fn move_to(&self, piece: PieceId, to: ScreenPos, duration_ms: u32) {
        let duration = Duration::from_millis(duration_ms as u64);
        let now = Instant::now();
        self.with_scene(|s| s.retarget(piece, to, duration, now));
        sleep(duration).await;
    }

    async fn move_all(&self, motions: &[Motion]) {
        let now = Instant::now();
        let longest = self.with_scene(|s| {
            motions
                .iter()
                .map(|m| {
                    let duration = Duration::from_millis(m.duration_ms as u64);
                    s.retarget(m.piece, m.to, duration, now);
                    duration
                })
                .max()
                .unwrap_or_default()
        });
        sleep(longest).await;
    }

    async fn scale_out(&self, pieces: &[PieceId], duration_ms: u32) {
        self.with_scene(|s| s.vanish(pieces));
        sleep(Duration::from_millis(duration_ms as u64)).await;
        self.with_scene(|s| s.remove(pieces));
    }

    fn play_sound(&self, sound: Sound) {
        let now = Instant::now();
        self.with_scene(|s| s.sound = Some((sound, now)));
    }

    fn float_score(&self, points: u32, at: ScreenPos, _kind: PieceKind) {
        let until = Instant::now() + Duration::from_millis(POPUP_MS);
        self.with_scene(|s| s.popups.push(Popup { points, at, until }));
    }

    fn set_score_text(&self, text: &str) {
        self.with_scene(|s| s.score = text.to_string());
    }

    fn set_level_text(&self, text: &str) {
        self.with_scene(|s| s.level = text.to_string());
    }

    fn set_level_progress(&self, fraction: f32) {
        self.with_scene(|s| s.progress = fraction);
    }

    fn set_timer_text(&self, text: &str) {
        self.with_scene(|s| s.timer = text.to_string());
    }

    fn highlight(&self, tile: Option<Tile>) {
        self.with_scene(|s| s.highlight = tile);
    }

    fn clear(&self) {
        self.with_scene(|s| s.reset());
    }

    fn game_over(&self, reason: GameOverReason) {
        self.with_scene(|s| s.game_over = Some(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn move_to_interpolates_and_waits() {
        let presenter = TerminalPresenter::new(4, 4);
        presenter.place(PieceId(1), PieceKind::Red, ScreenPos::new(0.0, -1.0));

        let started = Instant::now();
        let mover = presenter.clone();
        let handle = tokio::spawn(async move {
            mover.move_to(PieceId(1), ScreenPos::new(0.0, 3.0), 200).await;
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        let mid = presenter.with_scene(|s| s.sprite(PieceId(1)).map(|sp| sp.position(Instant::now())));
        assert_eq!(mid, Some(ScreenPos::new(0.0, 1.0)));

        handle.await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(200));
        let end = presenter.with_scene(|s| s.sprite(PieceId(1)).map(|sp| sp.position(Instant::now())));
        assert_eq!(end, Some(ScreenPos::new(0.0, 3.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn scale_out_removes_sprites() {
        let presenter = TerminalPresenter::new(4, 4);
        presenter.place(PieceId(7), PieceKind::Blue, ScreenPos::new(1.0, 1.0));
        presenter.scale_out(&[PieceId(7)], 250).await;
        assert_eq!(presenter.snapshot().sprite_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn popups_expire() {
        let presenter = TerminalPresenter::new(4, 4);
        presenter.float_score(50, ScreenPos::new(1.0, 1.0), PieceKind::Red);
        assert_eq!(presenter.snapshot().popups.len(), 1);

        tokio::time::sleep(Duration::from_millis(POPUP_MS + 1)).await;
        presenter.with_scene(|s| s.prune(Instant::now()));
        assert!(presenter.snapshot().popups.is_empty());
    }
}
