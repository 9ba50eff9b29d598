//! BoardView: maps a [`Scene`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use tokio::time::Instant;

use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::scene::Scene;
use crate::types::{GameOverReason, PieceKind};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_W: u16 = 16;

/// A lightweight terminal renderer for the match-3 board.
pub struct BoardView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for BoardView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

/// Where the board frame landed in the last render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardFrame {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl BoardView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Board frame position for a scene inside `viewport` (frame includes the border)
    pub fn frame(&self, scene: &Scene, viewport: Viewport) -> BoardFrame {
        let w = scene.width as u16 * self.cell_w + 2;
        let h = scene.height as u16 * self.cell_h + 2;
        let total_w = w + 2 + PANEL_W;
        BoardFrame {
            x: viewport.width.saturating_sub(total_w) / 2,
            y: viewport.height.saturating_sub(h) / 2,
            w,
            h,
        }
    }

    /// Render the scene as seen at `now` into an existing framebuffer.
    pub fn render_into(&self, scene: &Scene, now: Instant, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let frame = self.frame(scene, viewport);
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect(
            frame.x + 1,
            frame.y + 1,
            frame.w - 2,
            frame.h - 2,
            ' ',
            CellStyle::new(Rgb::new(80, 80, 90), BOARD_BG),
        );
        draw_border(fb, frame, border);

        for row in 0..scene.height as u16 {
            for col in 0..scene.width as u16 {
                self.fill_cell(fb, frame, col, row, '·', CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG).dim());
            }
        }

        if let Some(tile) = scene.highlight {
            if tile.col >= 0 && tile.row >= 0 {
                let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(70, 70, 90));
                self.fill_cell(fb, frame, tile.col as u16, tile.row as u16, ' ', style);
            }
        }

        for (_, sprite) in scene.sprites() {
            let pos = sprite.position(now);
            let (col, row) = (pos.col.round(), pos.row.round());
            // Sprites above the board (entering refills) are hidden.
            if col < 0.0 || row < 0.0 || col >= scene.width as f32 || row >= scene.height as f32 {
                continue;
            }
            let highlighted = scene
                .highlight
                .is_some_and(|t| t.col as f32 == col && t.row as f32 == row);
            let mut style = CellStyle::new(kind_color(sprite.kind), if highlighted { Rgb::new(70, 70, 90) } else { BOARD_BG });
            let ch = if sprite.vanishing {
                style = style.dim();
                '▒'
            } else {
                style = style.bold();
                '█'
            };
            self.fill_cell(fb, frame, col as u16, row as u16, ch, style);
        }

        for popup in &scene.popups {
            let x = frame.x + 1 + (popup.at.col.max(0.0) * self.cell_w as f32) as u16;
            let y = frame.y + 1 + (popup.at.row.max(0.0) * self.cell_h as f32) as u16;
            let style = CellStyle::new(Rgb::new(255, 255, 120), Rgb::new(0, 0, 0)).bold();
            fb.put_char(x, y, '+', style);
            fb.put_u32(x + 1, y, popup.points, style);
        }

        self.draw_side_panel(fb, scene, viewport, frame);

        if let Some(reason) = scene.game_over {
            let text = match reason {
                GameOverReason::Deadlock => "NO MOVES",
                GameOverReason::TimeUp => "TIME UP",
            };
            draw_overlay_text(fb, frame, text, 0);
            draw_overlay_text(fb, frame, "r: restart", 1);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, scene: &Scene, now: Instant, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(scene, now, viewport, &mut fb);
        fb
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, frame: BoardFrame, col: u16, row: u16, ch: char, style: CellStyle) {
        let px = frame.x + 1 + col * self.cell_w;
        let py = frame.y + 1 + row * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(&self, fb: &mut FrameBuffer, scene: &Scene, viewport: Viewport, frame: BoardFrame) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0)).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let mut y = frame.y;
        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_str(panel_x, y + 1, &scene.score, value);
        y += 3;

        fb.put_str(panel_x, y, "LEVEL", label);
        fb.put_str(panel_x, y + 1, &scene.level, value);
        fb.put_bar(
            panel_x,
            y + 2,
            12,
            scene.progress,
            CellStyle::new(Rgb::new(100, 220, 120), Rgb::new(0, 0, 0)),
            value.dim(),
        );
        y += 4;

        fb.put_str(panel_x, y, "TIME", label);
        fb.put_str(panel_x, y + 1, &scene.timer, value);
        y += 3;

        if let Some((sound, _)) = scene.sound {
            fb.put_char(panel_x, y, '♪', value);
            fb.put_str(panel_x + 2, y, sound.as_str(), value.dim());
        }
        y += 2;

        let hint = value.dim();
        fb.put_str(panel_x, y, "q quit", hint);
        fb.put_str(panel_x, y + 1, "r restart", hint);
    }
}

fn kind_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::Red => Rgb::new(220, 80, 80),
        PieceKind::Orange => Rgb::new(255, 165, 0),
        PieceKind::Yellow => Rgb::new(240, 220, 80),
        PieceKind::Green => Rgb::new(100, 220, 120),
        PieceKind::Blue => Rgb::new(80, 120, 220),
        PieceKind::Purple => Rgb::new(200, 120, 220),
    }
}

fn draw_border(fb: &mut FrameBuffer, frame: BoardFrame, style: CellStyle) {
    let BoardFrame { x, y, w, h } = frame;
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, frame: BoardFrame, text: &str, line: u16) {
    let mid_y = frame.y.saturating_add(frame.h / 2).saturating_add(line);
    let text_w = text.chars().count() as u16;
    let x = frame.x.saturating_add(frame.w.saturating_sub(text_w) / 2);
    let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
    fb.put_str(x, mid_y, text, style);
}
