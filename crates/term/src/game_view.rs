//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! Board row `y = 0` is the floor, so it is drawn on the last screen row of the
//! play area. Blocks above the visible rows (a freshly spawned piece) are not
//! drawn.

use crate::core::{CellSnapshot, GameSnapshot, PieceShape, PieceTemplate};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::hud::StatusLine;
use crate::types::{BlockFlags, CurrencyKind, MarketEvent};

const PLAY_BG: Rgb = Rgb::new(20, 22, 34);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

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

/// A lightweight terminal renderer for the board and HUD.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render into an existing framebuffer, reusing its allocation.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with_status(snap, None, viewport, fb);
    }

    pub fn render_into_with_status(
        &self,
        snap: &GameSnapshot,
        status: Option<&StatusLine>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let cols = snap.width.max(0) as u16;
        let rows = snap.height.max(0) as u16;
        let board_px_w = cols * self.cell_w;
        let board_px_h = rows * self.cell_h;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        let shake = status.map(|s| s.shake_offset()).unwrap_or(0);
        let start_x = (viewport.width.saturating_sub(frame_w) / 2).saturating_add(shake);
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };

        let bg = CellStyle::fg_on(Rgb::new(70, 70, 90), PLAY_BG);
        let border = CellStyle::fg_on(border_color(snap.market_event), PANEL_BG);

        fb.fill_rect(start_x + 1, start_y + 1, board_px_w, board_px_h, ' ', bg);
        self.draw_border(fb, start_x, start_y, frame_w, frame_h, border);

        for y in 0..snap.height {
            for x in 0..snap.width {
                match snap.cell(x, y) {
                    Some(cell) => self.draw_block(fb, snap, start_x, start_y, x, y, cell),
                    None => self.draw_empty_cell(fb, snap, start_x, start_y, x, y),
                }
            }
        }

        if let Some(active) = &snap.active {
            for (pos, cell) in &active.cells {
                if pos.x >= 0 && pos.x < snap.width && pos.y >= 0 && pos.y < snap.height {
                    self.draw_block(fb, snap, start_x, start_y, pos.x, pos.y, *cell);
                }
            }
        }

        self.draw_side_panel(fb, snap, viewport, start_x, start_y, frame_w);

        if let Some(status) = status {
            if let Some(msg) = status.message() {
                let y = start_y.saturating_add(frame_h);
                let x = start_x.saturating_add(frame_w.saturating_sub(msg.chars().count() as u16) / 2);
                let style = CellStyle {
                    bold: true,
                    ..CellStyle::fg_on(Rgb::new(255, 220, 90), PANEL_BG)
                };
                fb.put_str(x, y, msg, style);
            }
        }

        if snap.paused {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "PAUSED");
        } else if snap.game_over {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "GAME OVER");
        } else if snap.victory {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "LEVEL CLEARED");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
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

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, start_x: u16, start_y: u16, x: i32, y: i32) {
        let style = CellStyle {
            dim: true,
            ..CellStyle::fg_on(Rgb::new(70, 70, 90), PLAY_BG)
        };
        self.fill_cell(fb, snap, start_x, start_y, x, y, &['·', ' '], style);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_block(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        start_x: u16,
        start_y: u16,
        x: i32,
        y: i32,
        cell: CellSnapshot,
    ) {
        let color = cell
            .currency
            .map(|k| currency_color(snap, k))
            .unwrap_or(Rgb::new(40, 60, 200));

        let (glyph, style) = if cell.flags.contains(BlockFlags::OFFICER) {
            (['S', 'E'], CellStyle::fg_on(Rgb::new(255, 255, 255), Rgb::new(40, 60, 200)))
        } else if cell.flags.contains(BlockFlags::BOMB) {
            (['▓', '▓'], CellStyle::fg_on(color, Rgb::new(60, 0, 0)))
        } else if cell.flags.contains(BlockFlags::SUPER) {
            (['◆', '◆'], CellStyle::fg_on(color, PLAY_BG))
        } else {
            let g = cell.currency.map(currency_glyph).unwrap_or(['?', '?']);
            (g, CellStyle::fg_on(Rgb::new(10, 10, 10), color))
        };

        let armed = !cell.flags.contains(BlockFlags::CANNOT_BLOW_UP_YET)
            && cell.flags.intersects(BlockFlags::BOMB | BlockFlags::SUPER);
        let style = CellStyle {
            bold: cell.flags.contains(BlockFlags::GLOWING) || armed,
            ..style
        };
        let style = if cell.flags.contains(BlockFlags::GLOWING) {
            CellStyle {
                bg: Rgb::new(255, 255, 255),
                ..style
            }
        } else {
            style
        };
        self.fill_cell(fb, snap, start_x, start_y, x, y, &glyph, style);
    }

    /// Fill one board cell. `glyph` supplies the characters left to right;
    /// wider cells repeat the last one.
    #[allow(clippy::too_many_arguments)]
    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        start_x: u16,
        start_y: u16,
        x: i32,
        y: i32,
        glyph: &[char; 2],
        style: CellStyle,
    ) {
        let screen_row = (snap.height - 1 - y) as u16;
        let px = start_x + 1 + x as u16 * self.cell_w;
        let py = start_y + 1 + screen_row * self.cell_h;
        for dy in 0..self.cell_h {
            for dx in 0..self.cell_w {
                let ch = glyph[(dx as usize).min(1)];
                fb.put_char(px + dx, py + dy, ch, style);
            }
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 14 {
            return;
        }

        let label = CellStyle {
            bold: true,
            ..CellStyle::fg_on(Rgb::new(220, 220, 220), PANEL_BG)
        };
        let value = CellStyle::fg_on(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = CellStyle { dim: true, ..value };

        let mut y = start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        let end = fb.put_u32(panel_x, y, snap.score, value);
        fb.put_char(end + 1, y, '/', dim);
        fb.put_u32(end + 3, y, snap.target_score, dim);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "LEVEL", label);
        y = y.saturating_add(1);
        let end = fb.put_str(panel_x, y, &snap.level_name, value);
        fb.put_str(end + 1, y, "pair", dim);
        fb.put_u32(end + 6, y, snap.pairing_threshold as u32, dim);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "COMBO", label);
        y = y.saturating_add(1);
        let end = fb.put_u32(panel_x, y, snap.combo as u32, value);
        if let Some(target) = snap.combo_target {
            let style = CellStyle::fg_on(currency_color(snap, target), PANEL_BG);
            fb.put_str(end + 1, y, symbol_of(snap, target), style);
        }
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "EVENT", label);
        y = y.saturating_add(1);
        let event_style = CellStyle::fg_on(border_color(snap.market_event), PANEL_BG);
        fb.put_str(panel_x, y, event_label(snap.market_event), event_style);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "NEXT", label);
        y = y.saturating_add(1);
        match &snap.upcoming {
            Some(t) => self.draw_preview(fb, snap, panel_x, y, t, value),
            None => {
                fb.put_str(panel_x, y, "-", value);
            }
        }
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, "SEC in", dim);
        fb.put_u32(panel_x + 7, y, snap.rounds_until_officer, dim);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "MARKET", label);
        y = y.saturating_add(1);
        for row in &snap.market {
            if y >= viewport.height {
                break;
            }
            let style = CellStyle::fg_on(Rgb::from(row.color), PANEL_BG);
            fb.put_str(panel_x, y, &row.symbol, style);
            let end = fb.put_u32(panel_x + 6, y, row.price, value);
            let (arrow, color) = if row.volatility_up {
                ('▲', Rgb::new(80, 220, 120))
            } else {
                ('▼', Rgb::new(230, 80, 80))
            };
            fb.put_char(end + 1, y, arrow, CellStyle::fg_on(color, PANEL_BG));
            y = y.saturating_add(1);
        }
    }

    fn draw_preview(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, x: u16, y: u16, t: &PieceTemplate, style: CellStyle) {
        match t.shape {
            PieceShape::Officer => {
                let officer = CellStyle {
                    bold: true,
                    ..CellStyle::fg_on(Rgb::new(255, 255, 255), Rgb::new(40, 60, 200))
                };
                fb.put_str(x, y, "SEC RAID", officer);
            }
            PieceShape::Tetromino(kind) => {
                let mut cx = fb.put_str(x, y, kind.letter(), style) + 1;
                for currency in t.currencies.iter().flatten() {
                    let g = currency_glyph(*currency);
                    let s = CellStyle::fg_on(Rgb::new(10, 10, 10), currency_color(snap, *currency));
                    fb.put_char(cx, y, g[0], s);
                    fb.put_char(cx + 1, y, g[1], s);
                    cx += 3;
                }
            }
        }
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
    ) {
        let mid_y = start_y.saturating_add(frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle {
            bold: true,
            ..CellStyle::fg_on(Rgb::new(255, 255, 255), PANEL_BG)
        };
        fb.put_str(x, mid_y, text, style);
    }
}

fn currency_color(snap: &GameSnapshot, kind: CurrencyKind) -> Rgb {
    snap.market
        .iter()
        .find(|r| r.kind == kind)
        .map(|r| Rgb::from(r.color))
        .unwrap_or(Rgb::new(200, 200, 200))
}

fn symbol_of(snap: &GameSnapshot, kind: CurrencyKind) -> &str {
    snap.market
        .iter()
        .find(|r| r.kind == kind)
        .map(|r| r.symbol.as_str())
        .unwrap_or_else(|| kind.as_str())
}

/// Two-character label drawn inside a block.
fn currency_glyph(kind: CurrencyKind) -> [char; 2] {
    match kind {
        CurrencyKind::Bitcoin => ['B', 'T'],
        CurrencyKind::Ethereum => ['E', 'T'],
        CurrencyKind::Xrp => ['X', 'R'],
        CurrencyKind::Polkadot => ['D', 'T'],
        CurrencyKind::Solana => ['S', 'L'],
        CurrencyKind::Tether => ['U', 'T'],
        CurrencyKind::Usdc => ['U', 'C'],
    }
}

fn event_label(event: MarketEvent) -> &'static str {
    match event {
        MarketEvent::None => "steady",
        MarketEvent::BullRun => "BULL RUN x2",
        MarketEvent::CryptoCrash => "CRASH /2",
    }
}

fn border_color(event: MarketEvent) -> Rgb {
    match event {
        MarketEvent::None => Rgb::new(200, 200, 200),
        MarketEvent::BullRun => Rgb::new(80, 220, 120),
        MarketEvent::CryptoCrash => Rgb::new(230, 80, 80),
    }
}
