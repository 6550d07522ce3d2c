/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// world. No game logic is performed; this module only translates state
/// into terminal commands. World units are mapped onto the terminal grid
/// through a `Viewport`.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use horde_survivor::abilities::cooldown_remaining_secs;
use horde_survivor::entities::{
    Ability, Boss, Enemy, EnemyColor, EnemyKind, GameState, GameStatus, Projectile, PLAYER_MAX_HP,
};

use crate::ABILITY_KEYS;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_HP: Color = Color::Red;
const C_HUD_EXP: Color = Color::Yellow;
const C_HUD_LEVEL: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_PROJECTILE: Color = Color::Yellow;
const C_BOSS: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;
const C_CARD_READY: Color = Color::Cyan;
const C_CARD_COOLDOWN: Color = Color::DarkGrey;

/// Blank columns between two ability cards.
const CARD_GAP: u16 = 2;

fn enemy_color(color: EnemyColor) -> Color {
    match color {
        EnemyColor::Red => Color::Red,
        EnemyColor::Cyan => Color::Cyan,
        EnemyColor::Orange => Color::Rgb { r: 255, g: 165, b: 0 },
        EnemyColor::Gray => Color::Grey,
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps the world rectangle onto the terminal cells between the borders
/// (columns 1..width-1, rows 2..height-2).
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub world_width: f32,
    pub world_height: f32,
}

impl Viewport {
    pub fn new((term_width, term_height): (u16, u16), world_width: f32, world_height: f32) -> Self {
        Viewport {
            cols: term_width.saturating_sub(2).max(1),
            rows: term_height.saturating_sub(4).max(1),
            world_width,
            world_height,
        }
    }

    pub fn term_width(&self) -> u16 {
        self.cols + 2
    }

    pub fn term_height(&self) -> u16 {
        self.rows + 4
    }

    /// Terminal cell for a world position, or `None` if it lies outside the
    /// playfield (enemies waiting beyond the edge, the boss descending).
    pub fn to_screen(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 || x > self.world_width || y > self.world_height {
            return None;
        }
        let col = ((x / self.world_width) * self.cols as f32) as u16;
        let row = ((y / self.world_height) * self.rows as f32) as u16;
        Some((1 + col.min(self.cols - 1), 2 + row.min(self.rows - 1)))
    }

    /// World position at the centre of a terminal cell.
    pub fn to_world(&self, col: u16, row: u16) -> (f32, f32) {
        let c = col.saturating_sub(1).min(self.cols - 1) as f32 + 0.5;
        let r = row.saturating_sub(2).min(self.rows - 1) as f32 + 0.5;
        (
            c / self.cols as f32 * self.world_width,
            r / self.rows as f32 * self.world_height,
        )
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, state, view)?;

    for enemy in &state.enemies {
        draw_enemy(out, enemy, view)?;
    }
    if let Some(boss) = &state.boss {
        draw_boss(out, boss, view)?;
    }
    for projectile in &state.projectiles {
        draw_projectile(out, projectile, view)?;
    }

    draw_player(out, state, view)?;
    draw_ability_bar(out, state, view)?;

    match state.status {
        GameStatus::Paused => draw_pause_menu(out, state, view)?,
        GameStatus::GameOver => draw_game_over(out, state, view)?,
        GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.term_height().saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let inner = view.cols as usize;
    let bottom = view.rows + 2;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(inner))))?;

    out.queue(cursor::MoveTo(0, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(inner))))?;

    for row in 2..bottom {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols + 1, row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let p = &state.player;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HP))?;
    out.queue(Print(format!("HP:{:>3}/{}", p.hp, PLAYER_MAX_HP)))?;
    out.queue(style::SetForegroundColor(C_HUD_EXP))?;
    out.queue(Print(format!("  EXP:{:>4}", p.exp)))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(format!("  LVL:{:>2}", p.level)))?;

    if let Some(boss) = &state.boss {
        // Boss health bar — right side
        const BAR: usize = 20;
        let filled = ((boss.hp.max(0) as f32 / boss.max_hp as f32) * BAR as f32).ceil() as usize;
        let bar = format!(
            "BOSS [{}{}]",
            "█".repeat(filled.min(BAR)),
            "░".repeat(BAR - filled.min(BAR))
        );
        let bx = view
            .term_width()
            .saturating_sub(bar.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(bx, 0))?;
        out.queue(style::SetForegroundColor(C_BOSS))?;
        out.queue(Print(bar))?;
    }

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    if let Some((col, row)) = view.to_screen(state.player.x, state.player.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_PLAYER))?;
        out.queue(Print("@"))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, view: &Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.to_screen(enemy.x, enemy.y) else {
        return Ok(());
    };
    let glyph = match enemy.kind {
        EnemyKind::Normal => "Z",
        EnemyKind::Ice => "❄",
        EnemyKind::Explosive => "✹",
        EnemyKind::Tank => "█",
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(enemy_color(enemy.kind.color())))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_boss<W: Write>(out: &mut W, boss: &Boss, view: &Viewport) -> std::io::Result<()> {
    // 3-wide body:
    //   ╔B╗
    //   ╚═╝
    let Some((col, row)) = view.to_screen(boss.x, boss.y) else {
        return Ok(());
    };
    let lx = col.saturating_sub(1).max(1);
    out.queue(style::SetForegroundColor(C_BOSS))?;
    out.queue(cursor::MoveTo(lx, row))?;
    out.queue(Print("╔B╗"))?;
    if row + 1 < view.rows + 2 {
        out.queue(cursor::MoveTo(lx, row + 1))?;
        out.queue(Print("╚═╝"))?;
    }
    Ok(())
}

fn draw_projectile<W: Write>(
    out: &mut W,
    projectile: &Projectile,
    view: &Viewport,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.to_screen(projectile.x, projectile.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_PROJECTILE))?;
        out.queue(Print("•"))?;
    }
    Ok(())
}

// ── Ability cards & controls hint (last row) ──────────────────────────────────

fn card_label(ability: &Ability, key: char, now_ms: u64) -> String {
    match cooldown_remaining_secs(ability, now_ms) {
        Some(secs) => format!("[{}] {} {}s", key.to_ascii_uppercase(), ability.name, secs),
        None => format!("[{}] {}", key.to_ascii_uppercase(), ability.name),
    }
}

/// Column span `[start, end)` of each ability card on the bottom row.
fn card_spans(state: &GameState) -> Vec<(u16, u16)> {
    let mut col = 1u16;
    state
        .abilities
        .iter()
        .zip(ABILITY_KEYS)
        .map(|(ability, key)| {
            let width = card_label(ability, key, state.clock_ms).chars().count() as u16;
            let span = (col, col + width);
            col += width + CARD_GAP;
            span
        })
        .collect()
}

/// Ability slot whose card covers the given terminal cell.
pub fn ability_card_at(state: &GameState, view: &Viewport, col: u16, row: u16) -> Option<usize> {
    if row != view.term_height().saturating_sub(1) {
        return None;
    }
    card_spans(state)
        .iter()
        .position(|&(start, end)| (start..end).contains(&col))
}

fn draw_ability_bar<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
) -> std::io::Result<()> {
    let row = view.term_height().saturating_sub(1);

    if state.abilities.is_empty() {
        out.queue(cursor::MoveTo(1, row))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print("WASD/↑↓←→ : Move   Click/SPACE : Shoot   ESC : Menu"))?;
        return Ok(());
    }

    let spans = card_spans(state);
    for ((ability, key), (start, _)) in state.abilities.iter().zip(ABILITY_KEYS).zip(spans) {
        let color = if ability.is_on_cooldown(state.clock_ms) {
            C_CARD_COOLDOWN
        } else {
            C_CARD_READY
        };
        out.queue(cursor::MoveTo(start, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(card_label(ability, key, state.clock_ms)))?;
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = view.term_width() / 2;
    let start_row = (view.term_height() / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

/// Lines of the pause overlay, including the controls listing with one
/// binding per unlocked ability.
fn pause_menu_lines(state: &GameState) -> Vec<String> {
    let mut lines: Vec<String> = [
        "╔════════════════════╗",
        "║       PAUSED       ║",
        "╚════════════════════╝",
        "ESC - Resume   R - Restart",
        "M - Main Menu",
        "",
        "── Controls ──",
        "WASD/↑↓←→ - Move",
        "Mouse - Aim   Click/SPACE - Shoot",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for (ability, key) in state.abilities.iter().zip(ABILITY_KEYS) {
        lines.push(format!(
            "{} - {} ({})",
            key.to_ascii_uppercase(),
            ability.name,
            ability.description
        ));
    }
    if state.abilities.is_empty() {
        lines.push("Q E R - Abilities (earned with EXP)".to_string());
    }
    lines
}

fn draw_pause_menu<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let lines = pause_menu_lines(state);
    let styled: Vec<(&str, Color)> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| (line.as_str(), if i < 3 { Color::Cyan } else { Color::White }))
        .collect();
    draw_centered(out, view, &styled)
}

fn draw_game_over<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let summary = format!(
        "Level {}   EXP {}",
        state.player.level, state.player.exp
    );
    draw_centered(
        out,
        view,
        &[
            ("╔════════════════════╗", Color::Red),
            ("║    GAME  OVER      ║", Color::Red),
            ("╚════════════════════╝", Color::Red),
            (summary.as_str(), Color::Yellow),
            ("R - Play Again  M - Main Menu", Color::White),
        ],
    )
}

// ── Start menu ────────────────────────────────────────────────────────────────

pub fn draw_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let size = terminal::size()?;
    let view = Viewport::new(size, 1.0, 1.0);
    draw_centered(
        out,
        &view,
        &[
            ("★  HORDE  SURVIVOR  ★", Color::Cyan),
            ("", Color::White),
            ("ENTER - Start   Q - Quit", Color::White),
            ("", Color::White),
            ("WASD/↑↓←→ move · mouse aims · click/SPACE shoots", Color::DarkGrey),
            ("Q E R abilities · ESC pause", Color::DarkGrey),
        ],
    )?;
    out.queue(style::ResetColor)?;
    out.flush()
}
