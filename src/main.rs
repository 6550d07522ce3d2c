mod audio;
mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use horde_survivor::abilities::activate_ability;
use horde_survivor::compute::{
    aim_at, init_state, move_player, pause, player_shoot, restart, resume, tick,
};
use horde_survivor::config::{self, GameConfig};
use horde_survivor::entities::{GameState, GameStatus};
use horde_survivor::error::GameError;

use display::Viewport;

/// Keys bound to ability slots 1..=3.
pub const ABILITY_KEYS: [char; 3] = ['q', 'e', 'r'];

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between shots while Space is held.
const SHOOT_COOLDOWN: u32 = 8;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── CLI & logging ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "horde_survivor", about = "Survive the horde in your terminal")]
struct Cli {
    /// TOML config file; defaults are used if it does not exist
    #[arg(long, default_value = "horde_survivor.toml")]
    config: PathBuf,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Log destination (the terminal is in raw mode while playing)
    #[arg(long, default_value = "horde_survivor.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> Result<(), GameError> {
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    display::draw_menu(out)?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            })) => match code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('s') => {
                    return Ok(MenuResult::Start);
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            },
            Ok(Event::Resize(..)) => display::draw_menu(out)?,
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Menu,
}

/// Apply a one-shot key press. Returns `Some` when the loop should end.
fn handle_press(state: &mut GameState, code: KeyCode, modifiers: KeyModifiers) -> Option<LoopExit> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Some(LoopExit::Quit);
    }
    match (state.status, code) {
        (GameStatus::Playing, KeyCode::Esc) => *state = pause(state),
        (GameStatus::Paused, KeyCode::Esc) => *state = resume(state),
        (GameStatus::Playing, KeyCode::Char(c)) => {
            let c = c.to_ascii_lowercase();
            if let Some(slot) = ABILITY_KEYS.iter().position(|&k| k == c) {
                *state = activate_ability(state, slot);
            }
        }
        (GameStatus::Paused | GameStatus::GameOver, KeyCode::Char('r' | 'R')) => {
            *state = restart(state);
        }
        (GameStatus::Paused | GameStatus::GameOver, KeyCode::Char('m' | 'M')) => {
            info!("returning to menu");
            return Some(LoopExit::Menu);
        }
        _ => {}
    }
    None
}

/// Clicks on an ability card activate it; any other click aims and fires.
fn handle_mouse(state: &mut GameState, mouse: MouseEvent, view: &Viewport) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            let (x, y) = view.to_world(mouse.column, mouse.row);
            *state = aim_at(state, x, y);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(slot) = display::ability_card_at(state, view, mouse.column, mouse.row) {
                *state = activate_ability(state, slot);
                return;
            }
            let (x, y) = view.to_world(mouse.column, mouse.row);
            *state = aim_at(state, x, y);
            *state = player_shoot(state);
        }
        _ => {}
    }
}

/// Drive one game session until the player quits or returns to the menu.
///
/// Input model: held keys are tracked in `key_frame` (frame of the last
/// press/repeat) so movement in several directions and Space can be held
/// together. One-shot actions (abilities, pause, restart) act on the press.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> Result<LoopExit, GameError> {
    let frame_time = Duration::from_millis(config.sim.frame_ms);
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let view = Viewport::new(terminal::size()?, state.width, state.height);

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        if let Some(exit) = handle_press(state, code, modifiers) {
                            return Ok(exit);
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(mouse) => handle_mouse(state, mouse, &view),
                _ => {}
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if state.status == GameStatus::Playing {
            let up = any_held(&key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame);
            let down = any_held(&key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame);
            let left = any_held(&key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame);
            let right = any_held(&key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame);
            let shoot = is_held(&key_frame, &KeyCode::Char(' '), frame);

            let dx = right as i8 - left as i8;
            let dy = down as i8 - up as i8;
            *state = move_player(state, dx, dy);

            if shoot_cooldown == 0 && shoot {
                *state = player_shoot(state);
                shoot_cooldown = SHOOT_COOLDOWN;
            }
        }
        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        *state = tick(state, rng);

        let events = std::mem::take(&mut state.events);
        audio::play_cues(out, &events, &config.audio)?;
        display::render(out, state, &view)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), GameError> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;
    let config = config::load(&cli.config)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!("starting (seed: {:?})", cli.seed);

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &config, &mut rng, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        log::error!("exiting with error: {}", e);
    }
    result
}

fn run<W: Write>(
    out: &mut W,
    config: &GameConfig,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> Result<(), GameError> {
    loop {
        match show_menu(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                info!("new game");
                let mut state = init_state(&config.sim);
                match game_loop(out, &mut state, config, rng, rx)? {
                    LoopExit::Quit => break,
                    LoopExit::Menu => {}
                }
            }
        }
    }
    Ok(())
}
