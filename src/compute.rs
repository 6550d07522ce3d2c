/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, an RNG handle) and returns a brand-new
/// `GameState`.  Side effects are limited to the injected RNG and logging.

use log::{debug, info};
use rand::Rng;

use crate::abilities::{expire_timers, grant_abilities};
use crate::config::SimConfig;
use crate::entities::{
    level_for_exp, Boss, Enemy, EnemyKind, GameEvent, GameState, GameStatus, Player, Projectile,
    PLAYER_MAX_HP, PROJECTILE_SIZE, PROJECTILE_SPEED, SPAWN_MARGIN,
};

// ── Combat tables ────────────────────────────────────────────────────────────

pub const PROJECTILE_DAMAGE: i32 = 5;
pub const BOSS_CONTACT_DAMAGE: i32 = 5;
pub const EXPLOSION_RADIUS: f32 = 60.0;
pub const EXPLOSION_DAMAGE: i32 = 15;
pub const EXP_PER_ENEMY: u32 = 1;
pub const EXP_PER_BOSS: u32 = 50;

/// Concurrent enemy cap for a given level.
pub fn enemy_cap(level: u32) -> usize {
    10 + level as usize
}

/// Tiered kind draw. `roll` is uniform in [0, 1); each tier only applies
/// once the player is past its level gate, otherwise the draw falls through.
pub fn pick_enemy_kind(roll: f32, level: u32) -> EnemyKind {
    if roll < 0.2 && level > 2 {
        EnemyKind::Ice
    } else if roll < 0.4 && level > 3 {
        EnemyKind::Explosive
    } else if roll < 0.6 && level > 4 {
        EnemyKind::Tank
    } else {
        EnemyKind::Normal
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────────

fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (ax - bx).hypot(ay - by)
}

/// Circle overlap test on half-sizes.
fn overlaps(ax: f32, ay: f32, a_size: f32, bx: f32, by: f32, b_size: f32) -> bool {
    distance(ax, ay, bx, by) < a_size / 2.0 + b_size / 2.0
}

/// Move `speed` units from (x, y) toward the target. Coincident positions
/// yield no movement.
pub fn steer_toward(x: f32, y: f32, speed: f32, target_x: f32, target_y: f32) -> (f32, f32) {
    let dx = target_x - x;
    let dy = target_y - y;
    let dist = dx.hypot(dy);
    if dist == 0.0 || !dist.is_finite() {
        return (x, y);
    }
    (x + dx / dist * speed, y + dy / dist * speed)
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh world with the player centred on the playfield.
pub fn init_state(config: &SimConfig) -> GameState {
    GameState {
        player: Player::new(config.width / 2.0, config.height / 2.0),
        enemies: Vec::new(),
        projectiles: Vec::new(),
        boss: None,
        abilities: Vec::new(),
        aim: (0.0, -1.0),
        status: GameStatus::Playing,
        clock_ms: 0,
        frame: 0,
        width: config.width,
        height: config.height,
        config: config.clone(),
        events: Vec::new(),
    }
}

// ── Lifecycle transitions ────────────────────────────────────────────────────

pub fn pause(state: &GameState) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    info!("paused at {} ms", state.clock_ms);
    GameState {
        status: GameStatus::Paused,
        ..state.clone()
    }
}

pub fn resume(state: &GameState) -> GameState {
    if state.status != GameStatus::Paused {
        return state.clone();
    }
    info!("resumed at {} ms", state.clock_ms);
    GameState {
        status: GameStatus::Playing,
        ..state.clone()
    }
}

/// Start over with the same tuning.
pub fn restart(state: &GameState) -> GameState {
    info!("restart");
    init_state(&state.config)
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Move the player one step along each requested axis (`dx`, `dy` in
/// -1..=1), clamped so the avatar stays inside the playfield.
pub fn move_player(state: &GameState, dx: i8, dy: i8) -> GameState {
    if state.status != GameStatus::Playing || (dx == 0 && dy == 0) {
        return state.clone();
    }
    let p = &state.player;
    let speed = p.effective_speed();
    let half = p.size / 2.0;
    let x = (p.x + dx.signum() as f32 * speed).clamp(half, (state.width - half).max(half));
    let y = (p.y + dy.signum() as f32 * speed).clamp(half, (state.height - half).max(half));
    GameState {
        player: Player {
            x,
            y,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Point the aim from the player toward a world position.
pub fn aim_at(state: &GameState, target_x: f32, target_y: f32) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    let dx = target_x - state.player.x;
    let dy = target_y - state.player.y;
    let dist = dx.hypot(dy);
    if dist == 0.0 || !dist.is_finite() {
        return state.clone();
    }
    GameState {
        aim: (dx / dist, dy / dist),
        ..state.clone()
    }
}

/// Fire a projectile from the player along the current aim.
pub fn player_shoot(state: &GameState) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    let mut next = state.clone();
    next.projectiles.push(Projectile {
        x: state.player.x,
        y: state.player.y,
        size: PROJECTILE_SIZE,
        speed: PROJECTILE_SPEED,
        dx: state.aim.0,
        dy: state.aim.1,
    });
    next.events.push(GameEvent::Shot);
    next
}

// ── Spawning ─────────────────────────────────────────────────────────────────

/// Spawn one enemy just outside a random playfield edge, unless the cap for
/// the current level is reached or the world is not running.
pub fn spawn_enemy(state: &GameState, rng: &mut impl Rng) -> GameState {
    let level = state.player.level;
    if state.status != GameStatus::Playing || state.enemies.len() >= enemy_cap(level) {
        debug!("enemy spawn rejected ({} alive)", state.enemies.len());
        return state.clone();
    }

    let (w, h) = (state.width, state.height);
    let (x, y) = match rng.gen_range(0..4) {
        0 => (-SPAWN_MARGIN, rng.gen::<f32>() * h),
        1 => (w + SPAWN_MARGIN, rng.gen::<f32>() * h),
        2 => (rng.gen::<f32>() * w, -SPAWN_MARGIN),
        _ => (rng.gen::<f32>() * w, h + SPAWN_MARGIN),
    };
    let kind = pick_enemy_kind(rng.gen::<f32>(), level);

    let mut next = state.clone();
    next.enemies.push(Enemy::new(kind, x, y, level));
    next
}

/// Spawn the boss above the playfield when the level is a positive multiple
/// of ten and no boss is alive.
pub fn spawn_boss(state: &GameState) -> GameState {
    let level = state.player.level;
    if state.boss.is_some() || level == 0 || level % 10 != 0 {
        return state.clone();
    }
    info!("boss spawned at level {}", level);
    let mut next = state.clone();
    next.boss = Some(Boss::new(state.width / 2.0, -50.0, level));
    next.events.push(GameEvent::BossSpawned);
    next
}

// ── Per-tick phases ──────────────────────────────────────────────────────────

fn advance_projectiles(state: &mut GameState) {
    let (w, h) = (state.width, state.height);
    state.projectiles = state
        .projectiles
        .iter()
        .filter_map(|p| {
            let x = p.x + p.dx * p.speed;
            let y = p.y + p.dy * p.speed;
            if x < 0.0 || x > w || y < 0.0 || y > h {
                None
            } else {
                Some(Projectile { x, y, ..p.clone() })
            }
        })
        .collect();
}

/// Steer every enemy, then let it soak up any projectiles it overlaps and
/// trade itself for contact damage if it reached the player.
fn update_enemies(state: &mut GameState) {
    let (px, py, psize) = (state.player.x, state.player.y, state.player.size);
    for enemy in &mut state.enemies {
        let (x, y) = steer_toward(enemy.x, enemy.y, enemy.speed, px, py);
        enemy.x = x;
        enemy.y = y;

        state.projectiles.retain(|b| {
            if overlaps(enemy.x, enemy.y, enemy.size, b.x, b.y, b.size) {
                enemy.hp -= PROJECTILE_DAMAGE;
                false
            } else {
                true
            }
        });

        if overlaps(enemy.x, enemy.y, enemy.size, px, py, psize) {
            state.player.hp -= enemy.kind.profile().contact_damage;
            enemy.hp = 0;
        }
    }
}

/// Remove dead enemies, paying out experience and detonating explosives.
/// Splash kills are resolved in the same pass, so explosions can chain.
fn resolve_deaths(state: &mut GameState) {
    while let Some(i) = state.enemies.iter().position(|e| e.hp <= 0) {
        let mut dead = state.enemies.remove(i);

        if dead.kind == EnemyKind::Explosive && !dead.exploded {
            dead.exploded = true;
            for other in &mut state.enemies {
                if distance(dead.x, dead.y, other.x, other.y) < EXPLOSION_RADIUS {
                    other.hp -= EXPLOSION_DAMAGE;
                }
            }
            if distance(dead.x, dead.y, state.player.x, state.player.y) < EXPLOSION_RADIUS {
                state.player.hp -= EXPLOSION_DAMAGE;
            }
            state.events.push(GameEvent::Exploded {
                x: dead.x,
                y: dead.y,
            });
        }

        state.player.exp += EXP_PER_ENEMY;
        state.events.push(GameEvent::EnemyKilled(dead.kind));
        state.events.push(GameEvent::ExpGained(EXP_PER_ENEMY));
    }
}

fn update_boss(state: &mut GameState) {
    let Some(mut boss) = state.boss.take() else {
        return;
    };
    let (px, py, psize) = (state.player.x, state.player.y, state.player.size);

    let (x, y) = steer_toward(boss.x, boss.y, boss.speed, px, py);
    boss.x = x;
    boss.y = y;

    if overlaps(boss.x, boss.y, boss.size, px, py, psize) {
        state.player.hp -= BOSS_CONTACT_DAMAGE;
    }

    state.projectiles.retain(|b| {
        if overlaps(boss.x, boss.y, boss.size, b.x, b.y, b.size) {
            boss.hp -= PROJECTILE_DAMAGE;
            false
        } else {
            true
        }
    });

    if boss.hp <= 0 {
        info!("boss defeated at level {}", state.player.level);
        state.player.exp += EXP_PER_BOSS;
        state.events.push(GameEvent::BossDefeated);
        state.events.push(GameEvent::ExpGained(EXP_PER_BOSS));
    } else {
        state.boss = Some(boss);
    }
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
///
/// Paused and finished worlds are returned unchanged.
pub fn tick(state: &GameState, rng: &mut impl Rng) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }

    // ── 0. Clock & timers ────────────────────────────────────────────────────
    let mut next = state.clone();
    next.frame += 1;
    next.clock_ms += next.config.frame_ms;
    let mut next = expire_timers(&next);

    // ── 1. Projectiles ───────────────────────────────────────────────────────
    advance_projectiles(&mut next);

    // ── 2-3. Enemies: steering, projectile hits, player contact ─────────────
    update_enemies(&mut next);

    // ── 4. Deaths & explosions ───────────────────────────────────────────────
    resolve_deaths(&mut next);

    // ── 5. Boss ──────────────────────────────────────────────────────────────
    let mut next = spawn_boss(&next);
    update_boss(&mut next);

    // ── 6-7. Level & ability unlocks ─────────────────────────────────────────
    next.player.level = level_for_exp(next.player.exp);
    let mut next = grant_abilities(&next);

    // ── 8. Game over ─────────────────────────────────────────────────────────
    next.player.hp = next.player.hp.clamp(0, PLAYER_MAX_HP);
    if next.player.hp == 0 {
        info!(
            "game over: level {} exp {} after {} ms",
            next.player.level, next.player.exp, next.clock_ms
        );
        next.status = GameStatus::GameOver;
        next.events.push(GameEvent::GameOver);
        return next;
    }

    // ── 9. Spawn attempt ─────────────────────────────────────────────────────
    if rng.gen_bool(next.config.spawn_chance) {
        next = spawn_enemy(&next, rng);
    }

    next
}
