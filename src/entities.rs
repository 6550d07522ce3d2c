/// All world entity types — pure data, no logic beyond fixed lookup tables.

use crate::config::SimConfig;

// ── Fixed entity parameters ──────────────────────────────────────────────────

pub const PLAYER_SIZE: f32 = 20.0;
pub const PLAYER_BASE_SPEED: f32 = 3.0;
pub const PLAYER_MAX_HP: i32 = 100;

pub const PROJECTILE_SIZE: f32 = 5.0;
pub const PROJECTILE_SPEED: f32 = 10.0;

pub const BOSS_SIZE: f32 = 50.0;
pub const BOSS_SPEED: f32 = 1.0;

/// Enemies spawn this far outside the playfield edge.
pub const SPAWN_MARGIN: f32 = 20.0;

// ── Enums ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Normal,
    Ice,
    Explosive,
    Tank,
}

/// Colour tag derived from the enemy kind. The renderer picks the actual
/// terminal colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyColor {
    Red,
    Cyan,
    Orange,
    Gray,
}

/// Fixed parameters of one enemy kind. Speed and hp scale with the player
/// level: `base + level / divisor`, hp rounded down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProfile {
    pub size: f32,
    pub base_speed: f32,
    pub speed_divisor: f32,
    pub base_hp: i32,
    pub hp_divisor: u32,
    pub color: EnemyColor,
    pub contact_damage: i32,
}

impl EnemyKind {
    pub fn profile(self) -> EnemyProfile {
        match self {
            EnemyKind::Normal => EnemyProfile {
                size: 20.0,
                base_speed: 0.5,
                speed_divisor: 10.0,
                base_hp: 2,
                hp_divisor: 5,
                color: EnemyColor::Red,
                contact_damage: 1,
            },
            EnemyKind::Ice => EnemyProfile {
                size: 25.0,
                base_speed: 0.3,
                speed_divisor: 15.0,
                base_hp: 3,
                hp_divisor: 7,
                color: EnemyColor::Cyan,
                contact_damage: 2,
            },
            EnemyKind::Explosive => EnemyProfile {
                size: 30.0,
                base_speed: 0.7,
                speed_divisor: 8.0,
                base_hp: 1,
                hp_divisor: 3,
                color: EnemyColor::Orange,
                contact_damage: 1,
            },
            EnemyKind::Tank => EnemyProfile {
                size: 35.0,
                base_speed: 0.4,
                speed_divisor: 12.0,
                base_hp: 5,
                hp_divisor: 4,
                color: EnemyColor::Gray,
                contact_damage: 1,
            },
        }
    }

    pub fn speed_at(self, level: u32) -> f32 {
        let p = self.profile();
        p.base_speed + level as f32 / p.speed_divisor
    }

    pub fn hp_at(self, level: u32) -> i32 {
        let p = self.profile();
        p.base_hp + (level / p.hp_divisor) as i32
    }

    pub fn color(self) -> EnemyColor {
        self.profile().color
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Paused,
    GameOver,
}

/// What an ability does when activated. Interpreted by
/// `abilities::apply_effect`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbilityEffect {
    /// Subtract `amount` hp from every live enemy (the boss is untouched).
    DamageAll { amount: i32 },
    /// Raise player speed by `amount` for `duration_ms` of simulation time.
    SpeedBoost { amount: f32, duration_ms: u64 },
    /// Restore `amount` hp, capped at the player maximum.
    Heal { amount: i32 },
}

/// Things that happened during a step, drained by the front end for audio
/// cues and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Shot,
    ExpGained(u32),
    EnemyKilled(EnemyKind),
    Exploded { x: f32, y: f32 },
    BossSpawned,
    BossDefeated,
    AbilityGranted(&'static str),
    AbilityUsed(&'static str),
    AbilityOnCooldown(&'static str),
    GameOver,
}

// ── Player ───────────────────────────────────────────────────────────────────

/// A temporary speed increase that lapses at `expires_at_ms` on the
/// simulation clock.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedBuff {
    pub amount: f32,
    pub expires_at_ms: u64,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub hp: i32,
    pub exp: u32,
    /// Always `exp / 10 + 1` after a tick.
    pub level: u32,
    pub buffs: Vec<SpeedBuff>,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            x,
            y,
            size: PLAYER_SIZE,
            speed: PLAYER_BASE_SPEED,
            hp: PLAYER_MAX_HP,
            exp: 0,
            level: 1,
            buffs: Vec::new(),
        }
    }

    /// Base speed plus every buff still in effect.
    pub fn effective_speed(&self) -> f32 {
        self.speed + self.buffs.iter().map(|b| b.amount).sum::<f32>()
    }
}

pub fn level_for_exp(exp: u32) -> u32 {
    exp / 10 + 1
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    /// Unit direction vector.
    pub dx: f32,
    pub dy: f32,
}

// ── Enemies & boss ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub hp: i32,
    pub kind: EnemyKind,
    /// Set once an explosive enemy has dealt its splash damage.
    pub exploded: bool,
}

impl Enemy {
    /// Build an enemy of `kind` scaled for `level`.
    pub fn new(kind: EnemyKind, x: f32, y: f32, level: u32) -> Self {
        Enemy {
            x,
            y,
            size: kind.profile().size,
            speed: kind.speed_at(level),
            hp: kind.hp_at(level),
            kind,
            exploded: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Boss {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub hp: i32,
    pub max_hp: i32,
}

impl Boss {
    pub fn new(x: f32, y: f32, level: u32) -> Self {
        let hp = 50 + level as i32 * 5;
        Boss {
            x,
            y,
            size: BOSS_SIZE,
            speed: BOSS_SPEED,
            hp,
            max_hp: hp,
        }
    }
}

// ── Abilities ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Ability {
    pub name: &'static str,
    pub description: &'static str,
    pub effect: AbilityEffect,
    /// Simulation-clock time at which the cooldown ends. `None` once it has
    /// lapsed or before the first use.
    pub cooldown_until_ms: Option<u64>,
}

impl Ability {
    pub fn is_on_cooldown(&self, now_ms: u64) -> bool {
        matches!(self.cooldown_until_ms, Some(until) if until > now_ms)
    }
}

// ── Master world state ───────────────────────────────────────────────────────

/// The entire world.  Cloneable so pure update functions can return a new
/// copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub boss: Option<Boss>,
    /// Granted abilities, in tier order.
    pub abilities: Vec<Ability>,
    /// Unit vector the next projectile travels along.
    pub aim: (f32, f32),
    pub status: GameStatus,
    /// Pausable simulation clock; advances only while playing.
    pub clock_ms: u64,
    pub frame: u64,
    pub width: f32,
    pub height: f32,
    pub config: SimConfig,
    /// Events produced since the front end last drained them.
    pub events: Vec<GameEvent>,
}
