/// Ability tiers, unlocking, and the Ready → Cooldown → Ready state machine.
///
/// Like `compute`, every public function takes the current `GameState` by
/// reference and returns a new one.

use log::{debug, info};

use crate::entities::{
    Ability, AbilityEffect, GameEvent, GameState, GameStatus, SpeedBuff, PLAYER_MAX_HP,
};

/// One rung of the unlock ladder.
#[derive(Clone, Copy, Debug)]
pub struct AbilityTier {
    pub exp_threshold: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub effect: AbilityEffect,
}

/// Unlock order. Tier N (1-based) is granted once exp reaches its threshold
/// and exactly N-1 abilities are already held.
pub const ABILITY_TIERS: [AbilityTier; 3] = [
    AbilityTier {
        exp_threshold: 10,
        name: "Fireblast",
        description: "Damages all enemies on screen",
        effect: AbilityEffect::DamageAll { amount: 10 },
    },
    AbilityTier {
        exp_threshold: 20,
        name: "Speed Boost",
        description: "Move faster for 5 seconds",
        effect: AbilityEffect::SpeedBoost {
            amount: 2.0,
            duration_ms: 5_000,
        },
    },
    AbilityTier {
        exp_threshold: 30,
        name: "Heal",
        description: "Restore 25 HP",
        effect: AbilityEffect::Heal { amount: 25 },
    },
];

impl AbilityTier {
    fn to_ability(self) -> Ability {
        Ability {
            name: self.name,
            description: self.description,
            effect: self.effect,
            cooldown_until_ms: None,
        }
    }
}

// ── Unlocking ────────────────────────────────────────────────────────────────

/// Grant every tier the player's experience has reached, in order.
///
/// The lookup is keyed by `abilities.len()`, so a tier is never granted
/// twice. Looping means a large exp jump (e.g. a boss kill) unlocks all the
/// tiers it crosses in one call instead of stranding the later ones.
pub fn grant_abilities(state: &GameState) -> GameState {
    let mut next = state.clone();
    while let Some(tier) = ABILITY_TIERS.get(next.abilities.len()) {
        if next.player.exp < tier.exp_threshold {
            break;
        }
        info!("ability unlocked: {} at {} exp", tier.name, next.player.exp);
        next.abilities.push(tier.to_ability());
        next.events.push(GameEvent::AbilityGranted(tier.name));
    }
    next
}

// ── Activation ───────────────────────────────────────────────────────────────

/// Fire the ability at `index` if it is ready.
///
/// Out-of-range indices and activation outside of play are silently ignored;
/// an ability still cooling down is a logged no-op.
pub fn activate_ability(state: &GameState, index: usize) -> GameState {
    if state.status != GameStatus::Playing {
        return state.clone();
    }
    let Some(ability) = state.abilities.get(index) else {
        return state.clone();
    };

    let now = state.clock_ms;
    if ability.is_on_cooldown(now) {
        debug!("{} is on cooldown", ability.name);
        let mut next = state.clone();
        next.events.push(GameEvent::AbilityOnCooldown(ability.name));
        return next;
    }

    let name = ability.name;
    let mut next = apply_effect(state, ability.effect);
    next.abilities[index].cooldown_until_ms = Some(now + state.config.ability_cooldown_ms);
    next.events.push(GameEvent::AbilityUsed(name));
    debug!("{} activated at {} ms", name, now);
    next
}

/// Interpret an ability effect against the world.
pub fn apply_effect(state: &GameState, effect: AbilityEffect) -> GameState {
    let mut next = state.clone();
    match effect {
        AbilityEffect::DamageAll { amount } => {
            for enemy in &mut next.enemies {
                enemy.hp -= amount;
            }
        }
        AbilityEffect::SpeedBoost {
            amount,
            duration_ms,
        } => {
            next.player.buffs.push(SpeedBuff {
                amount,
                expires_at_ms: next.clock_ms + duration_ms,
            });
        }
        AbilityEffect::Heal { amount } => {
            next.player.hp = (next.player.hp + amount).min(PLAYER_MAX_HP);
        }
    }
    next
}

// ── Expiry ───────────────────────────────────────────────────────────────────

/// Drop lapsed buffs and cooldown stamps. Runs at the start of each tick,
/// against the simulation clock, so nothing expires while paused.
pub fn expire_timers(state: &GameState) -> GameState {
    let now = state.clock_ms;
    let mut next = state.clone();
    next.player.buffs.retain(|b| b.expires_at_ms > now);
    for ability in &mut next.abilities {
        if !ability.is_on_cooldown(now) {
            ability.cooldown_until_ms = None;
        }
    }
    next
}

/// Whole seconds of cooldown left, rounded up; `None` when ready.
pub fn cooldown_remaining_secs(ability: &Ability, now_ms: u64) -> Option<u64> {
    match ability.cooldown_until_ms {
        Some(until) if until > now_ms => Some((until - now_ms).div_ceil(1000)),
        _ => None,
    }
}
