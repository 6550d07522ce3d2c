use horde_survivor::compute::*;
use horde_survivor::config::SimConfig;
use horde_survivor::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// 800x600 world, player at (400,300), no random spawns.
fn make_state() -> GameState {
    init_state(&SimConfig {
        spawn_chance: 0.0,
        ..SimConfig::default()
    })
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn projectile(x: f32, y: f32, dx: f32, dy: f32) -> Projectile {
    Projectile {
        x,
        y,
        size: PROJECTILE_SIZE,
        speed: PROJECTILE_SPEED,
        dx,
        dy,
    }
}

fn count_events(s: &GameState, pred: impl Fn(&GameEvent) -> bool) -> usize {
    s.events.iter().filter(|e| pred(e)).count()
}

// ── init_state & lifecycle ────────────────────────────────────────────────────

#[test]
fn init_state_centres_player() {
    let s = make_state();
    assert_eq!(s.player.x, 400.0);
    assert_eq!(s.player.y, 300.0);
    assert_eq!(s.player.hp, 100);
    assert_eq!(s.player.exp, 0);
    assert_eq!(s.player.level, 1);
}

#[test]
fn init_state_empty_world() {
    let s = make_state();
    assert!(s.enemies.is_empty());
    assert!(s.projectiles.is_empty());
    assert!(s.boss.is_none());
    assert!(s.abilities.is_empty());
    assert_eq!(s.aim, (0.0, -1.0));
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.clock_ms, 0);
}

#[test]
fn pause_and_resume_toggle_status() {
    let s = make_state();
    let paused = pause(&s);
    assert_eq!(paused.status, GameStatus::Paused);
    assert_eq!(resume(&paused).status, GameStatus::Playing);
    // Resume only leaves Paused
    assert_eq!(resume(&s).status, GameStatus::Playing);
}

#[test]
fn pause_is_ignored_after_game_over() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    assert_eq!(pause(&s).status, GameStatus::GameOver);
}

#[test]
fn restart_resets_world_but_keeps_tuning() {
    let mut s = make_state();
    s.player.exp = 42;
    s.player.hp = 0;
    s.status = GameStatus::GameOver;
    s.enemies.push(Enemy::new(EnemyKind::Tank, 10.0, 10.0, 5));
    let s2 = restart(&s);
    assert_eq!(s2.player.exp, 0);
    assert_eq!(s2.player.hp, 100);
    assert_eq!(s2.status, GameStatus::Playing);
    assert!(s2.enemies.is_empty());
    assert_eq!(s2.config, s.config);
}

#[test]
fn tick_does_nothing_while_paused() {
    let mut s = pause(&make_state());
    s.projectiles.push(projectile(400.0, 100.0, 0.0, -1.0));
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.frame, 0);
    assert_eq!(s2.clock_ms, 0);
    assert_eq!(s2.projectiles[0].y, 100.0);
}

#[test]
fn tick_advances_clock_and_frame() {
    let s = make_state();
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.frame, 1);
    assert_eq!(s2.clock_ms, s.config.frame_ms);
}

// ── Player input ──────────────────────────────────────────────────────────────

#[test]
fn move_player_steps_by_speed() {
    let s = make_state();
    let s2 = move_player(&s, 1, -1);
    assert_eq!(s2.player.x, 403.0);
    assert_eq!(s2.player.y, 297.0);
}

#[test]
fn move_player_clamps_to_playfield() {
    let mut s = make_state();
    s.player.x = 11.0;
    s.player.y = 589.0;
    let s2 = move_player(&s, -1, 1);
    assert_eq!(s2.player.x, 10.0); // size / 2
    assert_eq!(s2.player.y, 590.0); // height - size / 2
}

#[test]
fn move_player_in_playfield_narrower_than_player_does_not_panic() {
    let s = init_state(&SimConfig {
        width: 10.0,
        height: 10.0,
        spawn_chance: 0.0,
        ..SimConfig::default()
    });
    let s2 = move_player(&s, 1, 1);
    assert_eq!((s2.player.x, s2.player.y), (10.0, 10.0));
}

#[test]
fn move_player_uses_speed_buffs() {
    let mut s = make_state();
    s.player.buffs.push(SpeedBuff {
        amount: 2.0,
        expires_at_ms: 5_000,
    });
    let s2 = move_player(&s, -1, 0);
    assert_eq!(s2.player.x, 395.0);
}

#[test]
fn move_player_ignored_while_paused() {
    let s = pause(&make_state());
    let s2 = move_player(&s, 1, 1);
    assert_eq!(s2.player.x, 400.0);
}

#[test]
fn aim_at_normalizes_direction() {
    let s = make_state();
    let s2 = aim_at(&s, 403.0, 304.0);
    assert!((s2.aim.0 - 0.6).abs() < 1e-6);
    assert!((s2.aim.1 - 0.8).abs() < 1e-6);
}

#[test]
fn aim_at_player_position_keeps_previous_aim() {
    let s = aim_at(&make_state(), 500.0, 300.0);
    let s2 = aim_at(&s, 400.0, 300.0);
    assert_eq!(s2.aim, (1.0, 0.0));
    assert!(s2.aim.0.is_finite() && s2.aim.1.is_finite());
}

#[test]
fn shoot_spawns_projectile_along_aim() {
    let s = aim_at(&make_state(), 400.0, 400.0);
    let s2 = player_shoot(&s);
    assert_eq!(s2.projectiles.len(), 1);
    let p = &s2.projectiles[0];
    assert_eq!((p.x, p.y), (400.0, 300.0));
    assert_eq!((p.dx, p.dy), (0.0, 1.0));
    assert_eq!(p.size, 5.0);
    assert_eq!(p.speed, 10.0);
    assert_eq!(s2.events, vec![GameEvent::Shot]);
}

#[test]
fn shoot_ignored_when_not_playing() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    assert!(player_shoot(&s).projectiles.is_empty());
}

// ── Steering ──────────────────────────────────────────────────────────────────

#[test]
fn steer_moves_speed_units_toward_target() {
    let (x, y) = steer_toward(0.0, 0.0, 5.0, 30.0, 40.0);
    assert!((x - 3.0).abs() < 1e-5);
    assert!((y - 4.0).abs() < 1e-5);
}

#[test]
fn steer_on_target_does_not_move() {
    let (x, y) = steer_toward(100.0, 100.0, 2.0, 100.0, 100.0);
    assert_eq!((x, y), (100.0, 100.0));
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[test]
fn spawn_enemy_places_enemy_outside_an_edge() {
    let mut rng = seeded_rng();
    let mut s = make_state();
    for _ in 0..11 {
        s = spawn_enemy(&s, &mut rng);
    }
    assert_eq!(s.enemies.len(), 11);
    for e in &s.enemies {
        let on_edge = e.x == -20.0 || e.x == 820.0 || e.y == -20.0 || e.y == 620.0;
        assert!(on_edge, "enemy at ({}, {}) not on a spawn edge", e.x, e.y);
    }
}

#[test]
fn spawn_enemy_respects_cap() {
    let mut rng = seeded_rng();
    let mut s = make_state();
    for _ in 0..50 {
        s = spawn_enemy(&s, &mut rng);
        assert!(s.enemies.len() <= enemy_cap(s.player.level));
    }
    assert_eq!(s.enemies.len(), 11); // 10 + level 1
}

#[test]
fn spawn_enemy_cap_grows_with_level() {
    let mut rng = seeded_rng();
    let mut s = make_state();
    s.player.exp = 40;
    s.player.level = 5;
    for _ in 0..50 {
        s = spawn_enemy(&s, &mut rng);
    }
    assert_eq!(s.enemies.len(), 15);
}

#[test]
fn spawn_enemy_rejected_when_paused() {
    let s = pause(&make_state());
    let s2 = spawn_enemy(&s, &mut seeded_rng());
    assert!(s2.enemies.is_empty());
}

#[test]
fn low_level_spawns_only_normal_enemies() {
    let mut rng = seeded_rng();
    for _ in 0..20 {
        let mut s = make_state();
        for _ in 0..11 {
            s = spawn_enemy(&s, &mut rng);
        }
        assert!(s.enemies.iter().all(|e| e.kind == EnemyKind::Normal));
    }
}

#[test]
fn enemy_kind_draw_is_gated_by_level() {
    // Ice tier rolled, gated until level 3
    assert_eq!(pick_enemy_kind(0.1, 2), EnemyKind::Normal);
    assert_eq!(pick_enemy_kind(0.1, 3), EnemyKind::Ice);
    // Explosive tier, gated until level 4
    assert_eq!(pick_enemy_kind(0.3, 3), EnemyKind::Normal);
    assert_eq!(pick_enemy_kind(0.3, 4), EnemyKind::Explosive);
    // Tank tier, gated until level 5
    assert_eq!(pick_enemy_kind(0.5, 4), EnemyKind::Normal);
    assert_eq!(pick_enemy_kind(0.5, 5), EnemyKind::Tank);
    // Low roll falls through to the next open tier
    assert_eq!(pick_enemy_kind(0.1, 4), EnemyKind::Ice);
    assert_eq!(pick_enemy_kind(0.7, 20), EnemyKind::Normal);
}

#[test]
fn spawned_enemy_scales_with_level() {
    let mut s = make_state();
    s.player.exp = 90;
    s.player.level = 10;
    let s2 = spawn_enemy(&s, &mut seeded_rng());
    let e = &s2.enemies[0];
    assert_eq!(e.hp, e.kind.hp_at(10));
    assert_eq!(e.speed, e.kind.speed_at(10));
    assert!(!e.exploded);
}

#[test]
fn boss_spawns_at_level_ten() {
    let mut s = make_state();
    s.player.level = 10;
    let s2 = spawn_boss(&s);
    let boss = s2.boss.as_ref().expect("boss should spawn");
    assert_eq!((boss.x, boss.y), (400.0, -50.0));
    assert_eq!(boss.hp, 100);
    assert_eq!(boss.max_hp, 100);
    assert!(s2.events.contains(&GameEvent::BossSpawned));
}

#[test]
fn boss_hp_scales_with_level() {
    let mut s = make_state();
    s.player.level = 20;
    assert_eq!(spawn_boss(&s).boss.unwrap().max_hp, 150);
}

#[test]
fn boss_does_not_spawn_off_multiple() {
    for level in [1, 5, 9, 11, 15] {
        let mut s = make_state();
        s.player.level = level;
        assert!(spawn_boss(&s).boss.is_none(), "level {level}");
    }
}

#[test]
fn only_one_boss_at_a_time() {
    let mut s = make_state();
    s.player.level = 10;
    let mut s2 = spawn_boss(&s);
    s2.boss.as_mut().unwrap().hp = 7;
    let s3 = spawn_boss(&s2);
    assert_eq!(s3.boss.unwrap().hp, 7);
    assert_eq!(count_events(&s2, |e| *e == GameEvent::BossSpawned), 1);
}

// ── tick — projectiles ────────────────────────────────────────────────────────

#[test]
fn tick_projectile_moves_along_direction() {
    let mut s = make_state();
    s.projectiles.push(projectile(100.0, 100.0, 1.0, 0.0));
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.projectiles.len(), 1);
    assert_eq!(s2.projectiles[0].x, 110.0);
    assert_eq!(s2.projectiles[0].y, 100.0);
}

#[test]
fn tick_projectile_discarded_outside_playfield() {
    let mut s = make_state();
    s.projectiles.push(projectile(795.0, 100.0, 1.0, 0.0)); // → 805, out
    s.projectiles.push(projectile(100.0, 5.0, 0.0, -1.0)); // → -5, out
    s.projectiles.push(projectile(100.0, 15.0, 0.0, -1.0)); // → 5, kept
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.projectiles.len(), 1);
    assert_eq!(s2.projectiles[0].y, 5.0);
}

// ── tick — enemies ────────────────────────────────────────────────────────────

#[test]
fn tick_enemy_steers_toward_player() {
    let mut s = make_state();
    s.enemies.push(Enemy::new(EnemyKind::Normal, 400.0, 100.0, 1));
    let s2 = tick(&s, &mut seeded_rng());
    let e = &s2.enemies[0];
    assert_eq!(e.x, 400.0);
    assert!((e.y - 100.6).abs() < 1e-4);
}

#[test]
fn tick_enemy_on_player_does_not_produce_nan() {
    let mut s = make_state();
    let mut e = Enemy::new(EnemyKind::Tank, 400.0, 300.0, 1);
    e.hp = 1_000;
    s.enemies.push(e);
    let s2 = tick(&s, &mut seeded_rng());
    // Contact kills it, but nothing in the world went NaN
    assert!(s2.enemies.is_empty());
    assert!(s2.player.x.is_finite() && s2.player.y.is_finite());
}

#[test]
fn projectile_damages_enemy_and_is_consumed() {
    let mut s = make_state();
    let mut e = Enemy::new(EnemyKind::Tank, 400.0, 100.0, 1);
    e.hp = 12;
    s.enemies.push(e);
    s.projectiles.push(projectile(400.0, 110.0, 0.0, -1.0));
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.enemies[0].hp, 7);
    assert!(s2.projectiles.is_empty());
}

#[test]
fn several_projectiles_can_hit_one_enemy_in_a_tick() {
    let mut s = make_state();
    let mut e = Enemy::new(EnemyKind::Tank, 400.0, 100.0, 1);
    e.hp = 20;
    s.enemies.push(e);
    s.projectiles.push(projectile(400.0, 110.0, 0.0, -1.0));
    s.projectiles.push(projectile(405.0, 110.0, 0.0, -1.0));
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.enemies[0].hp, 10);
    assert!(s2.projectiles.is_empty());
}

#[test]
fn enemy_contact_damages_player_and_kills_enemy() {
    let mut s = make_state();
    let mut e = Enemy::new(EnemyKind::Normal, 410.0, 300.0, 1);
    e.hp = 50;
    s.enemies.push(e);
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.player.hp, 99);
    assert!(s2.enemies.is_empty());
    assert_eq!(s2.player.exp, 1);
}

#[test]
fn ice_enemy_contact_hits_harder() {
    let mut s = make_state();
    s.enemies.push(Enemy::new(EnemyKind::Ice, 410.0, 300.0, 3));
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.player.hp, 98);
}

#[test]
fn killing_enemy_grants_exp_and_emits_events() {
    let mut s = make_state();
    s.enemies.push(Enemy::new(EnemyKind::Normal, 400.0, 100.0, 1));
    s.projectiles.push(projectile(400.0, 110.0, 0.0, -1.0));
    let s2 = tick(&s, &mut seeded_rng());
    assert!(s2.enemies.is_empty());
    assert_eq!(s2.player.exp, 1);
    assert!(s2.events.contains(&GameEvent::EnemyKilled(EnemyKind::Normal)));
    assert!(s2.events.contains(&GameEvent::ExpGained(1)));
}

#[test]
fn killing_tenth_enemy_grants_fireblast_once() {
    let mut s = make_state();
    s.player.exp = 9;
    s.enemies.push(Enemy::new(EnemyKind::Normal, 400.0, 200.0, 1));
    s.projectiles.push(projectile(400.0, 210.0, 0.0, -1.0));

    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.player.exp, 10);
    assert_eq!(s2.player.level, 2);
    assert_eq!(s2.abilities.len(), 1);
    assert_eq!(s2.abilities[0].name, "Fireblast");

    let s3 = tick(&s2, &mut seeded_rng());
    assert_eq!(s3.abilities.len(), 1);
    assert_eq!(
        count_events(&s3, |e| matches!(e, GameEvent::AbilityGranted(_))),
        1
    );
}

// ── tick — explosions ─────────────────────────────────────────────────────────

#[test]
fn explosive_death_splashes_nearby_enemy_but_not_distant_player() {
    let mut s = make_state();
    let mut bomb = Enemy::new(EnemyKind::Explosive, 100.0, 100.0, 1);
    bomb.hp = 5;
    let mut near = Enemy::new(EnemyKind::Normal, 140.0, 100.0, 1);
    near.hp = 20;
    s.enemies.push(bomb);
    s.enemies.push(near);
    s.projectiles.push(projectile(100.0, 110.0, 0.0, -1.0));

    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemies[0].kind, EnemyKind::Normal);
    assert_eq!(s2.enemies[0].hp, 20 - EXPLOSION_DAMAGE);
    assert_eq!(s2.player.hp, 100);
    assert_eq!(s2.player.exp, 1);
    assert_eq!(
        count_events(&s2, |e| matches!(e, GameEvent::Exploded { .. })),
        1
    );
}

#[test]
fn explosive_death_damages_player_in_radius() {
    let mut s = make_state();
    let mut bomb = Enemy::new(EnemyKind::Explosive, 400.0, 250.0, 1);
    bomb.hp = 0;
    s.enemies.push(bomb);
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.player.hp, 85);
}

#[test]
fn already_exploded_enemy_does_not_splash_again() {
    let mut s = make_state();
    let mut bomb = Enemy::new(EnemyKind::Explosive, 100.0, 100.0, 5);
    bomb.hp = 0;
    bomb.exploded = true;
    let mut near = Enemy::new(EnemyKind::Normal, 120.0, 100.0, 1);
    near.hp = 20;
    s.enemies.push(bomb);
    s.enemies.push(near);
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.enemies[0].hp, 20);
    assert_eq!(
        count_events(&s2, |e| matches!(e, GameEvent::Exploded { .. })),
        0
    );
}

#[test]
fn explosions_chain_and_each_fires_once() {
    let mut s = make_state();
    let mut first = Enemy::new(EnemyKind::Explosive, 100.0, 100.0, 5);
    first.hp = 0;
    let mut second = Enemy::new(EnemyKind::Explosive, 130.0, 100.0, 5);
    second.hp = 10;
    let mut bystander = Enemy::new(EnemyKind::Tank, 150.0, 100.0, 5);
    bystander.hp = 100;
    s.enemies.push(first);
    s.enemies.push(second);
    s.enemies.push(bystander);

    let s2 = tick(&s, &mut seeded_rng());
    // first hits second and bystander; second then hits bystander
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.enemies[0].hp, 100 - 2 * EXPLOSION_DAMAGE);
    assert_eq!(s2.player.exp, 2);
    assert_eq!(
        count_events(&s2, |e| matches!(e, GameEvent::Exploded { .. })),
        2
    );
}

// ── tick — boss ───────────────────────────────────────────────────────────────

#[test]
fn boss_contact_damages_player_every_tick_without_dying() {
    let mut s = make_state();
    s.boss = Some(Boss::new(400.0, 320.0, 10));
    let s2 = tick(&s, &mut seeded_rng());
    let s3 = tick(&s2, &mut seeded_rng());
    assert_eq!(s3.player.hp, 90);
    assert_eq!(s3.boss.as_ref().unwrap().hp, 100);
}

#[test]
fn projectile_hits_boss() {
    let mut s = make_state();
    s.boss = Some(Boss::new(400.0, 150.0, 10));
    s.projectiles.push(projectile(400.0, 160.0, 0.0, -1.0));
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.boss.unwrap().hp, 95);
    assert!(s2.projectiles.is_empty());
}

#[test]
fn boss_kill_grants_big_exp_and_every_crossed_tier() {
    let mut s = make_state();
    let mut boss = Boss::new(400.0, 150.0, 10);
    boss.hp = 5;
    s.boss = Some(boss);
    s.projectiles.push(projectile(400.0, 160.0, 0.0, -1.0));

    let s2 = tick(&s, &mut seeded_rng());
    assert!(s2.boss.is_none());
    assert_eq!(s2.player.exp, 50);
    assert_eq!(s2.player.level, 6);
    let names: Vec<_> = s2.abilities.iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["Fireblast", "Speed Boost", "Heal"]);
    assert!(s2.events.contains(&GameEvent::BossDefeated));
}

#[test]
fn tick_spawns_boss_when_level_reaches_ten() {
    let mut s = make_state();
    s.player.exp = 90;
    s.player.level = 10;
    let s2 = tick(&s, &mut seeded_rng());
    assert!(s2.boss.is_some());
}

// ── tick — game over ──────────────────────────────────────────────────────────

#[test]
fn lethal_damage_clamps_hp_and_ends_game() {
    let mut s = make_state();
    s.player.hp = 1;
    s.enemies.push(Enemy::new(EnemyKind::Ice, 410.0, 300.0, 3));
    let s2 = tick(&s, &mut seeded_rng());
    assert_eq!(s2.player.hp, 0);
    assert_eq!(s2.status, GameStatus::GameOver);
    assert!(s2.events.contains(&GameEvent::GameOver));
}

#[test]
fn no_updates_after_game_over() {
    let mut s = make_state();
    s.player.hp = 1;
    s.enemies.push(Enemy::new(EnemyKind::Ice, 410.0, 300.0, 3));
    s.enemies.push(Enemy::new(EnemyKind::Normal, 400.0, 100.0, 1));
    s.projectiles.push(projectile(100.0, 100.0, 1.0, 0.0));
    let over = tick(&s, &mut seeded_rng());

    let after = tick(&over, &mut seeded_rng());
    assert_eq!(after.frame, over.frame);
    assert_eq!(after.enemies[0].y, over.enemies[0].y);
    assert_eq!(after.projectiles[0].x, over.projectiles[0].x);
}

// ── Invariants over a long seeded run ─────────────────────────────────────────

#[test]
fn long_run_keeps_hp_and_enemy_count_in_bounds() {
    let mut rng = seeded_rng();
    let mut s = init_state(&SimConfig {
        spawn_chance: 1.0,
        ..SimConfig::default()
    });
    for i in 0..3_000 {
        if i % 5 == 0 {
            s = aim_at(&s, 0.0, (i % 600) as f32);
            s = player_shoot(&s);
        }
        s = tick(&s, &mut rng);
        assert!((0..=100).contains(&s.player.hp));
        assert!(s.enemies.len() <= enemy_cap(s.player.level));
        assert_eq!(s.player.level, level_for_exp(s.player.exp));
        if s.status == GameStatus::GameOver {
            break;
        }
    }
}
