//! World update for one frame
//!
//! Order matters: the map sees player bullets before culling, enemies fire
//! before hits are resolved, and the clear check runs last.

use std::f32::consts::TAU;

use glam::Vec2;

use super::collision::{circles_overlap, in_play_area};
use super::entities::Bullet;
use super::map::TileHit;
use super::state::{FrameInput, MatchOutcome, World};
use crate::consts::*;
use crate::levels::LevelRecipe;
use crate::report::FinishReason;

/// Advance the world by `dt` seconds
///
/// Returns the outcome as soon as the level is decided; the rest of the
/// update is skipped for that frame.
pub fn update_world(
    world: &mut World,
    recipe: &LevelRecipe,
    input: &FrameInput,
    dt: f32,
) -> Option<MatchOutcome> {
    let viewport = world.viewport;

    world.player.update(dt, input, viewport);
    fire_player_weapons(world, input);

    for bullet in &mut world.bullets {
        bullet.update(dt);
    }

    // Player bullets against the map
    for bullet in world.bullets.iter_mut().filter(|b| b.alive && b.is_player_owned()) {
        let special = bullet.special;
        let hit = world.map.apply_bullet_damage(bullet, special);
        if hit == TileHit::BunkerDestroyed && recipe.bunker_wins() {
            return Some(MatchOutcome::won(FinishReason::Bunker));
        }
    }

    world
        .bullets
        .retain(|b| b.alive && in_play_area(b.pos, viewport));

    let target = world.player.pos;
    for enemy in &mut world.enemies {
        if let Some(shot) = enemy.update(dt, viewport.x, target) {
            world.bullets.push(shot);
        }
    }

    // Player bullets against enemies
    for enemy in &mut world.enemies {
        let radius = enemy.kind.hit_radius();
        for bullet in world.bullets.iter_mut().filter(|b| b.alive && b.is_player_owned()) {
            if circles_overlap(enemy.pos, bullet.pos, radius) {
                enemy.hp -= if bullet.special {
                    SPECIAL_ENEMY_DAMAGE
                } else {
                    NORMAL_ENEMY_DAMAGE
                };
                bullet.kill();
                world.hits += 1;
            }
        }
    }

    // Enemy bullets against the player
    let player = &mut world.player;
    for bullet in world.bullets.iter_mut().filter(|b| b.alive && !b.is_player_owned()) {
        if !circles_overlap(player.pos, bullet.pos, PLAYER_HIT_RADIUS) {
            continue;
        }
        bullet.kill();
        if player.is_invulnerable() {
            continue;
        }
        player.health -= bullet.damage;
        if player.health > 0 {
            continue;
        }
        player.lives = player.lives.saturating_sub(1);
        if player.lives == 0 {
            return Some(MatchOutcome::lost(FinishReason::Death));
        }
        player.health = player.max_health;
        player.invulnerable = RESPAWN_INVULNERABILITY;
    }

    world.enemies.retain(|e| !e.is_dead());
    world.bullets.retain(|b| b.alive);

    if world.enemies.is_empty() && recipe.clear_wins() {
        return Some(MatchOutcome::won(FinishReason::Clear));
    }
    None
}

fn fire_player_weapons(world: &mut World, input: &FrameInput) {
    let player = &mut world.player;

    if input.fire && player.can_fire() {
        player.mark_fired();
        world.bullets.push(Bullet::player(
            player.pos - Vec2::new(0.0, PLAYER_MUZZLE_OFFSET),
            Vec2::new(0.0, -PLAYER_BULLET_SPEED),
            false,
        ));
        world.shots_fired += 1;
    }

    if input.special && player.specials > 0 {
        player.specials -= 1;
        for i in 0..SPECIAL_BURST_COUNT {
            let angle = TAU * i as f32 / SPECIAL_BURST_COUNT as f32;
            world.bullets.push(Bullet::player(
                player.pos,
                Vec2::from_angle(angle) * SPECIAL_BULLET_SPEED,
                true,
            ));
        }
        world.shots_fired += SPECIAL_BURST_COUNT as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LevelCatalog, LevelMode};
    use crate::sim::entities::{Enemy, EnemyKind};
    use crate::sim::map::{DestructibleMap, MapConfig};

    const DT: f32 = 1.0 / 60.0;

    /// Empty map, one harmless enemy parked far from the player
    fn setup(mode: Option<LevelMode>) -> (World, LevelRecipe) {
        let mut recipe = LevelCatalog::builtin().recipe(0);
        recipe.mode = mode;
        let mut world = World::new(Vec2::new(960.0, 640.0));
        world.enemies.push(parked(Vec2::new(100.0, 100.0), 5));
        (world, recipe)
    }

    fn parked(pos: Vec2, hp: i32) -> Enemy {
        Enemy::new(EnemyKind::Drone, pos, Vec2::ZERO, hp, 0.0, 0.0)
    }

    fn fire() -> FrameInput {
        FrameInput {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_primary_fire() {
        let (mut world, recipe) = setup(Some(LevelMode::Hunt));
        assert!(update_world(&mut world, &recipe, &fire(), DT).is_none());

        assert_eq!(world.shots_fired, 1);
        assert_eq!(world.bullets.len(), 1);
        let bullet = &world.bullets[0];
        assert!(bullet.is_player_owned());
        assert_eq!(bullet.vel, Vec2::new(0.0, -PLAYER_BULLET_SPEED));
        // Spawned at the muzzle, then integrated once
        let expected_y = 600.0 - PLAYER_MUZZLE_OFFSET - PLAYER_BULLET_SPEED * DT;
        assert!((bullet.pos.y - expected_y).abs() < 1e-3);

        // Cooldown blocks the next frame
        update_world(&mut world, &recipe, &fire(), DT);
        assert_eq!(world.shots_fired, 1);
    }

    #[test]
    fn test_special_burst() {
        let (mut world, recipe) = setup(Some(LevelMode::Hunt));
        let input = FrameInput {
            special: true,
            ..Default::default()
        };
        update_world(&mut world, &recipe, &input, DT);

        assert_eq!(world.player.specials, 0);
        assert_eq!(world.shots_fired, SPECIAL_BURST_COUNT as u32);
        assert_eq!(world.bullets.len(), SPECIAL_BURST_COUNT);
        assert!(world.bullets.iter().all(|b| b.special));
        assert!((world.bullets[0].vel - Vec2::new(SPECIAL_BULLET_SPEED, 0.0)).length() < 1e-3);

        // No charges left
        update_world(&mut world, &recipe, &input, DT);
        assert_eq!(world.shots_fired, SPECIAL_BURST_COUNT as u32);
    }

    #[test]
    fn test_bullets_culled_off_screen() {
        let (mut world, recipe) = setup(Some(LevelMode::Hunt));
        world
            .bullets
            .push(Bullet::player(Vec2::new(480.0, -35.0), Vec2::new(0.0, -480.0), false));
        world
            .bullets
            .push(Bullet::enemy(Vec2::new(900.0, 300.0), Vec2::ZERO, 1));
        update_world(&mut world, &recipe, &FrameInput::default(), DT);
        assert_eq!(world.bullets.len(), 1);
        assert!(!world.bullets[0].is_player_owned());
    }

    #[test]
    fn test_hits_damage_enemies() {
        let (mut world, recipe) = setup(Some(LevelMode::HuntOnlyBunker));
        world.enemies.clear();
        world.enemies.push(parked(Vec2::new(300.0, 300.0), 3));
        world
            .bullets
            .push(Bullet::player(Vec2::new(300.0, 305.0), Vec2::ZERO, false));
        world
            .bullets
            .push(Bullet::player(Vec2::new(305.0, 300.0), Vec2::ZERO, true));

        update_world(&mut world, &recipe, &FrameInput::default(), DT);
        assert_eq!(world.hits, 2);
        assert!(world.enemies.is_empty());
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_boss_has_wider_hitbox() {
        let (mut world, recipe) = setup(Some(LevelMode::HuntOnlyBunker));
        world.enemies.clear();
        world.enemies.push(Enemy::new(
            EnemyKind::Boss,
            Vec2::new(300.0, 300.0),
            Vec2::ZERO,
            10,
            0.0,
            0.0,
        ));
        world.enemies.push(parked(Vec2::new(600.0, 300.0), 10));
        world
            .bullets
            .push(Bullet::player(Vec2::new(315.0, 300.0), Vec2::ZERO, false));
        world
            .bullets
            .push(Bullet::player(Vec2::new(615.0, 300.0), Vec2::ZERO, false));

        update_world(&mut world, &recipe, &FrameInput::default(), DT);
        assert_eq!(world.enemies[0].hp, 9);
        assert_eq!(world.enemies[1].hp, 10);
        assert_eq!(world.hits, 1);
    }

    #[test]
    fn test_last_life_lost_is_death() {
        let (mut world, recipe) = setup(Some(LevelMode::Hunt));
        world.player.health = 1;
        world.player.lives = 1;
        world
            .bullets
            .push(Bullet::enemy(world.player.pos, Vec2::ZERO, 1));

        let outcome = update_world(&mut world, &recipe, &FrameInput::default(), DT);
        assert_eq!(outcome, Some(MatchOutcome::lost(FinishReason::Death)));
    }

    #[test]
    fn test_respawn_grants_invulnerability() {
        let (mut world, recipe) = setup(Some(LevelMode::Hunt));
        world.player.health = 1;
        world.player.lives = 2;
        let at = world.player.pos;
        world.bullets.push(Bullet::enemy(at, Vec2::ZERO, 1));
        world.bullets.push(Bullet::enemy(at, Vec2::ZERO, 1));

        assert!(update_world(&mut world, &recipe, &FrameInput::default(), DT).is_none());
        assert_eq!(world.player.lives, 1);
        assert_eq!(world.player.health, world.player.max_health);
        assert_eq!(world.player.invulnerable, RESPAWN_INVULNERABILITY);
        // The second bullet was absorbed by the fresh invulnerability
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_clear_victory_respects_mode() {
        for (mode, expected) in [
            (None, Some(MatchOutcome::won(FinishReason::Clear))),
            (Some(LevelMode::Clear), Some(MatchOutcome::won(FinishReason::Clear))),
            (Some(LevelMode::Hunt), Some(MatchOutcome::won(FinishReason::Clear))),
            (Some(LevelMode::HuntOnlyBunker), None),
        ] {
            let (mut world, recipe) = setup(mode);
            world.enemies.clear();
            assert_eq!(
                update_world(&mut world, &recipe, &FrameInput::default(), DT),
                expected,
                "mode {mode:?}"
            );
        }
    }

    fn bunker_world(mode: Option<LevelMode>) -> (World, LevelRecipe) {
        let (mut world, recipe) = setup(mode);
        let mut map = DestructibleMap::new();
        map.resize(world.viewport.x, world.viewport.y);
        map.configure_with(MapConfig {
            target_blocks: 10,
            tile_hp: 1,
            flash_period_sec: 12,
            flash_duration_ms: 180,
            seed: 17,
        });
        map.build(0.0);
        world.map = map;
        (world, recipe)
    }

    fn shoot_bunker(world: &mut World) {
        let (r, c) = world.map.bunker().expect("bunker placed");
        world.bullets.push(Bullet::player(
            DestructibleMap::tile_center(r, c),
            Vec2::ZERO,
            true,
        ));
    }

    #[test]
    fn test_bunker_victory_in_hunt() {
        for mode in [None, Some(LevelMode::Hunt)] {
            let (mut world, recipe) = bunker_world(mode);
            shoot_bunker(&mut world);
            let outcome = update_world(&mut world, &recipe, &FrameInput::default(), DT);
            assert_eq!(outcome, Some(MatchOutcome::won(FinishReason::Bunker)));
            assert!(world.map.bunker().is_none());
        }
    }

    #[test]
    fn test_bunker_does_not_win_other_modes() {
        for mode in [Some(LevelMode::Clear), Some(LevelMode::HuntOnlyBunker)] {
            let (mut world, recipe) = bunker_world(mode);
            shoot_bunker(&mut world);
            assert!(update_world(&mut world, &recipe, &FrameInput::default(), DT).is_none());
            assert!(world.map.bunker().is_none());
        }
    }
}
