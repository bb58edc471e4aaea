//! Game phase, per-frame input and the simulated world
//!
//! The world owns every mutable piece of physics state: the player, enemies,
//! bullets, the destructible map and the run counters. Only the tick writes
//! to it.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{Bullet, Enemy, EnemyKind, Player};
use super::map::DestructibleMap;
use crate::consts::*;
use crate::levels::{LevelRecipe, PlayerStats};
use crate::report::FinishReason;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing loaded yet
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Level won; left only by loading a level
    Victory,
    /// Level lost; left only by loading a level
    GameOver,
}

impl GamePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::GameOver)
    }

    /// HUD banner for this phase
    pub fn banner(self) -> Option<&'static str> {
        match self {
            GamePhase::Paused => Some("PAUSED"),
            GamePhase::Victory => Some("VICTORY!"),
            GamePhase::GameOver => Some("GAME OVER"),
            GamePhase::Menu | GamePhase::Playing => None,
        }
    }
}

/// Input signals for one frame
///
/// Directions and primary fire are "is held"; `special` and `pause` are
/// "was pressed this frame".
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Primary fire
    pub fire: bool,
    /// Radial special burst
    pub special: bool,
    /// Pause toggle
    pub pause: bool,
}

/// How a tick ended the level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub victory: bool,
    pub reason: FinishReason,
}

impl MatchOutcome {
    pub fn won(reason: FinishReason) -> Self {
        Self {
            victory: true,
            reason,
        }
    }

    pub fn lost(reason: FinishReason) -> Self {
        Self {
            victory: false,
            reason,
        }
    }
}

/// All simulated state for one level
#[derive(Debug, Clone)]
pub struct World {
    /// Drawing area size (pixels)
    pub viewport: Vec2,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub map: DestructibleMap,
    pub shots_fired: u32,
    /// Player bullets that struck an enemy
    pub hits: u32,
}

impl World {
    pub fn new(viewport: Vec2) -> Self {
        let mut map = DestructibleMap::new();
        map.resize(viewport.x, viewport.y);
        let stats = PlayerStats::default();
        Self {
            viewport,
            player: Player::new(
                player_spawn(viewport),
                stats.health,
                stats.lives,
                stats.specials,
                stats.speed,
            ),
            enemies: Vec::new(),
            bullets: Vec::new(),
            map,
            shots_fired: 0,
            hits: 0,
        }
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.map.resize(viewport.x, viewport.y);
    }

    /// Respawn the player and enemies for a level and zero the counters
    ///
    /// The map is rebuilt separately.
    pub fn reset_for_level(&mut self, recipe: &LevelRecipe, rng: &mut Pcg32) {
        let stats = &recipe.player;
        self.player = Player::new(
            player_spawn(self.viewport),
            stats.health,
            stats.lives,
            stats.specials,
            stats.speed,
        );

        self.enemies.clear();
        for wave in &recipe.enemies {
            // Zero or missing values fall back to the wave defaults
            let count = if wave.count == 0 { 6 } else { wave.count };
            let hp = if wave.hp <= 0 { 1 } else { wave.hp };
            let speed = wave.speed.filter(|s| *s > 0.0).unwrap_or(100.0);
            let fire_rate = wave.fire_rate.unwrap_or(0.0);
            for _ in 0..count {
                let pos = Vec2::new(
                    60.0 + rng.random::<f32>() * (self.viewport.x - 120.0).max(0.0),
                    70.0 + rng.random::<f32>() * 200.0,
                );
                let dir = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
                let vel = Vec2::new(dir * speed * 0.4, 0.0);
                let cooldown = rng.random::<f32>() * 2.0;
                self.enemies
                    .push(Enemy::new(wave.kind, pos, vel, hp, fire_rate, cooldown));
            }
        }

        if let Some(boss) = &recipe.boss {
            self.enemies.push(Enemy::new(
                EnemyKind::Boss,
                Vec2::new(self.viewport.x / 2.0, 120.0),
                Vec2::new(boss.speed.unwrap_or(BOSS_DEFAULT_SPEED), 0.0),
                boss.hp,
                boss.fire_rate.unwrap_or(2.0),
                1.5,
            ));
        }

        // Recipes without enemies still get something to shoot at
        if self.enemies.is_empty() {
            for i in 0..6 {
                let pos = Vec2::new(60.0 + i as f32 * 80.0, 100.0 + rng.random::<f32>() * 60.0);
                let dir = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
                self.enemies.push(Enemy::new(
                    EnemyKind::Drone,
                    pos,
                    Vec2::new(dir * 40.0, 0.0),
                    1,
                    0.0,
                    1.0,
                ));
            }
        }

        self.bullets.clear();
        self.shots_fired = 0;
        self.hits = 0;
    }
}

fn player_spawn(viewport: Vec2) -> Vec2 {
    Vec2::new(viewport.x / 2.0, viewport.y - PLAYER_SPAWN_OFFSET_Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{BossSpec, EnemyWave, LevelCatalog};
    use rand::SeedableRng;

    #[test]
    fn test_spawn_from_recipe() {
        let recipe = LevelCatalog::builtin().recipe(2);
        let mut world = World::new(Vec2::new(960.0, 640.0));
        let mut rng = Pcg32::seed_from_u64(1);
        world.reset_for_level(&recipe, &mut rng);

        // 18 drones + 10 shooters + 5 turrets + boss
        assert_eq!(world.enemies.len(), 34);
        let boss = world.enemies.last().expect("boss spawned");
        assert_eq!(boss.kind, EnemyKind::Boss);
        assert_eq!(boss.hp, 30);
        assert_eq!(boss.fire_rate, 2.2);

        for enemy in &world.enemies[..33] {
            assert!((60.0..=900.0).contains(&enemy.pos.x));
            assert!((70.0..=270.0).contains(&enemy.pos.y));
        }
        let turret = &world.enemies[30];
        assert_eq!(turret.kind, EnemyKind::Turret);
        assert_eq!(turret.vel.x.abs(), 40.0);

        assert_eq!(world.player.pos, Vec2::new(480.0, 600.0));
        assert_eq!(world.player.specials, 2);
        assert_eq!(world.player.max_health, 100);
    }

    #[test]
    fn test_empty_recipe_gets_fallback_drones() {
        let mut recipe = LevelCatalog::builtin().recipe(0);
        recipe.enemies.clear();
        let mut world = World::new(Vec2::new(960.0, 640.0));
        let mut rng = Pcg32::seed_from_u64(1);
        world.reset_for_level(&recipe, &mut rng);

        assert_eq!(world.enemies.len(), 6);
        assert!(world.enemies.iter().all(|e| e.kind == EnemyKind::Drone && e.fire_rate == 0.0));
        assert_eq!(world.enemies[5].pos.x, 460.0);
    }

    #[test]
    fn test_boss_only_recipe_has_no_fallback() {
        let mut recipe = LevelCatalog::builtin().recipe(0);
        recipe.enemies.clear();
        recipe.boss = Some(BossSpec::default());
        let mut world = World::new(Vec2::new(960.0, 640.0));
        let mut rng = Pcg32::seed_from_u64(1);
        world.reset_for_level(&recipe, &mut rng);

        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.enemies[0].hp, 25);
    }

    #[test]
    fn test_zero_wave_values_fall_back() {
        let mut recipe = LevelCatalog::builtin().recipe(0);
        recipe.enemies = vec![EnemyWave {
            kind: EnemyKind::Shooter,
            count: 0,
            hp: 0,
            speed: Some(0.0),
            fire_rate: None,
        }];
        let mut world = World::new(Vec2::new(960.0, 640.0));
        let mut rng = Pcg32::seed_from_u64(1);
        world.reset_for_level(&recipe, &mut rng);

        assert_eq!(world.enemies.len(), 6);
        for enemy in &world.enemies {
            assert_eq!(enemy.kind, EnemyKind::Shooter);
            assert_eq!(enemy.hp, 1);
            assert_eq!(enemy.vel.x.abs(), 40.0);
        }
    }

    #[test]
    fn test_boss_moves_at_recipe_speed() {
        let mut recipe = LevelCatalog::builtin().recipe(2);
        let mut world = World::new(Vec2::new(960.0, 640.0));
        let mut rng = Pcg32::seed_from_u64(1);
        world.reset_for_level(&recipe, &mut rng);
        assert_eq!(world.enemies.last().map(|b| b.vel.x), Some(85.0));

        recipe.boss = Some(BossSpec::default());
        world.reset_for_level(&recipe, &mut rng);
        assert_eq!(world.enemies.last().map(|b| b.vel.x), Some(BOSS_DEFAULT_SPEED));
    }

    #[test]
    fn test_reset_clears_counters() {
        let recipe = LevelCatalog::builtin().recipe(0);
        let mut world = World::new(Vec2::new(960.0, 640.0));
        world.shots_fired = 10;
        world.hits = 4;
        world.bullets.push(Bullet::player(Vec2::ZERO, Vec2::ZERO, false));
        let mut rng = Pcg32::seed_from_u64(1);
        world.reset_for_level(&recipe, &mut rng);

        assert_eq!(world.shots_fired, 0);
        assert_eq!(world.hits, 0);
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_phase_banners() {
        assert_eq!(GamePhase::Playing.banner(), None);
        assert_eq!(GamePhase::Paused.banner(), Some("PAUSED"));
        assert!(GamePhase::GameOver.is_finished());
        assert!(!GamePhase::Paused.is_finished());
    }
}
