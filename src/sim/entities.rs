//! Player, enemies and bullets
//!
//! Each entity only knows its own kinematics. Collisions between them and
//! against the map are resolved by the tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::FrameInput;
use crate::consts::*;
use crate::render::{Surface, palette};

/// Shared capabilities of everything that lives in the world
pub trait Entity {
    fn pos(&self) -> Vec2;
    fn vel(&self) -> Vec2;
    fn draw(&self, surface: &mut dyn Surface);
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Velocity applied during the last update
    pub vel: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub lives: u32,
    /// Remaining radial bursts
    pub specials: u32,
    /// Movement speed (pixels/s)
    pub speed: f32,
    /// Seconds between primary shots
    pub fire_interval: f32,
    /// Seconds until the next primary shot
    pub cooldown: f32,
    /// Seconds of damage immunity left
    pub invulnerable: f32,
}

impl Player {
    pub fn new(pos: Vec2, health: i32, lives: u32, specials: u32, speed: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            health,
            max_health: health,
            lives,
            specials,
            speed,
            fire_interval: PLAYER_FIRE_INTERVAL,
            cooldown: 0.0,
            invulnerable: 0.0,
        }
    }

    /// Move by directional intent, clamped to the viewport minus a margin
    pub fn update(&mut self, dt: f32, input: &FrameInput, bounds: Vec2) {
        let dir = Vec2::new(
            f32::from(u8::from(input.right)) - f32::from(u8::from(input.left)),
            f32::from(u8::from(input.down)) - f32::from(u8::from(input.up)),
        );
        self.vel = dir * self.speed;

        let next = self.pos + self.vel * dt;
        self.pos = Vec2::new(
            next.x.clamp(PLAYER_MARGIN, (bounds.x - PLAYER_MARGIN).max(PLAYER_MARGIN)),
            next.y.clamp(PLAYER_MARGIN, (bounds.y - PLAYER_MARGIN).max(PLAYER_MARGIN)),
        );

        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Primary fire is available only once the cooldown has fully run out
    pub fn can_fire(&self) -> bool {
        self.cooldown == 0.0
    }

    pub fn mark_fired(&mut self) {
        self.cooldown = self.fire_interval;
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }
}

impl Entity for Player {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn vel(&self) -> Vec2 {
        self.vel
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let p = self.pos;
        surface.fill_triangle(
            p + Vec2::new(0.0, -10.0),
            p + Vec2::new(-8.0, 8.0),
            p + Vec2::new(8.0, 8.0),
            palette::PLAYER,
        );
    }
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    #[default]
    Drone,
    Shooter,
    Turret,
    Boss,
}

impl EnemyKind {
    /// Radius used for bullet hits
    pub fn hit_radius(self) -> f32 {
        match self {
            EnemyKind::Boss => BOSS_HIT_RADIUS,
            _ => ENEMY_HIT_RADIUS,
        }
    }

    fn body_radius(self) -> f32 {
        match self {
            EnemyKind::Boss => 16.0,
            _ => 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: i32,
    /// Starting hp, for the health bar
    pub max_hp: i32,
    /// Shots per second (0 = never fires)
    pub fire_rate: f32,
    /// Seconds until the next shot
    pub fire_cooldown: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, vel: Vec2, hp: i32, fire_rate: f32, fire_cooldown: f32) -> Self {
        Self {
            kind,
            pos,
            vel,
            hp,
            max_hp: hp.max(1),
            fire_rate,
            fire_cooldown,
        }
    }

    /// Move, bounce off the side margins and maybe fire at `target`
    pub fn update(&mut self, dt: f32, viewport_width: f32, target: Vec2) -> Option<Bullet> {
        self.pos += self.vel * dt;

        if self.pos.x < ENEMY_EDGE_MARGIN {
            self.vel.x = self.vel.x.abs();
        } else if self.pos.x > viewport_width - ENEMY_EDGE_MARGIN {
            self.vel.x = -self.vel.x.abs();
        }

        if self.fire_rate <= 0.0 {
            return None;
        }
        self.fire_cooldown -= dt;
        if self.fire_cooldown > 0.0 {
            return None;
        }
        self.fire_cooldown = 1.0 / self.fire_rate;

        // Straight down when sitting on top of the target
        let dir = (target - self.pos).try_normalize().unwrap_or(Vec2::Y);
        Some(Bullet::enemy(self.pos, dir * ENEMY_BULLET_SPEED, ENEMY_BULLET_DAMAGE))
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

impl Entity for Enemy {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn vel(&self) -> Vec2 {
        self.vel
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let color = if self.kind == EnemyKind::Boss {
            palette::BOSS
        } else {
            palette::ENEMY
        };
        let r = self.kind.body_radius();
        surface.fill_circle(self.pos, r, color);

        let bar_width = r * 1.6;
        let bar_min = self.pos + Vec2::new(-bar_width / 2.0, -r - 2.0);
        let fraction = (self.hp.max(0) as f32 / self.max_hp as f32).min(1.0);
        surface.fill_rect(bar_min, Vec2::new(bar_width, 3.0), palette::HEALTH_BAR_BACK);
        surface.fill_rect(bar_min, Vec2::new(bar_width * fraction, 3.0), palette::HEALTH_BAR);
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: BulletOwner,
    /// Part of a special burst (heavier damage)
    pub special: bool,
    /// Damage dealt to the player
    pub damage: i32,
    pub alive: bool,
}

impl Bullet {
    pub fn player(pos: Vec2, vel: Vec2, special: bool) -> Self {
        Self {
            pos,
            vel,
            owner: BulletOwner::Player,
            special,
            damage: 1,
            alive: true,
        }
    }

    pub fn enemy(pos: Vec2, vel: Vec2, damage: i32) -> Self {
        Self {
            pos,
            vel,
            owner: BulletOwner::Enemy,
            special: false,
            damage,
            alive: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    pub fn is_player_owned(&self) -> bool {
        self.owner == BulletOwner::Player
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}

impl Entity for Bullet {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn vel(&self) -> Vec2 {
        self.vel
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let color = match (self.owner, self.special) {
            (BulletOwner::Enemy, _) => palette::ENEMY_BULLET,
            (BulletOwner::Player, true) => palette::SPECIAL_BULLET,
            (BulletOwner::Player, false) => palette::PLAYER_BULLET,
        };
        surface.fill_circle(self.pos, 2.2, color);
    }
}
