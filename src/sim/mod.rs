//! Simulation module
//!
//! All gameplay logic lives here:
//! - Time only enters as explicit frame instants
//! - Randomness only from seeded generators
//! - Drawing goes through the abstract surface

pub mod collision;
pub mod engine;
pub mod entities;
pub mod map;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, in_play_area};
pub use engine::SimulationEngine;
pub use entities::{Bullet, BulletOwner, Enemy, EnemyKind, Entity, Player};
pub use map::{DestructibleMap, MapConfig, Tile, TileHit};
pub use rng::MapRng;
pub use state::{FrameInput, GamePhase, MatchOutcome, World};
pub use tick::update_world;
