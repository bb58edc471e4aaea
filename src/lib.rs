//! Bunker Hunt - simulation core for a 2D arcade shooter
//!
//! Core modules:
//! - `sim`: Per-frame simulation (entities, destructible map, state machine)
//! - `levels`: Authored level recipes and procedural difficulty scaling
//! - `render`: Abstract drawing surface the frame is rendered to
//! - `report`: Finish event handed to the match-lifecycle collaborator
//! - `settings`: Engine settings (viewport, seeds, debug drawing)

pub mod levels;
pub mod render;
pub mod report;
pub mod settings;
pub mod sim;

pub use levels::{LevelCatalog, LevelMode, LevelRecipe};
pub use report::{FinishEvent, FinishReason, FinishReporter, MatchStats, ReportError};
pub use settings::Settings;
pub use sim::{FrameInput, GamePhase, SimulationEngine};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.033;
    /// Minimum time between two pause toggles (seconds)
    pub const PAUSE_DEBOUNCE: f32 = 0.25;

    /// Map tile edge length (pixels)
    pub const TILE_SIZE: f32 = 26.0;
    /// Smallest grid the map will ever use in either direction
    pub const MIN_GRID_CELLS: usize = 6;
    /// Fraction of the viewport height covered by the map
    pub const MAP_HEIGHT_FRACTION: f32 = 0.70;
    /// Fill density used when no level has configured the map
    pub const DEFAULT_DENSITY: f64 = 0.16;
    pub const DEFAULT_TILE_HP: i32 = 2;
    /// Extra hit points on the bunker tile
    pub const BUNKER_HP_BONUS: i32 = 2;
    pub const DEFAULT_FLASH_PERIOD_SEC: u32 = 12;
    pub const DEFAULT_FLASH_DURATION_MS: u32 = 180;
    /// Tile damage dealt by special / normal shots
    pub const SPECIAL_TILE_DAMAGE: i32 = 3;
    pub const NORMAL_TILE_DAMAGE: i32 = 1;

    /// Player defaults
    pub const PLAYER_MARGIN: f32 = 12.0;
    pub const PLAYER_FIRE_INTERVAL: f32 = 0.12;
    pub const PLAYER_SPAWN_OFFSET_Y: f32 = 40.0;
    pub const PLAYER_HIT_RADIUS: f32 = 14.0;
    /// Invulnerability window after losing a life (seconds)
    pub const RESPAWN_INVULNERABILITY: f32 = 0.75;

    /// Projectiles
    pub const PLAYER_BULLET_SPEED: f32 = 480.0;
    pub const PLAYER_MUZZLE_OFFSET: f32 = 12.0;
    pub const SPECIAL_BULLET_SPEED: f32 = 380.0;
    pub const SPECIAL_BURST_COUNT: usize = 18;
    pub const ENEMY_BULLET_SPEED: f32 = 280.0;
    pub const ENEMY_BULLET_DAMAGE: i32 = 1;
    /// Bullets are culled this far beyond the viewport edges
    pub const CULL_MARGIN_X: f32 = 20.0;
    pub const CULL_MARGIN_Y: f32 = 40.0;

    /// Enemies
    pub const ENEMY_EDGE_MARGIN: f32 = 30.0;
    pub const ENEMY_HIT_RADIUS: f32 = 12.0;
    /// Boss horizontal speed when the recipe leaves it out (pixels/s)
    pub const BOSS_DEFAULT_SPEED: f32 = 60.0;
    pub const BOSS_HIT_RADIUS: f32 = 18.0;
    pub const SPECIAL_ENEMY_DAMAGE: i32 = 2;
    pub const NORMAL_ENEMY_DAMAGE: i32 = 1;

    /// Share of shots reported as hits when no hit was counted
    pub const HIT_ESTIMATE_RATIO: f64 = 0.25;
}

