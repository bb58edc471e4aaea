//! Level recipes and difficulty progression
//!
//! A small authored catalog covers the first levels. Past its end, recipes
//! are extrapolated from the last authored one by [`procedurally_scale`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_FLASH_DURATION_MS, DEFAULT_FLASH_PERIOD_SEC};
use crate::sim::EnemyKind;

/// Win-condition mode of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelMode {
    /// Clear every enemy
    Clear,
    /// Destroy the bunker (clearing enemies also wins)
    Hunt,
    /// Clearing enemies never wins, and neither does the bunker, which
    /// only counts in hunt mode: the level ends by timeout or death
    HuntOnlyBunker,
}

/// Player starting stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerStats {
    pub health: i32,
    pub lives: u32,
    pub specials: u32,
    /// Movement speed (pixels/s)
    pub speed: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            health: 100,
            lives: 3,
            specials: 1,
            speed: 260.0,
        }
    }
}

/// Destructible map generation parameters (clamped when applied)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapParams {
    /// Number of blocks the generator aims for
    pub destructible_blocks: i64,
    /// Hit points per block (map default when absent)
    pub tile_hp: Option<i64>,
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            destructible_blocks: 50,
            tile_hp: None,
        }
    }
}

/// Bunker flash hint parameters (clamped when applied)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BunkerParams {
    pub flash_every_sec: i64,
    pub flash_dur_ms: i64,
}

impl Default for BunkerParams {
    fn default() -> Self {
        Self {
            flash_every_sec: i64::from(DEFAULT_FLASH_PERIOD_SEC),
            flash_dur_ms: i64::from(DEFAULT_FLASH_DURATION_MS),
        }
    }
}

/// One group of identical enemies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyWave {
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub count: u32,
    pub hp: i32,
    /// Movement speed (100 when absent)
    pub speed: Option<f32>,
    /// Shots per second (never fires when absent)
    pub fire_rate: Option<f32>,
}

impl Default for EnemyWave {
    fn default() -> Self {
        Self {
            kind: EnemyKind::Drone,
            count: 6,
            hp: 1,
            speed: None,
            fire_rate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BossSpec {
    pub hp: i32,
    pub speed: Option<f32>,
    pub fire_rate: Option<f32>,
}

impl Default for BossSpec {
    fn default() -> Self {
        Self {
            hp: 25,
            speed: None,
            fire_rate: None,
        }
    }
}

/// Immutable template for one playthrough of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelRecipe {
    pub id: u32,
    pub name: String,
    /// Unset behaves like hunt for bunker victory and allows clear victory
    #[serde(default)]
    pub mode: Option<LevelMode>,
    #[serde(default = "default_time_limit")]
    pub time_limit_sec: f32,
    #[serde(default)]
    pub player: PlayerStats,
    #[serde(default)]
    pub map: MapParams,
    #[serde(default)]
    pub bunker: Option<BunkerParams>,
    #[serde(default)]
    pub enemies: Vec<EnemyWave>,
    #[serde(default)]
    pub boss: Option<BossSpec>,
}

fn default_time_limit() -> f32 {
    60.0
}

impl LevelRecipe {
    /// Whether destroying the bunker ends the level in victory
    pub fn bunker_wins(&self) -> bool {
        matches!(self.mode, None | Some(LevelMode::Hunt))
    }

    /// Whether clearing all enemies ends the level in victory
    pub fn clear_wins(&self) -> bool {
        self.mode != Some(LevelMode::HuntOnlyBunker)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("level catalog is empty")]
    Empty,
    #[error("failed to parse level catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read level catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Authored recipes plus extrapolation beyond them
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelRecipe>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelCatalog {
    /// Build a catalog; at least one recipe is required to extrapolate from
    pub fn new(levels: Vec<LevelRecipe>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of recipes
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let levels: Vec<LevelRecipe> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded {} authored levels", catalog.levels.len());
        Ok(catalog)
    }

    /// Number of authored levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn authored(&self) -> &[LevelRecipe] {
        &self.levels
    }

    /// Recipe for a 0-based level index, extrapolated past the authored list
    ///
    /// Always an independent copy.
    pub fn recipe(&self, index: usize) -> LevelRecipe {
        if let Some(level) = self.levels.get(index) {
            return level.clone();
        }
        let last = &self.levels[self.levels.len() - 1];
        let beyond = (index - self.levels.len() + 1) as u32;
        procedurally_scale(last, beyond)
    }

    /// The three authored levels
    pub fn builtin() -> Self {
        let player = PlayerStats::default();
        let levels = vec![
            LevelRecipe {
                id: 1,
                name: "Blockaded Port".into(),
                mode: Some(LevelMode::Hunt),
                time_limit_sec: 60.0,
                player: player.clone(),
                map: MapParams {
                    destructible_blocks: 45,
                    tile_hp: None,
                },
                bunker: Some(BunkerParams {
                    flash_every_sec: 12,
                    flash_dur_ms: 180,
                }),
                enemies: vec![
                    wave(EnemyKind::Drone, 12, 1, Some(120.0), None),
                    wave(EnemyKind::Shooter, 6, 2, Some(90.0), Some(1.5)),
                    wave(EnemyKind::Turret, 3, 4, None, Some(0.8)),
                ],
                boss: None,
            },
            LevelRecipe {
                id: 2,
                name: "Refinery".into(),
                mode: Some(LevelMode::Hunt),
                time_limit_sec: 65.0,
                player,
                map: MapParams {
                    destructible_blocks: 55,
                    tile_hp: None,
                },
                bunker: Some(BunkerParams {
                    flash_every_sec: 10,
                    flash_dur_ms: 180,
                }),
                enemies: vec![
                    wave(EnemyKind::Drone, 16, 1, Some(140.0), None),
                    wave(EnemyKind::Shooter, 8, 2, Some(110.0), Some(1.7)),
                    wave(EnemyKind::Turret, 4, 4, None, Some(1.0)),
                ],
                boss: None,
            },
            LevelRecipe {
                id: 3,
                name: "The Hard One's Bunker".into(),
                mode: Some(LevelMode::Hunt),
                time_limit_sec: 70.0,
                player: PlayerStats {
                    health: 100,
                    lives: 3,
                    specials: 2,
                    speed: 270.0,
                },
                map: MapParams {
                    destructible_blocks: 65,
                    tile_hp: None,
                },
                bunker: Some(BunkerParams {
                    flash_every_sec: 8,
                    flash_dur_ms: 200,
                }),
                enemies: vec![
                    wave(EnemyKind::Drone, 18, 1, Some(150.0), None),
                    wave(EnemyKind::Shooter, 10, 3, Some(120.0), Some(2.0)),
                    wave(EnemyKind::Turret, 5, 5, None, Some(1.2)),
                ],
                boss: Some(BossSpec {
                    hp: 30,
                    speed: Some(85.0),
                    fire_rate: Some(2.2),
                }),
            },
        ];
        Self { levels }
    }
}

fn wave(
    kind: EnemyKind,
    count: u32,
    hp: i32,
    speed: Option<f32>,
    fire_rate: Option<f32>,
) -> EnemyWave {
    EnemyWave {
        kind,
        count,
        hp,
        speed,
        fire_rate,
    }
}

/// Round to two decimals
fn round2(x: f64) -> f32 {
    ((x * 100.0).round() / 100.0) as f32
}

/// Extrapolate a recipe `beyond` levels past `base`
///
/// Enemies get more numerous, faster and trigger-happier, the map gets more
/// blocks, the clock loosens slightly, and the player slowly loses starting
/// health while gaining a little speed.
pub fn procedurally_scale(base: &LevelRecipe, beyond: u32) -> LevelRecipe {
    let k = f64::from(beyond);
    let k_enemies = 1.0 + k * 0.12;
    let k_speed = 1.0 + k * 0.06;
    let k_fire = 1.0 + k * 0.05;
    let k_blocks = 1.0 + k * 0.10;
    let k_boss = 1.0 + k * 0.15;

    let enemies = base
        .enemies
        .iter()
        .map(|e| EnemyWave {
            kind: e.kind,
            count: ((f64::from(e.count) * k_enemies).round() as u32).max(1),
            hp: e.hp,
            speed: Some((f64::from(e.speed.unwrap_or(100.0)) * k_speed).round() as f32),
            fire_rate: e.fire_rate.map(|r| round2(f64::from(r) * k_fire)),
        })
        .collect();

    let boss = base.boss.as_ref().map(|b| BossSpec {
        hp: (f64::from(b.hp) * k_boss).round() as i32,
        speed: Some((f64::from(b.speed.unwrap_or(85.0)) * k_speed).round() as f32),
        fire_rate: b.fire_rate.map(|r| round2(f64::from(r) * k_fire)),
    });

    let time_limit_sec =
        (f64::from(base.time_limit_sec) * (1.0 + k * 0.03)).round().clamp(40.0, 120.0) as f32;

    let health_drop = i32::try_from(beyond / 3).unwrap_or(i32::MAX).saturating_mul(5);
    let player = PlayerStats {
        health: base.player.health.saturating_sub(health_drop).clamp(60, 140),
        lives: base.player.lives,
        specials: base.player.specials,
        speed: (f64::from(base.player.speed) * (1.0 + (k * 0.01).min(0.15))).round() as f32,
    };

    let map = MapParams {
        destructible_blocks: (base.map.destructible_blocks as f64 * k_blocks).round() as i64,
        tile_hp: base.map.tile_hp,
    };

    LevelRecipe {
        id: base.id.saturating_add(beyond),
        name: format!("{} +{}", base.name, beyond),
        mode: Some(base.mode.unwrap_or(LevelMode::Hunt)),
        time_limit_sec,
        player,
        map,
        bunker: Some(base.bunker.clone().unwrap_or(BunkerParams {
            flash_every_sec: 8,
            flash_dur_ms: 200,
        })),
        enemies,
        boss,
    }
}
