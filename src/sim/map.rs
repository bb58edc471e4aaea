//! Destructible tile map hiding a single bunker
//!
//! The map is a grid of tiles sized from the viewport. `build` scatters
//! blocks over the interior to hit a target count, then turns one of them
//! into the bunker. The bunker flashes briefly once per cycle; the cycle can
//! be frozen (pause, end of match) and resumes in phase when unfrozen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::Bullet;
use super::rng::MapRng;
use crate::consts::*;
use crate::levels::LevelRecipe;
use crate::render::{Surface, palette};

/// Seed used when the map is built without level parameters
const DEFAULT_SEED: i32 = 123_456_789;
/// Folded into the level id to spread seeds of neighbouring levels
const SEED_MIX: u32 = 0x9e37_79b9;

/// Left/right border columns and top/bottom border rows kept empty
const BORDER_COLS: usize = 1;
const BORDER_ROWS: usize = 2;

/// A live block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub hp: i32,
    pub is_bunker: bool,
}

/// Outcome of a bullet against the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileHit {
    /// Outside the grid or over an empty cell
    Miss,
    /// The tile took damage and survived
    Absorbed,
    Destroyed,
    BunkerDestroyed,
}

/// Level-scoped generation parameters, already clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    pub target_blocks: i64,
    pub tile_hp: i32,
    pub flash_period_sec: u32,
    pub flash_duration_ms: u32,
    pub seed: i32,
}

impl MapConfig {
    /// Clamp raw level values into their supported ranges
    pub fn clamped(
        target_blocks: i64,
        tile_hp: i64,
        flash_period_sec: i64,
        flash_duration_ms: i64,
        seed: i32,
    ) -> Self {
        Self {
            target_blocks: target_blocks.clamp(0, 999_999),
            tile_hp: tile_hp.clamp(1, 999) as i32,
            flash_period_sec: flash_period_sec.clamp(1, 120) as u32,
            flash_duration_ms: flash_duration_ms.clamp(60, 2000) as u32,
            seed,
        }
    }

    /// Parameters for a level; `salt` varies the layout between plays
    pub fn from_recipe(recipe: &LevelRecipe, salt: u32) -> Self {
        let (period, duration) = recipe
            .bunker
            .as_ref()
            .map(|b| (b.flash_every_sec, b.flash_dur_ms))
            .unwrap_or((
                i64::from(DEFAULT_FLASH_PERIOD_SEC),
                i64::from(DEFAULT_FLASH_DURATION_MS),
            ));
        Self::clamped(
            recipe.map.destructible_blocks,
            recipe.map.tile_hp.unwrap_or(i64::from(DEFAULT_TILE_HP)),
            period,
            duration,
            (recipe.id ^ SEED_MIX ^ salt) as i32,
        )
    }
}

/// Tile grid, bunker location and flash cycle
#[derive(Debug, Clone)]
pub struct DestructibleMap {
    /// Grid size derived from the viewport (applied on the next build)
    columns: usize,
    rows: usize,
    /// Size of the currently built grid
    grid_cols: usize,
    grid_rows: usize,
    /// Row-major cells of the built grid
    tiles: Vec<Option<Tile>>,
    /// (row, col) of the bunker while it stands
    bunker: Option<(usize, usize)>,
    config: Option<MapConfig>,
    /// Start of the current flash cycle (ms)
    flash_anchor_ms: f64,
    flash_frozen: bool,
    freeze_start_ms: f64,
}

impl Default for DestructibleMap {
    fn default() -> Self {
        Self::new()
    }
}

impl DestructibleMap {
    pub fn new() -> Self {
        Self {
            columns: MIN_GRID_CELLS,
            rows: MIN_GRID_CELLS,
            grid_cols: 0,
            grid_rows: 0,
            tiles: Vec::new(),
            bunker: None,
            config: None,
            flash_anchor_ms: 0.0,
            flash_frozen: false,
            freeze_start_ms: 0.0,
        }
    }

    /// Adopt a level's generation parameters (the grid is left untouched)
    pub fn configure(&mut self, recipe: &LevelRecipe, salt: u32) {
        self.configure_with(MapConfig::from_recipe(recipe, salt));
    }

    pub fn configure_with(&mut self, config: MapConfig) {
        let config = MapConfig::clamped(
            config.target_blocks,
            i64::from(config.tile_hp),
            i64::from(config.flash_period_sec),
            i64::from(config.flash_duration_ms),
            config.seed,
        );
        log::debug!(
            "Map configured: target={} tile_hp={} flash={}s/{}ms seed={}",
            config.target_blocks,
            config.tile_hp,
            config.flash_period_sec,
            config.flash_duration_ms,
            config.seed
        );
        self.config = Some(config);
    }

    pub fn config(&self) -> Option<&MapConfig> {
        self.config.as_ref()
    }

    /// Recompute grid size from the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        let cols = (width / TILE_SIZE).floor();
        let rows = (height * MAP_HEIGHT_FRACTION / TILE_SIZE).floor();
        self.columns = to_cells(cols);
        self.rows = to_cells(rows);
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn tile_hp(&self) -> i32 {
        self.config.map_or(DEFAULT_TILE_HP, |c| c.tile_hp)
    }

    fn flash_period_ms(&self) -> f64 {
        f64::from(self.config.map_or(DEFAULT_FLASH_PERIOD_SEC, |c| c.flash_period_sec)) * 1000.0
    }

    fn flash_duration_ms(&self) -> f64 {
        f64::from(self.config.map_or(DEFAULT_FLASH_DURATION_MS, |c| c.flash_duration_ms))
    }

    /// Number of interior cells blocks may occupy at the current size
    pub fn usable_cells(&self) -> usize {
        self.columns.saturating_sub(2 * BORDER_COLS) * self.rows.saturating_sub(2 * BORDER_ROWS)
    }

    /// Regenerate every tile and place the bunker
    pub fn build(&mut self, now_ms: f64) {
        let cols = self.columns;
        let rows = self.rows;
        self.grid_cols = cols;
        self.grid_rows = rows;
        self.tiles = vec![None; cols * rows];
        self.bunker = None;

        let usable_cols = cols.saturating_sub(2 * BORDER_COLS);
        let usable_rows = rows.saturating_sub(2 * BORDER_ROWS);
        let total = usable_cols * usable_rows;

        let (target, seed) = match self.config {
            Some(c) => (c.target_blocks.clamp(0, total as i64) as usize, c.seed),
            None => (((total as f64) * DEFAULT_DENSITY).floor() as usize, DEFAULT_SEED),
        };
        let tile_hp = self.tile_hp();
        let fresh = Tile {
            hp: tile_hp,
            is_bunker: false,
        };
        let mut rng = MapRng::new(seed);

        let p = if total > 0 {
            target as f64 / total as f64
        } else {
            0.0
        };
        for r in BORDER_ROWS..rows.saturating_sub(BORDER_ROWS) {
            for c in BORDER_COLS..cols.saturating_sub(BORDER_COLS) {
                if rng.next() < p {
                    self.tiles[r * cols + c] = Some(fresh);
                }
            }
        }

        let mut count = self.block_count();
        if count < target {
            // Best effort: random empty cells, bounded attempts
            let mut deficit = target - count;
            let mut tries = deficit * 3 + 64;
            while deficit > 0 && tries > 0 {
                tries -= 1;
                let r = BORDER_ROWS + rng.index(usable_rows);
                let c = BORDER_COLS + rng.index(usable_cols);
                let cell = &mut self.tiles[r * cols + c];
                if cell.is_none() {
                    *cell = Some(fresh);
                    deficit -= 1;
                }
            }
            if deficit > 0 {
                log::warn!("Map fill fell short of target {} by {}", target, deficit);
            }
            count = target - deficit;
        } else if count > target {
            let mut occupied = self.occupied_cells();
            while count > target {
                let (r, c) = occupied.swap_remove(rng.index(occupied.len()));
                self.tiles[r * cols + c] = None;
                count -= 1;
            }
        }

        self.place_bunker(&mut rng, tile_hp);
        log::debug!(
            "Map built: {}x{} grid, {} blocks (target {}), bunker {:?}",
            cols,
            rows,
            count,
            target,
            self.bunker
        );

        self.flash_anchor_ms = now_ms;
        self.flash_frozen = false;
        self.freeze_start_ms = 0.0;
    }

    fn place_bunker(&mut self, rng: &mut MapRng, tile_hp: i32) {
        let candidates = self.occupied_cells();
        if candidates.is_empty() {
            log::warn!("No blocks generated; level has no bunker");
            return;
        }
        let (r, c) = candidates[rng.index(candidates.len())];
        if let Some(tile) = self.tiles[r * self.grid_cols + c].as_mut() {
            tile.is_bunker = true;
            tile.hp = tile_hp + BUNKER_HP_BONUS;
            self.bunker = Some((r, c));
        }
    }

    /// (row, col) of every live tile in row-major order
    fn occupied_cells(&self) -> Vec<(usize, usize)> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_some())
            .map(|(i, _)| (i / self.grid_cols, i % self.grid_cols))
            .collect()
    }

    /// Live tiles
    pub fn block_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        if row >= self.grid_rows || col >= self.grid_cols {
            return None;
        }
        self.tiles[row * self.grid_cols + col].as_ref()
    }

    /// Bunker position while it stands
    pub fn bunker(&self) -> Option<(usize, usize)> {
        self.bunker
    }

    /// Center of a cell in world coordinates
    pub fn tile_center(row: usize, col: usize) -> Vec2 {
        Vec2::new(
            col as f32 * TILE_SIZE + TILE_SIZE * 0.5,
            row as f32 * TILE_SIZE + TILE_SIZE * 0.5,
        )
    }

    /// Freeze or resume the flash cycle; repeated calls are no-ops
    pub fn set_flash_frozen(&mut self, frozen: bool, now_ms: f64) {
        if frozen {
            if !self.flash_frozen {
                self.flash_frozen = true;
                self.freeze_start_ms = now_ms;
            }
        } else if self.flash_frozen {
            // Shift the cycle so it resumes where it stopped
            self.flash_anchor_ms += now_ms - self.freeze_start_ms;
            self.flash_frozen = false;
            self.freeze_start_ms = 0.0;
        }
    }

    pub fn is_flash_frozen(&self) -> bool {
        self.flash_frozen
    }

    fn flash_elapsed(&self, now_ms: f64) -> f64 {
        let at = if self.flash_frozen {
            self.freeze_start_ms
        } else {
            now_ms
        };
        at - self.flash_anchor_ms
    }

    /// Whether the bunker is inside its highlight window
    pub fn is_flashing(&self, now_ms: f64) -> bool {
        self.flash_elapsed(now_ms) <= self.flash_duration_ms()
    }

    /// Start a new cycle once the period has run out (never while frozen)
    fn advance_flash(&mut self, now_ms: f64) {
        if !self.flash_frozen && self.flash_elapsed(now_ms) > self.flash_period_ms() {
            self.flash_anchor_ms = now_ms;
        }
    }

    /// Draw every live tile, highlighting the bunker during its flash
    pub fn render(&mut self, surface: &mut dyn Surface, now_ms: f64) {
        let flashing = self.is_flashing(now_ms);
        self.advance_flash(now_ms);

        let size = TILE_SIZE - 3.0;
        let extent = Vec2::splat(size);
        for (i, tile) in self.tiles.iter().enumerate() {
            let Some(tile) = tile else { continue };
            let center = Self::tile_center(i / self.grid_cols, i % self.grid_cols);
            let min = center - extent / 2.0;
            let fill = if tile.is_bunker && flashing {
                palette::BUNKER_FLASH
            } else {
                palette::TILE_FILL
            };
            surface.fill_rect(min, extent, fill);
            surface.stroke_rect(min, extent, palette::TILE_STROKE);
        }
    }

    /// Damage the tile under a bullet
    ///
    /// Any hit kills the bullet; a tile at or below zero hp is removed.
    pub fn apply_bullet_damage(&mut self, bullet: &mut Bullet, special: bool) -> TileHit {
        let c = (bullet.pos.x / TILE_SIZE).floor();
        let r = (bullet.pos.y / TILE_SIZE).floor();
        if !c.is_finite() || !r.is_finite() || c < 0.0 || r < 0.0 {
            return TileHit::Miss;
        }
        let (r, c) = (r as usize, c as usize);
        if r >= self.grid_rows || c >= self.grid_cols {
            return TileHit::Miss;
        }

        let idx = r * self.grid_cols + c;
        let Some(tile) = self.tiles[idx].as_mut() else {
            return TileHit::Miss;
        };

        tile.hp -= if special {
            SPECIAL_TILE_DAMAGE
        } else {
            NORMAL_TILE_DAMAGE
        };
        bullet.kill();

        if tile.hp > 0 {
            return TileHit::Absorbed;
        }
        let was_bunker = tile.is_bunker;
        self.tiles[idx] = None;
        if was_bunker {
            self.bunker = None;
            TileHit::BunkerDestroyed
        } else {
            TileHit::Destroyed
        }
    }
}

/// Floor a cell count at the minimum grid size
fn to_cells(n: f32) -> usize {
    if n.is_finite() && n > MIN_GRID_CELLS as f32 {
        n as usize
    } else {
        MIN_GRID_CELLS
    }
}
