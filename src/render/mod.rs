//! Abstract 2D drawing surface
//!
//! The simulation never talks to a concrete canvas or GPU. Each frame is
//! drawn through [`Surface`]; a host backs it with whatever it renders to.
//! [`RecordingSurface`] keeps the draw calls as data (headless runs, tests).

use glam::Vec2;

use crate::consts::TILE_SIZE;

/// Linear RGBA color
pub type Color = [f32; 4];

/// Fixed palette
pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = [0.035, 0.071, 0.141, 1.0];
    pub const GRID: Color = [1.0, 1.0, 1.0, 0.05];
    pub const TILE_FILL: Color = [0.106, 0.165, 0.298, 1.0];
    pub const TILE_STROKE: Color = [0.059, 0.102, 0.204, 1.0];
    /// Bunker tile during its flash window
    pub const BUNKER_FLASH: Color = [0.212, 0.886, 0.478, 1.0];
    pub const PLAYER: Color = [0.482, 0.820, 1.0, 1.0];
    pub const ENEMY: Color = [0.612, 1.0, 0.584, 1.0];
    pub const BOSS: Color = [1.0, 0.690, 0.333, 1.0];
    pub const HEALTH_BAR_BACK: Color = [0.0, 0.0, 0.0, 0.35];
    pub const HEALTH_BAR: Color = [1.0, 1.0, 1.0, 1.0];
    pub const PLAYER_BULLET: Color = [1.0, 1.0, 1.0, 1.0];
    pub const SPECIAL_BULLET: Color = [0.490, 1.0, 0.745, 1.0];
    pub const ENEMY_BULLET: Color = [1.0, 0.416, 0.416, 1.0];
    pub const HUD_TEXT: Color = [1.0, 1.0, 1.0, 1.0];
}

/// Drawing primitives the core needs from a host
pub trait Surface {
    /// Fill the whole `width x height` area
    fn clear(&mut self, width: f32, height: f32, color: Color);
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    fn stroke_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color);
    fn line(&mut self, from: Vec2, to: Vec2, color: Color);
    fn text(&mut self, pos: Vec2, text: &str, color: Color);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { width: f32, height: f32, color: Color },
    FillRect { min: Vec2, size: Vec2, color: Color },
    StrokeRect { min: Vec2, size: Vec2, color: Color },
    FillCircle { center: Vec2, radius: f32, color: Color },
    FillTriangle { points: [Vec2; 3], color: Color },
    Line { from: Vec2, to: Vec2, color: Color },
    Text { pos: Vec2, text: String, color: Color },
}

/// Surface that stores every draw call in order
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop recorded commands (call between frames)
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// All text drawn this frame
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of filled rects drawn with exactly `color`
    pub fn count_filled_rects(&self, color: Color) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { color: col, .. } if *col == color))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f32, height: f32, color: Color) {
        self.commands.push(DrawCommand::Clear { width, height, color });
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillRect { min, size, color });
    }

    fn stroke_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::StrokeRect { min, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillTriangle { points: [a, b, c], color });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    fn text(&mut self, pos: Vec2, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_string(),
            color,
        });
    }
}

/// Background fill plus a faint grid at tile pitch
pub fn draw_background(surface: &mut dyn Surface, width: f32, height: f32, show_grid: bool) {
    surface.clear(width, height, palette::BACKGROUND);
    if !show_grid {
        return;
    }

    let mut x = 0.0;
    while x < width {
        surface.line(Vec2::new(x, 0.0), Vec2::new(x, height), palette::GRID);
        x += TILE_SIZE;
    }
    let mut y = 0.0;
    while y < height {
        surface.line(Vec2::new(0.0, y), Vec2::new(width, y), palette::GRID);
        y += TILE_SIZE;
    }
}

/// Values shown in the heads-up display
#[derive(Debug, Clone)]
pub struct HudInfo {
    pub health: i32,
    pub max_health: i32,
    pub lives: u32,
    pub specials: u32,
    /// 1-based level number
    pub level_number: usize,
    pub elapsed_sec: f32,
    pub time_limit_sec: f32,
    /// Centered banner (paused / victory / game over)
    pub banner: Option<&'static str>,
}

/// Two status lines in the top-left corner and an optional banner
pub fn draw_hud(surface: &mut dyn Surface, hud: &HudInfo, width: f32) {
    surface.text(
        Vec2::new(8.0, 14.0),
        &format!(
            "HP: {}/{}  L: {}  Spc: {}",
            hud.health, hud.max_health, hud.lives, hud.specials
        ),
        palette::HUD_TEXT,
    );
    surface.text(
        Vec2::new(8.0, 28.0),
        &format!(
            "Lvl {}  Time: {} / {}",
            hud.level_number,
            hud.elapsed_sec.floor() as i64,
            hud.time_limit_sec
        ),
        palette::HUD_TEXT,
    );
    if let Some(banner) = hud.banner {
        let half = banner.len() as f32 * 3.5;
        surface.text(Vec2::new(width / 2.0 - half, 24.0), banner, palette::HUD_TEXT);
    }
}
