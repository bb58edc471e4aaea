//! Level lifecycle and frame loop
//!
//! The engine owns the world for the loaded level and drives it one frame at
//! a time: pause handling, the world update, the level clock and the finish
//! protocol. Time comes in as millisecond instants from the host's frame
//! callback; nothing reads a clock behind its back.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entities::Entity;
use super::state::{FrameInput, GamePhase, World};
use super::tick::update_world;
use crate::consts::*;
use crate::levels::{LevelCatalog, LevelRecipe};
use crate::render::{HudInfo, Surface, draw_background, draw_hud};
use crate::report::{FinishEvent, FinishReason, FinishReporter, MatchStats};
use crate::settings::Settings;

pub struct SimulationEngine {
    /// Simulated state of the loaded level
    pub world: World,
    settings: Settings,
    catalog: LevelCatalog,
    phase: GamePhase,
    level_index: usize,
    level: Option<LevelRecipe>,
    /// Seconds of play on the level clock
    elapsed: f32,
    /// Seconds until the next pause toggle is honored
    pause_cooldown: f32,
    /// A finish event went out for the loaded level
    finished: bool,
    world_frozen: bool,
    running: bool,
    now_ms: f64,
    last_frame_ms: Option<f64>,
    spawn_rng: Pcg32,
    reporter: Option<Box<dyn FinishReporter>>,
    last_finish: Option<FinishEvent>,
}

impl SimulationEngine {
    pub fn new(settings: Settings, catalog: LevelCatalog) -> Self {
        let viewport = Vec2::new(settings.viewport_width, settings.viewport_height);
        let spawn_rng = Pcg32::seed_from_u64(settings.spawn_seed());
        Self {
            world: World::new(viewport),
            settings,
            catalog,
            phase: GamePhase::Menu,
            level_index: 0,
            level: None,
            elapsed: 0.0,
            pause_cooldown: 0.0,
            finished: false,
            world_frozen: false,
            running: false,
            now_ms: 0.0,
            last_frame_ms: None,
            spawn_rng,
            reporter: None,
            last_finish: None,
        }
    }

    /// New drawing area size; the grid follows on the next level load
    pub fn resize(&mut self, width: f32, height: f32) {
        self.settings.viewport_width = width;
        self.settings.viewport_height = height;
        self.world.resize(Vec2::new(width, height));
    }

    /// Register the finish reporter and start accepting frames
    ///
    /// Loads the first level when nothing is loaded yet.
    pub fn start(&mut self, reporter: impl FinishReporter + 'static, now_ms: f64) {
        self.reporter = Some(Box::new(reporter));
        self.running = true;
        self.now_ms = now_ms;
        self.last_frame_ms = Some(now_ms);
        if self.level.is_none() {
            self.load_level(0);
        }
        log::info!("Engine started");
    }

    /// Stop accepting frames; state is kept as is
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Engine stopped");
        }
        self.running = false;
        self.last_frame_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Load (or reload) a level by 0-based index and start playing it
    pub fn load_level(&mut self, index: usize) {
        let recipe = self.catalog.recipe(index);
        log::info!(
            "Loading level {} \"{}\" ({:?}, {}s)",
            index + 1,
            recipe.name,
            recipe.mode,
            recipe.time_limit_sec
        );

        self.world.reset_for_level(&recipe, &mut self.spawn_rng);
        self.world.map.configure(&recipe, self.settings.seed_salt());
        self.world.map.build(self.now_ms);

        self.level_index = index;
        self.level = Some(recipe);
        self.elapsed = 0.0;
        self.pause_cooldown = 0.0;
        self.finished = false;
        self.world_frozen = false;
        self.last_finish = None;
        self.phase = GamePhase::Playing;
    }

    /// Play the current level again
    pub fn restart_level(&mut self) {
        self.load_level(self.level_index);
    }

    pub fn next_level(&mut self) {
        self.load_level(self.level_index + 1);
    }

    /// Flip between playing and paused; ignored in any other phase
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.phase = GamePhase::Paused;
                self.world.map.set_flash_frozen(true, self.now_ms);
                log::debug!("Paused at {:.2}s", self.elapsed);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Playing;
                self.world.map.set_flash_frozen(false, self.now_ms);
                log::debug!("Resumed");
            }
            _ => {}
        }
    }

    /// Advance one frame and draw it
    pub fn frame(&mut self, now_ms: f64, input: &FrameInput, surface: &mut dyn Surface) {
        if !self.running {
            return;
        }
        self.tick(now_ms, input);
        self.render(surface);
    }

    /// Advance the simulation to `now_ms` without drawing
    ///
    /// Does nothing while the engine is stopped.
    pub fn tick(&mut self, now_ms: f64, input: &FrameInput) {
        if !self.running {
            return;
        }
        let last = self.last_frame_ms.unwrap_or(now_ms);
        let dt = (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT);
        self.last_frame_ms = Some(now_ms);
        self.now_ms = now_ms;

        self.pause_cooldown = (self.pause_cooldown - dt).max(0.0);
        if input.pause
            && self.pause_cooldown <= 0.0
            && matches!(self.phase, GamePhase::Playing | GamePhase::Paused)
        {
            self.toggle_pause();
            self.pause_cooldown = PAUSE_DEBOUNCE;
        }

        let player = &mut self.world.player;
        player.invulnerable = (player.invulnerable - dt).max(0.0);

        if self.phase != GamePhase::Playing || self.world_frozen {
            return;
        }
        let Some(recipe) = &self.level else {
            return;
        };
        if let Some(outcome) = update_world(&mut self.world, recipe, input, dt) {
            self.finish(outcome.victory, outcome.reason);
            return;
        }

        self.elapsed += dt;
        if self.elapsed >= self.time_limit() {
            self.finish(false, FinishReason::Timeout);
        }
    }

    /// End the loaded level and report it
    ///
    /// Only the first call per level load has any effect, and only while a
    /// level is being played or paused. Reporter errors are logged and
    /// otherwise ignored.
    pub fn finish(&mut self, victory: bool, reason: FinishReason) {
        if self.finished {
            log::debug!("Ignoring repeated finish ({reason:?})");
            return;
        }
        if self.level.is_none() || !matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            log::debug!("Ignoring finish ({reason:?}) with no level in play");
            return;
        }
        self.finished = true;
        self.world_frozen = true;
        self.phase = if victory {
            GamePhase::Victory
        } else {
            GamePhase::GameOver
        };
        self.world.map.set_flash_frozen(true, self.now_ms);

        let stats = MatchStats::finalize(
            self.world.shots_fired,
            self.world.hits,
            self.elapsed.min(self.time_limit()),
        );
        let event = FinishEvent {
            victory,
            reason,
            stats,
        };
        log::info!(
            "Level {} finished: victory={} reason={:?} shots={} hits={} elapsed={}ms",
            self.level_index + 1,
            victory,
            reason,
            stats.shots,
            stats.hits,
            stats.elapsed_ms
        );

        if let Some(reporter) = self.reporter.as_mut() {
            if let Err(e) = reporter.report(&event) {
                log::error!("Finish report failed: {e}");
            }
        }
        self.last_finish = Some(event);
    }

    /// Draw the current frame, frozen or not
    pub fn render(&mut self, surface: &mut dyn Surface) {
        let viewport = self.world.viewport;
        draw_background(surface, viewport.x, viewport.y, self.settings.show_grid);
        self.world.map.render(surface, self.now_ms);

        for bullet in &self.world.bullets {
            bullet.draw(surface);
        }
        for enemy in &self.world.enemies {
            enemy.draw(surface);
        }
        self.world.player.draw(surface);

        if self.settings.show_hud && self.level.is_some() {
            let player = &self.world.player;
            let hud = HudInfo {
                health: player.health,
                max_health: player.max_health,
                lives: player.lives,
                specials: player.specials,
                level_number: self.level_index + 1,
                elapsed_sec: self.elapsed,
                time_limit_sec: self.time_limit(),
                banner: self.phase.banner(),
            };
            draw_hud(surface, &hud, viewport.x);
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// 0-based index of the loaded level
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level(&self) -> Option<&LevelRecipe> {
        self.level.as_ref()
    }

    /// Seconds on the level clock
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn time_limit(&self) -> f32 {
        self.level.as_ref().map_or(0.0, |l| l.time_limit_sec)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The event sent for the loaded level, if it has ended
    pub fn last_finish(&self) -> Option<&FinishEvent> {
        self.last_finish.as_ref()
    }
}
