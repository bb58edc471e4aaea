//! Bunker Hunt headless driver
//!
//! Plays levels with a scripted pilot on a simulated 60 Hz clock and prints
//! every finish event to stdout as one JSON line.
//!
//! Usage: `bunker-hunt [settings.json] [levels.json] [levels_to_clear]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io;

    use bunker_hunt::consts::PLAYER_MARGIN;
    use bunker_hunt::render::RecordingSurface;
    use bunker_hunt::report::JsonLineReporter;
    use bunker_hunt::{FrameInput, GamePhase, LevelCatalog, Settings, SimulationEngine};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Tries per level before the run gives up
    const MAX_ATTEMPTS: u32 = 3;
    /// Frames between special bursts
    const SPECIAL_EVERY: u64 = 600;

    /// Sweeps side to side along the bottom, firing nonstop
    #[derive(Debug, Default)]
    struct Pilot {
        heading_right: bool,
        frames: u64,
    }

    impl Pilot {
        fn steer(&mut self, engine: &SimulationEngine) -> FrameInput {
            self.frames += 1;
            let world = &engine.world;
            let x = world.player.pos.x;
            if x <= PLAYER_MARGIN + 1.0 {
                self.heading_right = true;
            } else if x >= world.viewport.x - PLAYER_MARGIN - 1.0 {
                self.heading_right = false;
            }

            FrameInput {
                left: !self.heading_right,
                right: self.heading_right,
                fire: true,
                special: self.frames % SPECIAL_EVERY == 0,
                ..Default::default()
            }
        }
    }

    pub fn run() {
        env_logger::init();

        let args: Vec<String> = std::env::args().skip(1).collect();
        let settings = args.first().map(Settings::load).unwrap_or_default();
        let catalog = match args.get(1) {
            Some(path) => LevelCatalog::load(path).unwrap_or_else(|e| {
                log::error!("{e}; using built-in levels");
                LevelCatalog::builtin()
            }),
            None => LevelCatalog::builtin(),
        };
        let to_clear: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(3);

        log::info!(
            "Bunker Hunt (headless) starting: {}x{}, {} authored levels",
            settings.viewport_width,
            settings.viewport_height,
            catalog.len()
        );

        let mut engine = SimulationEngine::new(settings, catalog);
        let mut surface = RecordingSurface::new();
        let mut pilot = Pilot::default();
        let mut now = 0.0;
        let mut attempts = 1;
        let mut cleared = 0;

        engine.start(JsonLineReporter::new(io::stdout()), now);
        while cleared < to_clear {
            now += FRAME_MS;
            let input = pilot.steer(&engine);
            surface.reset();
            engine.frame(now, &input, &mut surface);

            match engine.phase() {
                GamePhase::Victory => {
                    cleared += 1;
                    attempts = 1;
                    if cleared < to_clear {
                        engine.next_level();
                    }
                }
                GamePhase::GameOver => {
                    if attempts >= MAX_ATTEMPTS {
                        log::info!(
                            "Giving up on level {} after {} attempts",
                            engine.level_index() + 1,
                            attempts
                        );
                        break;
                    }
                    attempts += 1;
                    engine.restart_level();
                }
                _ => {}
            }
        }
        engine.stop();

        log::info!(
            "Cleared {} of {} levels in {:.1}s of simulated time",
            cleared,
            to_clear,
            now / 1000.0
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; there is no wasm binary
}
