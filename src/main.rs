//! Space Runner headless driver
//!
//! Plays one run with a simple autopilot and logs the outcome.
//!
//! Usage: `space-runner [settings.json] [profile.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use space_runner::audio::{Audio, AudioBackend, AudioError, GameSound, NullAudio, ThreadedAudio};
    use space_runner::persistence::{JsonPersistence, MemoryPersistence, Persistence};
    use space_runner::sim::{Category, Collaborators, Entity, SimulationController};
    use space_runner::visual::VisualMetadata;
    use space_runner::{Settings, SimError};

    /// Longest run before the driver gives up
    const MAX_RUN: Duration = Duration::from_secs(120);
    /// How far ahead of the ship the autopilot looks
    const LOOKAHEAD: f64 = 0.35;

    /// Logs sounds instead of playing them
    struct LogBackend;

    impl AudioBackend for LogBackend {
        fn play_to_end(&self, sound: GameSound) -> Result<(), AudioError> {
            log::info!("♪ {sound:?}");
            Ok(())
        }
    }

    /// Dodge obstacles ahead, drift toward coins otherwise
    fn autopilot(entities: &[Entity], visuals: &dyn VisualMetadata) -> (bool, bool) {
        let Some(ship) = entities.last() else {
            return (false, false);
        };
        let Ok(ship_size) = visuals.dimensions(ship.kind()) else {
            return (false, false);
        };
        let ship_center = ship.pos().y + ship_size.y / 2.0;
        let ahead = |e: &&Entity| {
            let dx = e.pos().x - ship.pos().x;
            (0.0..LOOKAHEAD).contains(&dx)
        };
        let center_of = |e: &Entity| {
            let h = visuals.dimensions(e.kind()).map_or(0.0, |s| s.y);
            e.pos().y + h / 2.0
        };

        let threat = entities
            .iter()
            .filter(|e| e.category() == Category::Obstacle)
            .filter(ahead)
            .find(|e| (center_of(e) - ship_center).abs() < ship_size.y * 1.5);
        if let Some(threat) = threat {
            let threat_center = center_of(threat);
            let near_top = ship.pos().y < ship_size.y;
            let near_bottom = ship.pos().y + ship_size.y > 1.0 - ship_size.y;
            let go_up = near_bottom || (threat_center > ship_center && !near_top);
            return (go_up, !go_up);
        }

        let target = entities
            .iter()
            .filter(|e| matches!(e.category(), Category::Coin | Category::PowerUp))
            .filter(ahead)
            .min_by(|a, b| a.pos().x.total_cmp(&b.pos().x));
        match target {
            Some(target) if center_of(target) < ship_center - 0.01 => (true, false),
            Some(target) if center_of(target) > ship_center + 0.01 => (false, true),
            _ => (false, false),
        }
    }

    pub fn run() -> Result<(), SimError> {
        let mut args = std::env::args().skip(1);
        let settings = args.next().map(Settings::load).unwrap_or_default();
        let persistence: Arc<dyn Persistence> = match args.next() {
            Some(path) => Arc::new(JsonPersistence::new(path)),
            None => Arc::new(MemoryPersistence::default()),
        };
        let audio: Arc<dyn Audio> = match ThreadedAudio::new(LogBackend) {
            Ok(audio) => Arc::new(audio),
            Err(e) => {
                log::warn!("Audio thread unavailable, running muted: {e}");
                Arc::new(NullAudio)
            }
        };
        let collaborators = Collaborators {
            audio,
            ..Collaborators::headless(Arc::clone(&persistence))
        };
        let visuals = Arc::clone(&collaborators.visuals);

        let mut sim = SimulationController::new(settings, collaborators);
        sim.initialize()?;
        let frame = Duration::from_secs_f64(1.0 / f64::from(sim.target_fps().max(1)));
        let started = Instant::now();

        while !sim.is_game_over() && started.elapsed() < MAX_RUN {
            let frame_start = Instant::now();
            let (up, down) = autopilot(&sim.entities(), visuals.as_ref());
            sim.process_frame(up, down)?;
            if let Some(sleep) = frame.checked_sub(frame_start.elapsed()) {
                thread::sleep(sleep);
            }
        }

        log::info!(
            "Run finished after {:.1}s: score {}, coins {}, game over: {}, fps {:?}",
            started.elapsed().as_secs_f64(),
            sim.score(),
            sim.collected_coins(),
            sim.is_game_over(),
            sim.measured_fps()
        );
        sim.terminate();

        match persistence.load_profile() {
            Ok(profile) => log::info!(
                "Profile: {} coins, high score {}",
                profile.coins,
                profile.high_score
            ),
            Err(e) => log::warn!("Unable to read profile: {e}"),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Space Runner (headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("Simulation failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation core is driven by the host page on wasm
}
