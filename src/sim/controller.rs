//! Simulation controller
//!
//! Owns the live world and drives it one frame at a time. Two background
//! tasks run beside the frame path: the difficulty ramp (which also prunes
//! off-screen entities) and the power-up spawner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use rand_pcg::Pcg32;

use super::collision::collides;
use super::entities::EntitySet;
use super::entity::{Category, Entity, EntityId, ShipDirection};
use super::fps::FpsTracker;
use super::power_up::{ActivePowerUp, PowerUpManager, PowerUpUpgrades};
use super::preset::{PresetGenerator, PresetSpacing};
use super::scheduler::Scheduler;
use super::velocity::VelocityRegistry;
use crate::audio::{Audio, GameSound, NullAudio, game_over_sequence};
use crate::consts::*;
use crate::error::SimError;
use crate::persistence::{Persistence, PlayerProfile};
use crate::platform::{Clock, SystemClock};
use crate::scaled_reward;
use crate::settings::Settings;
use crate::visual::{DimensionTable, VisualMetadata};

/// RNG streams so subsystems sharing a seed stay independent
const POWER_UP_RNG_STREAM: u64 = 1;
const PRESET_RNG_STREAM: u64 = 2;

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Terminated,
}

/// External services the simulation consumes
#[derive(Clone)]
pub struct Collaborators {
    pub persistence: Arc<dyn Persistence>,
    pub visuals: Arc<dyn VisualMetadata>,
    pub audio: Arc<dyn Audio>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Standard sprite sizes, no sound, wall-clock time
    pub fn headless(persistence: Arc<dyn Persistence>) -> Self {
        Self {
            persistence,
            visuals: Arc::new(DimensionTable::standard()),
            audio: Arc::new(NullAudio),
            clock: Arc::new(SystemClock),
        }
    }
}

/// State shared with the background tasks
struct World {
    entities: EntitySet,
    velocities: VelocityRegistry,
    power_ups: Mutex<PowerUpManager>,
    paused: AtomicBool,
    visuals: Arc<dyn VisualMetadata>,
    clock: Arc<dyn Clock>,
    ramp_acceleration: f64,
}

impl World {
    fn new(settings: &Settings, upgrades: PowerUpUpgrades, collaborators: &Collaborators) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let velocities = VelocityRegistry::new();
        velocities.configure_defaults();
        Self {
            entities: EntitySet::new(),
            velocities,
            power_ups: Mutex::new(PowerUpManager::new(
                Pcg32::new(seed, POWER_UP_RNG_STREAM),
                upgrades,
                settings.spawn_chance(),
                settings.power_up_cooldown_ms,
            )),
            paused: AtomicBool::new(false),
            visuals: Arc::clone(&collaborators.visuals),
            clock: Arc::clone(&collaborators.clock),
            ramp_acceleration: settings.ramp_acceleration,
        }
    }

    fn power_ups(&self) -> MutexGuard<'_, PowerUpManager> {
        self.power_ups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Speed everything up and drop entities that left the screen
    fn run_difficulty_ramp(&self) {
        if self.is_paused() {
            return;
        }
        let k = self.ramp_acceleration;
        self.velocities.accelerate_all(-k, k);
        self.prune_off_screen();
    }

    fn prune_off_screen(&self) {
        let visuals = &self.visuals;
        let removed = self
            .entities
            .retain(|entity| match visuals.dimensions(entity.kind()) {
                Ok(size) => entity.pos().x + size.x >= 0.0,
                Err(err) => {
                    log::error!("{err}; removing entity {}", entity.id);
                    false
                }
            });
        log::debug!("Removed {removed} past entities");
    }

    fn run_power_up_spawn(&self) {
        if self.is_paused() {
            return;
        }
        let spawned = self.power_ups().generate(self.clock.now_ms());
        if let Some(pickup) = spawned {
            self.entities.insert(pickup);
        }
    }
}

/// Runs one game: frame processing, scoring, spawning and run end
pub struct SimulationController {
    settings: Settings,
    collaborators: Collaborators,
    lifecycle: Lifecycle,
    world: Arc<World>,
    scheduler: Scheduler,
    presets: PresetGenerator,
    spacing: PresetSpacing,
    ship: Entity,
    background: Entity,
    profile: PlayerProfile,
    score: u64,
    collected_coins: u64,
    game_over: bool,
    last_update_ms: Option<u64>,
    fps: FpsTracker,
}

impl SimulationController {
    pub fn new(settings: Settings, collaborators: Collaborators) -> Self {
        let world = Arc::new(World::new(
            &settings,
            PowerUpUpgrades::default(),
            &collaborators,
        ));
        let presets = PresetGenerator::new(Pcg32::new(0, PRESET_RNG_STREAM), false);
        let spacing = PresetSpacing::new(
            settings.initial_preset_distance,
            settings.preset_buffer_distance,
        );
        Self {
            settings,
            collaborators,
            lifecycle: Lifecycle::Uninitialized,
            world,
            scheduler: Scheduler::new(),
            presets,
            spacing,
            ship: Entity::ship(),
            background: Entity::background(),
            profile: PlayerProfile::default(),
            score: 0,
            collected_coins: 0,
            game_over: false,
            last_update_ms: None,
            fps: FpsTracker::new(),
        }
    }

    /// Reset every subsystem, load the profile and start the background tasks
    pub fn initialize(&mut self) -> Result<(), SimError> {
        self.scheduler.cancel();

        let persistence = &self.collaborators.persistence;
        self.profile = persistence.load_profile().unwrap_or_else(|e| {
            log::error!("Unable to load profile, using a fresh one: {e}");
            PlayerProfile::default()
        });
        let upgrades = PowerUpUpgrades {
            double_coin_duration: persistence.has_double_coin_duration(),
            spawn_chance_multiplier: persistence.has_power_up_chance_multiplier(),
        };

        let seed = self.settings.seed.unwrap_or_else(rand::random);
        self.world = Arc::new(World::new(&self.settings, upgrades, &self.collaborators));
        self.presets = PresetGenerator::new(
            Pcg32::new(seed, PRESET_RNG_STREAM),
            upgrades.double_coin_duration,
        );
        self.spacing = PresetSpacing::new(
            self.settings.initial_preset_distance,
            self.settings.preset_buffer_distance,
        );
        self.ship = Entity::ship();
        self.background = Entity::background();
        self.score = 0;
        self.collected_coins = 0;
        self.game_over = false;
        self.last_update_ms = None;
        self.fps = FpsTracker::new();

        let mut scheduler = Scheduler::new();
        let world = Arc::clone(&self.world);
        scheduler.schedule_at_fixed_rate("difficulty-ramp", self.settings.ramp_period(), move || {
            world.run_difficulty_ramp()
        })?;
        let world = Arc::clone(&self.world);
        scheduler.schedule_at_fixed_rate("power-up-spawner", self.settings.power_up_period(), move || {
            world.run_power_up_spawn()
        })?;
        self.scheduler = scheduler;

        self.lifecycle = Lifecycle::Initialized;
        log::info!(
            "Simulation initialized (coins {}, high score {})",
            self.profile.coins,
            self.profile.high_score
        );
        Ok(())
    }

    /// Stop the background tasks; frames fail until re-initialized
    pub fn terminate(&mut self) {
        self.scheduler.cancel();
        self.lifecycle = Lifecycle::Terminated;
        log::info!("Simulation terminated");
    }

    /// Advance the simulation by the wall-clock time since the last frame
    pub fn process_frame(&mut self, up_pressed: bool, down_pressed: bool) -> Result<(), SimError> {
        match self.lifecycle {
            Lifecycle::Uninitialized => {
                return Err(SimError::InvalidState(
                    "initialize must be called before processing frames",
                ));
            }
            Lifecycle::Terminated => {
                return Err(SimError::InvalidState(
                    "simulation was terminated; initialize it again to reuse it",
                ));
            }
            Lifecycle::Initialized => {}
        }

        let now = self.collaborators.clock.now_ms();
        let elapsed_ms = self.last_update_ms.map_or(0, |last| now.saturating_sub(last));
        self.fps.track(now);
        self.world.power_ups().tick(elapsed_ms);

        let result = if self.world.is_paused() || self.game_over {
            Ok(())
        } else {
            self.advance(up_pressed, down_pressed, elapsed_ms)
        };

        self.last_update_ms = Some(now);
        result
    }

    fn advance(&mut self, up_pressed: bool, down_pressed: bool, elapsed_ms: u64) -> Result<(), SimError> {
        let direction = match (up_pressed, down_pressed) {
            (true, false) => Some(ShipDirection::Up),
            (false, true) => Some(ShipDirection::Down),
            _ => None,
        };
        if let Some(direction) = direction {
            self.ship.steer(
                direction,
                elapsed_ms,
                &self.world.velocities,
                self.world.visuals.as_ref(),
            )?;
        }

        self.score += elapsed_ms / MS_PER_SCORE_POINT;

        if let Some(hit) = self.detect_collision() {
            self.handle_collision(hit);
            if self.game_over {
                return Ok(());
            }
        }

        if self.spacing.is_due() {
            let preset = self.presets.next();
            log::debug!("Spawning preset {}", preset.name);
            self.spacing.reset(preset.distance_until_next);
            self.world.entities.extend(preset.entities);
        }

        self.move_entities(elapsed_ms)
    }

    fn detect_collision(&self) -> Option<Entity> {
        let visuals = self.world.visuals.as_ref();
        self.world
            .entities
            .find(|entity| collides(&self.ship, entity, visuals))
    }

    fn handle_collision(&mut self, hit: Entity) {
        match hit.category() {
            Category::Obstacle => self.collide_with_obstacle(hit.id),
            Category::Coin => self.collide_with_coin(hit.id),
            Category::PowerUp => self.collide_with_power_up(hit.id),
            Category::Scenery => log::info!("Collision with unknown entity {:?}", hit.kind()),
        }
    }

    fn collide_with_obstacle(&mut self, id: EntityId) {
        let absorbed = self.world.power_ups().consume_shield();
        if absorbed {
            self.world.entities.remove(id);
            log::debug!("Shield absorbed obstacle {id}");
        } else {
            self.end_run();
        }
    }

    fn collide_with_coin(&mut self, id: EntityId) {
        if self.world.entities.remove(id).is_none() {
            return;
        }
        let multiplier = self.world.power_ups().coin_multiplier();
        self.collected_coins += scaled_reward(COIN_VALUE, multiplier);
        self.score += scaled_reward(COIN_SCORE, multiplier);
        self.play(GameSound::CoinPickup);
    }

    fn collide_with_power_up(&mut self, id: EntityId) {
        let Some(pickup) = self.world.entities.remove(id) else {
            return;
        };
        if let Some(kind) = self.world.power_ups().activate(&pickup) {
            log::debug!("Activated {kind:?}");
        }
        self.score += POWER_UP_SCORE;
        self.play(GameSound::PowerUpPickup);
    }

    fn move_entities(&mut self, elapsed_ms: u64) -> Result<(), SimError> {
        let world = &self.world;
        let visuals = world.visuals.as_ref();
        world
            .entities
            .try_for_each_mut(|entity| entity.advance(elapsed_ms, &world.velocities, visuals))?;
        self.background
            .advance(elapsed_ms, &world.velocities, visuals)?;
        self.spacing.advance(elapsed_ms);
        Ok(())
    }

    fn play(&self, sound: GameSound) {
        if !self.profile.audio_enabled {
            return;
        }
        if let Err(e) = self.collaborators.audio.play(sound) {
            log::warn!("Sound {sound:?} couldn't be played: {e}");
        }
    }

    /// Crash: stop background work, play the game-over sounds, save progress
    fn end_run(&mut self) {
        self.scheduler.cancel();
        self.game_over = true;
        log::info!(
            "Run over: score {}, coins {}",
            self.score,
            self.collected_coins
        );

        if self.profile.audio_enabled {
            if let Err(e) = self.collaborators.audio.play_sequence(game_over_sequence()) {
                log::warn!("Game over sounds couldn't be played: {e}");
            }
        }

        let grace = self.settings.game_over_grace();
        if !grace.is_zero() {
            thread::sleep(grace);
        }
        self.save_progress();
    }

    fn save_progress(&mut self) {
        let persistence = &self.collaborators.persistence;
        // Merge into the stored profile so shop changes made meanwhile survive
        let mut profile = persistence
            .load_profile()
            .unwrap_or_else(|_| self.profile.clone());
        if profile.record_run(self.collected_coins, self.score) {
            log::info!("New high score: {}", self.score);
        }
        if let Err(e) = persistence.save_profile(&profile) {
            log::error!("Unable to save profile: {e}");
        }
        self.profile = profile;
    }

    /// Spawn an entity into the live world
    pub fn spawn(&self, entity: Entity) -> EntityId {
        self.world.entities.insert(entity)
    }

    /// One difficulty ramp tick, as run by the background task
    pub fn run_difficulty_ramp(&self) {
        self.world.run_difficulty_ramp();
    }

    /// One power-up spawn attempt, as run by the background task
    pub fn run_power_up_spawn(&self) {
        self.world.run_power_up_spawn();
    }

    /// Everything to draw: background first, ship last
    pub fn entities(&self) -> Vec<Entity> {
        let mut all = Vec::with_capacity(self.world.entities.len() + 2);
        all.push(self.background.clone());
        all.extend(self.world.entities.snapshot());
        all.push(self.ship.clone());
        all
    }

    /// Live spawned entities only (no ship or background)
    pub fn live_entity_count(&self) -> usize {
        self.world.entities.len()
    }

    pub fn ship(&self) -> &Entity {
        &self.ship
    }

    pub fn velocities(&self) -> &VelocityRegistry {
        &self.world.velocities
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn collected_coins(&self) -> u64 {
        self.collected_coins
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_paused(&self) -> bool {
        self.world.is_paused()
    }

    pub fn set_paused(&self, paused: bool) {
        self.world.paused.store(paused, Ordering::SeqCst);
    }

    /// Flip between paused and running
    pub fn toggle_pause(&self) {
        self.world.paused.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn active_power_ups(&self) -> Vec<ActivePowerUp> {
        self.world.power_ups().active()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Frame rate the host loop should aim for
    pub fn target_fps(&self) -> u32 {
        self.profile.fps
    }

    /// Measured frame rate over the last window of frames
    pub fn measured_fps(&self) -> Option<f64> {
        self.fps.fps()
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }
}
