//! Profile stores

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::PersistenceError;
use super::profile::{ContentId, PlayerProfile};

/// Profile storage contract
pub trait Persistence: Send + Sync {
    fn load_profile(&self) -> Result<PlayerProfile, PersistenceError>;

    fn save_profile(&self, profile: &PlayerProfile) -> Result<(), PersistenceError>;

    /// Active double-coin duration upgrade (false if the profile is unreadable)
    fn has_double_coin_duration(&self) -> bool {
        self.load_profile()
            .map(|p| p.has_double_coin_duration())
            .unwrap_or(false)
    }

    /// Active power-up spawn chance upgrade (false if the profile is unreadable)
    fn has_power_up_chance_multiplier(&self) -> bool {
        self.load_profile()
            .map(|p| p.has_power_up_chance_multiplier())
            .unwrap_or(false)
    }

    fn buy_content(&self, id: ContentId, price: i64) -> Result<(), PersistenceError> {
        let mut profile = self.load_profile()?;
        profile.buy_content(id, price)?;
        self.save_profile(&profile)
    }

    fn activate_content(&self, id: ContentId) -> Result<(), PersistenceError> {
        let mut profile = self.load_profile()?;
        profile.activate_content(id)?;
        self.save_profile(&profile)
    }

    fn deactivate_content(&self, id: ContentId) -> Result<(), PersistenceError> {
        let mut profile = self.load_profile()?;
        profile.deactivate_content(id);
        self.save_profile(&profile)
    }
}

/// Profile stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for JsonPersistence {
    fn load_profile(&self) -> Result<PlayerProfile, PersistenceError> {
        if !self.path.exists() {
            log::info!("No profile at {}, starting fresh", self.path.display());
            return Ok(PlayerProfile::default());
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save_profile(&self, profile: &PlayerProfile) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(profile)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("Profile saved to {}", self.path.display());
        Ok(())
    }
}

/// Profile kept in memory
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    profile: Mutex<PlayerProfile>,
}

impl MemoryPersistence {
    pub fn new(profile: PlayerProfile) -> Self {
        Self {
            profile: Mutex::new(profile),
        }
    }

    /// Current stored profile
    pub fn profile(&self) -> PlayerProfile {
        self.profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Persistence for MemoryPersistence {
    fn load_profile(&self) -> Result<PlayerProfile, PersistenceError> {
        Ok(self.profile())
    }

    fn save_profile(&self, profile: &PlayerProfile) -> Result<(), PersistenceError> {
        *self.profile.lock().unwrap_or_else(PoisonError::into_inner) = profile.clone();
        Ok(())
    }
}
