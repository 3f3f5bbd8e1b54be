//! Player profile and shop content

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::PersistenceError;

/// Purchasable shop items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentId {
    /// Double-coin power-ups last twice as long
    DoubleDurationCoinUpgrade,
    /// Power-ups spawn more often
    PowerUpChanceMultiplier,
    /// Cosmetic ship skins
    ShipSkinRed,
    ShipSkinGold,
}

/// A shop listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopContent {
    pub id: ContentId,
    pub title: String,
    pub price: u64,
}

/// The stock shop listings
pub fn shop_catalogue() -> Vec<ShopContent> {
    [
        (ContentId::DoubleDurationCoinUpgrade, "Double Coin Duration", 250),
        (ContentId::PowerUpChanceMultiplier, "Power-Up Magnet", 400),
        (ContentId::ShipSkinRed, "Red Ship", 100),
        (ContentId::ShipSkinGold, "Gold Ship", 1000),
    ]
    .into_iter()
    .map(|(id, title, price)| ShopContent {
        id,
        title: title.to_string(),
        price,
    })
    .collect()
}

/// Everything the player keeps between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub coins: u64,
    pub high_score: u64,
    pub audio_enabled: bool,
    /// Sound volume (0 - 100)
    pub volume: u8,
    /// Target frame rate for the host loop
    pub fps: u32,
    pub purchased: BTreeSet<ContentId>,
    pub active: BTreeSet<ContentId>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            coins: 0,
            high_score: 0,
            audio_enabled: true,
            volume: 100,
            fps: 60,
            purchased: BTreeSet::new(),
            active: BTreeSet::new(),
        }
    }
}

fn check_price(price: i64) -> Result<u64, PersistenceError> {
    u64::try_from(price)
        .map_err(|_| PersistenceError::InvalidArgument(format!("price must be 0 or greater, got {price}")))
}

impl PlayerProfile {
    /// Merge the result of a run; returns true on a new high score
    pub fn record_run(&mut self, coins: u64, score: u64) -> bool {
        self.coins = self.coins.saturating_add(coins);
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    pub fn has_enough_coins(&self, price: i64) -> Result<bool, PersistenceError> {
        Ok(self.coins >= check_price(price)?)
    }

    /// Coins still missing to afford `price` (0 if affordable)
    pub fn coins_needed_to_buy(&self, price: i64) -> Result<u64, PersistenceError> {
        Ok(check_price(price)?.saturating_sub(self.coins))
    }

    pub fn buy_content(&mut self, id: ContentId, price: i64) -> Result<(), PersistenceError> {
        let price = check_price(price)?;
        if self.coins < price {
            return Err(PersistenceError::InvalidArgument(format!(
                "not enough coins to buy {id:?}"
            )));
        }
        self.coins -= price;
        self.purchased.insert(id);
        Ok(())
    }

    /// Activate owned content
    pub fn activate_content(&mut self, id: ContentId) -> Result<(), PersistenceError> {
        if !self.purchased.contains(&id) {
            return Err(PersistenceError::InvalidArgument(format!(
                "{id:?} is not owned"
            )));
        }
        self.active.insert(id);
        Ok(())
    }

    pub fn deactivate_content(&mut self, id: ContentId) {
        self.active.remove(&id);
    }

    pub fn is_content_active(&self, id: ContentId) -> bool {
        self.active.contains(&id)
    }

    pub fn is_content_purchased(&self, id: ContentId) -> bool {
        self.purchased.contains(&id)
    }

    pub fn has_double_coin_duration(&self) -> bool {
        self.is_content_active(ContentId::DoubleDurationCoinUpgrade)
    }

    pub fn has_power_up_chance_multiplier(&self) -> bool {
        self.is_content_active(ContentId::PowerUpChanceMultiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_run_keeps_best_score() {
        let mut profile = PlayerProfile::default();
        assert!(profile.record_run(10, 500));
        assert!(!profile.record_run(5, 300));
        assert_eq!(profile.coins, 15);
        assert_eq!(profile.high_score, 500);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let mut profile = PlayerProfile::default();
        assert!(matches!(
            profile.coins_needed_to_buy(-1),
            Err(PersistenceError::InvalidArgument(_))
        ));
        assert!(profile.has_enough_coins(-5).is_err());
        assert!(profile.buy_content(ContentId::ShipSkinRed, -10).is_err());
    }

    #[test]
    fn test_buy_and_activate() {
        let mut profile = PlayerProfile {
            coins: 300,
            ..Default::default()
        };
        assert_eq!(profile.coins_needed_to_buy(400).unwrap(), 100);
        assert!(profile.activate_content(ContentId::DoubleDurationCoinUpgrade).is_err());

        profile.buy_content(ContentId::DoubleDurationCoinUpgrade, 250).unwrap();
        assert_eq!(profile.coins, 50);
        assert!(profile.is_content_purchased(ContentId::DoubleDurationCoinUpgrade));
        assert!(!profile.has_double_coin_duration());

        profile.activate_content(ContentId::DoubleDurationCoinUpgrade).unwrap();
        assert!(profile.has_double_coin_duration());
        profile.deactivate_content(ContentId::DoubleDurationCoinUpgrade);
        assert!(!profile.has_double_coin_duration());
    }

    #[test]
    fn test_buy_without_coins_fails() {
        let mut profile = PlayerProfile::default();
        assert!(profile.buy_content(ContentId::ShipSkinGold, 1000).is_err());
        assert!(!profile.is_content_purchased(ContentId::ShipSkinGold));
        assert_eq!(profile.coins, 0);
    }

    #[test]
    fn test_profile_json_shape() {
        let mut profile = PlayerProfile::default();
        profile.purchased.insert(ContentId::PowerUpChanceMultiplier);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("POWER_UP_CHANCE_MULTIPLIER"));

        let partial: PlayerProfile = serde_json::from_str(r#"{"coins": 7}"#).unwrap();
        assert_eq!(partial.coins, 7);
        assert!(partial.audio_enabled);
    }

    #[test]
    fn test_catalogue_has_upgrades() {
        let shop = shop_catalogue();
        assert!(shop.iter().any(|c| c.id == ContentId::DoubleDurationCoinUpgrade));
        assert!(shop.iter().any(|c| c.id == ContentId::PowerUpChanceMultiplier));
    }
}
