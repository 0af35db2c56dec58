//! War settings with documented defaults
//!
//! Everything an installation can tune about event wars is collected here.
//! Settings are read from TOML; every section is optional and falls back
//! to the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, WarError};
use crate::war::war_type::{Lives, WarType, WarTypeOverride, WarTypePolicy};

/// Death payment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    /// Whether wars charge their own death price
    ///
    /// When enabled, the host's ordinary death price is suppressed for
    /// residents who share a war and the war price is charged instead.
    pub enabled: bool,

    /// Flat amount a resident pays the killer on a war death
    ///
    /// Whatever the victim cannot cover is drawn from the victim's town
    /// bank. A town that cannot cover the rest is removed from the war.
    pub wartime_death_price: f64,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            wartime_death_price: 1000.0,
        }
    }
}

/// Prisoner-of-war jailing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JailSettings {
    /// Whether killed enemies are sent to the attacker town's jail
    pub enabled: bool,

    /// Sentence length for prisoners of war, in hours
    pub prisoner_of_war_hours: u32,
}

impl Default for JailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            prisoner_of_war_hours: 72,
        }
    }
}

/// Per-war-type tweaks on top of the built-in rule table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarTypeSettings {
    pub riot: Option<WarTypeOverride>,
    pub civilwar: Option<WarTypeOverride>,
    pub townwar: Option<WarTypeOverride>,
    pub nationwar: Option<WarTypeOverride>,
    pub worldwar: Option<WarTypeOverride>,
}

impl WarTypeSettings {
    pub fn get(&self, war_type: WarType) -> Option<&WarTypeOverride> {
        match war_type {
            WarType::Riot => self.riot.as_ref(),
            WarType::CivilWar => self.civilwar.as_ref(),
            WarType::TownWar => self.townwar.as_ref(),
            WarType::NationWar => self.nationwar.as_ref(),
            WarType::WorldWar => self.worldwar.as_ref(),
        }
    }

    pub fn set(&mut self, war_type: WarType, tweak: WarTypeOverride) {
        let slot = match war_type {
            WarType::Riot => &mut self.riot,
            WarType::CivilWar => &mut self.civilwar,
            WarType::TownWar => &mut self.townwar,
            WarType::NationWar => &mut self.nationwar,
            WarType::WorldWar => &mut self.worldwar,
        };
        *slot = Some(tweak);
    }
}

/// Complete war configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarSettings {
    pub economy: EconomySettings,
    pub jail: JailSettings,
    pub war_types: WarTypeSettings,
}

impl WarSettings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from TOML text and validate them
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: WarSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded war settings from {}", path.display());
        Ok(settings)
    }

    /// Effective rules for a war type, tweaks applied
    pub fn policy(&self, war_type: WarType) -> WarTypePolicy {
        let base = war_type.default_policy();
        match self.war_types.get(war_type) {
            Some(tweak) => tweak.apply(base),
            None => base,
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let price = self.economy.wartime_death_price;
        if !price.is_finite() || price < 0.0 {
            return Err(WarError::InvalidSettings(format!(
                "wartime_death_price must be a finite non-negative amount, got {}",
                price
            )));
        }

        if self.jail.enabled && self.jail.prisoner_of_war_hours == 0 {
            return Err(WarError::InvalidSettings(
                "prisoner_of_war_hours must be positive when jailing is enabled".into(),
            ));
        }

        for &war_type in WarType::all() {
            if self.policy(war_type).lives == Lives::Finite(0) {
                return Err(WarError::InvalidSettings(format!(
                    "{} lives must be positive or -1 for unlimited",
                    war_type
                )));
            }
        }

        Ok(())
    }
}
