//! War types and their static rule table
//!
//! Every per-type difference the engine cares about lives in
//! [`WarTypePolicy`]: how many lives residents get, how kills are scored,
//! how sides are formed and which leadership roles cascade a whole group
//! out of the war when their holder dies for good.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of event war
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarType {
    Riot,
    CivilWar,
    TownWar,
    NationWar,
    WorldWar,
}

impl WarType {
    pub fn all() -> &'static [WarType] {
        &[
            WarType::Riot,
            WarType::CivilWar,
            WarType::TownWar,
            WarType::NationWar,
            WarType::WorldWar,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WarType::Riot => "Riot",
            WarType::CivilWar => "Civil War",
            WarType::TownWar => "Town War",
            WarType::NationWar => "Nation War",
            WarType::WorldWar => "World War",
        }
    }

    /// Built-in rules for this war type
    pub fn default_policy(&self) -> WarTypePolicy {
        match self {
            WarType::Riot => WarTypePolicy {
                lives: Lives::Finite(1),
                points_per_kill: 1,
                has_leader_death: false,
                side_model: SideModel::FreeSides,
                leader_tiers: Vec::new(),
                sweep_empty_town: false,
            },
            WarType::CivilWar => WarTypePolicy {
                lives: Lives::Finite(3),
                points_per_kill: 1,
                has_leader_death: true,
                side_model: SideModel::FreeSides,
                leader_tiers: vec![LeaderTier::Town],
                sweep_empty_town: true,
            },
            WarType::TownWar => WarTypePolicy {
                lives: Lives::Finite(3),
                points_per_kill: 1,
                has_leader_death: true,
                side_model: SideModel::Factions(FactionTier::Town),
                leader_tiers: vec![LeaderTier::Town],
                sweep_empty_town: true,
            },
            WarType::NationWar | WarType::WorldWar => WarTypePolicy {
                lives: Lives::Finite(3),
                points_per_kill: 1,
                has_leader_death: true,
                side_model: SideModel::Factions(FactionTier::Nation),
                leader_tiers: vec![LeaderTier::Nation, LeaderTier::Town],
                sweep_empty_town: true,
            },
        }
    }
}

impl fmt::Display for WarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lives a resident has in a war
///
/// Serialized as an integer, `-1` meaning unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Lives {
    Finite(u32),
    Unlimited,
}

impl Lives {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Lives::Unlimited)
    }

    /// Remaining count, `None` when lives are not tracked
    pub fn count(&self) -> Option<u32> {
        match self {
            Lives::Finite(n) => Some(*n),
            Lives::Unlimited => None,
        }
    }
}

impl From<Lives> for i64 {
    fn from(lives: Lives) -> i64 {
        match lives {
            Lives::Finite(n) => i64::from(n),
            Lives::Unlimited => -1,
        }
    }
}

impl TryFrom<i64> for Lives {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Lives::Unlimited),
            n if n >= 0 => u32::try_from(n)
                .map(Lives::Finite)
                .map_err(|_| format!("lives value {} is too large", n)),
            n => Err(format!("lives must be -1 (unlimited) or >= 0, got {}", n)),
        }
    }
}

/// The two free-form camps of a riot or civil war
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Government,
    Rebel,
}

/// Faction level that acts as a side in faction wars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactionTier {
    Town,
    Nation,
}

/// How a war divides its participants into sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideModel {
    /// Government vs rebels, assigned per participant
    FreeSides,
    /// Implicit sides from current faction membership
    Factions(FactionTier),
}

/// Leadership role whose final death removes the whole group it leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaderTier {
    /// Mayor of a town
    Town,
    /// King of a nation
    Nation,
}

/// Static rules for one war type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarTypePolicy {
    pub lives: Lives,
    /// 0 disables scoring
    pub points_per_kill: u32,
    pub has_leader_death: bool,
    pub side_model: SideModel,
    /// Leadership checks run on a final death, highest tier first
    pub leader_tiers: Vec<LeaderTier>,
    /// Remove a town once none of its residents remain in the war
    pub sweep_empty_town: bool,
}

impl WarTypePolicy {
    pub fn tracks_lives(&self) -> bool {
        !self.lives.is_unlimited()
    }

    pub fn scores_kills(&self) -> bool {
        self.points_per_kill > 0
    }
}

/// Tunable subset of a [`WarTypePolicy`], as read from settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarTypeOverride {
    #[serde(default)]
    pub lives: Option<Lives>,
    #[serde(default)]
    pub points_per_kill: Option<u32>,
    #[serde(default)]
    pub has_leader_death: Option<bool>,
}

impl WarTypeOverride {
    pub fn apply(&self, mut policy: WarTypePolicy) -> WarTypePolicy {
        if let Some(lives) = self.lives {
            policy.lives = lives;
        }
        if let Some(points) = self.points_per_kill {
            policy.points_per_kill = points;
        }
        if let Some(leader_death) = self.has_leader_death {
            policy.has_leader_death = leader_death;
        }
        policy
    }
}
