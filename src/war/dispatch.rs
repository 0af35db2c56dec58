//! Entry points the host calls when one resident kills another

use serde::{Deserialize, Serialize};

use crate::core::config::WarSettings;
use crate::core::error::Result;
use crate::core::types::{ConflictId, Location, ResidentId};
use crate::war::conflict::WarRegistry;
use crate::war::economy::{on_war_death, DeathPayment};
use crate::war::elimination::{on_lethal_kill, KillReport};
use crate::war::jail::{attempt_jailing, JailOutcome};
use crate::war::services::WarHost;

/// A resident killed by another resident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillOccurrence {
    pub victim: ResidentId,
    pub killer: ResidentId,
    #[serde(default)]
    pub location: Option<Location>,
}

/// Everything the war engine did about one kill
#[derive(Debug, Clone, PartialEq)]
pub struct KillResolution {
    pub conflict: ConflictId,
    pub kill: KillReport,
    /// `None` when war economics are disabled
    pub payment: Option<DeathPayment>,
    /// `None` when jailing is disabled
    pub jail: Option<JailOutcome>,
}

/// Resolve a kill: lives and cascades, then death payment, then jailing
///
/// Returns `None` when the two residents are not fighting the same war.
pub fn on_player_killed_player<H: WarHost + ?Sized>(
    registry: &mut WarRegistry,
    occurrence: &KillOccurrence,
    settings: &WarSettings,
    host: &mut H,
) -> Result<Option<KillResolution>> {
    let KillOccurrence { victim, killer, location } = occurrence;

    let conflict = match registry
        .shared_conflict(*killer, *victim)
        .and_then(|id| registry.get_mut(id))
    {
        Some(conflict) => conflict,
        None => return Ok(None),
    };

    tracing::debug!("{} killed {} in '{}'", killer, victim, conflict.name);

    let kill = on_lethal_kill(conflict, *victim, *killer, location.as_ref(), host)?;

    let payment = if settings.economy.enabled {
        Some(on_war_death(conflict, *victim, *killer, settings, host)?)
    } else {
        None
    };

    let jail = if settings.jail.enabled {
        Some(attempt_jailing(*victim, *killer, settings, host)?)
    } else {
        None
    };

    Ok(Some(KillResolution {
        conflict: conflict.id,
        kill,
        payment,
        jail,
    }))
}

/// Whether the host's ordinary death price must be skipped for this death
///
/// Residents who share a war pay the war price instead.
pub fn cancels_default_death_price(
    registry: &WarRegistry,
    victim: ResidentId,
    killer: Option<ResidentId>,
    pvp_death: bool,
) -> bool {
    if !pvp_death {
        return false;
    }
    match killer {
        Some(killer) => registry.shared_conflict(victim, killer).is_some(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TownId;
    use crate::war::conflict::Conflict;
    use crate::war::memory::MemoryHost;
    use crate::war::war_type::{Side, WarType};

    fn riot_registry() -> WarRegistry {
        let mut registry = WarRegistry::new();
        let mut war = Conflict::new("Riot", WarType::Riot, WarType::Riot.default_policy());
        war.enroll(ResidentId(1), Some(Side::Government));
        war.enroll(ResidentId(2), Some(Side::Rebel));
        war.enroll(ResidentId(3), Some(Side::Rebel));
        registry.insert(war).unwrap();
        registry
    }

    #[test]
    fn test_unrelated_residents_are_ignored() {
        let mut registry = riot_registry();
        let mut host = MemoryHost::new();
        let occurrence = KillOccurrence {
            victim: ResidentId(1),
            killer: ResidentId(50),
            location: None,
        };

        let result =
            on_player_killed_player(&mut registry, &occurrence, &WarSettings::default(), &mut host).unwrap();
        assert!(result.is_none());
        assert!(host.scores.is_empty());
    }

    #[test]
    fn test_economy_can_be_disabled() {
        let mut registry = riot_registry();
        let mut host = MemoryHost::new();
        host.add_town(TownId(1), None, 0.0);
        for r in 1..=3 {
            host.add_resident(ResidentId(r), Some(TownId(1)), 500.0);
        }
        let mut settings = WarSettings::default();
        settings.economy.enabled = false;

        let occurrence = KillOccurrence {
            victim: ResidentId(3),
            killer: ResidentId(1),
            location: None,
        };
        let resolution = on_player_killed_player(&mut registry, &occurrence, &settings, &mut host)
            .unwrap()
            .unwrap();

        assert!(resolution.payment.is_none());
        assert!(resolution.jail.is_none());
        assert!(resolution.kill.eliminated);
        assert!(host.transfers.is_empty());
    }

    #[test]
    fn test_default_death_price_cancelled_only_inside_war() {
        let registry = riot_registry();
        assert!(cancels_default_death_price(&registry, ResidentId(1), Some(ResidentId(2)), true));
        assert!(!cancels_default_death_price(&registry, ResidentId(1), Some(ResidentId(2)), false));
        assert!(!cancels_default_death_price(&registry, ResidentId(1), Some(ResidentId(77)), true));
        assert!(!cancels_default_death_price(&registry, ResidentId(1), None, true));
    }
}
