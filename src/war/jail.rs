//! Prisoner-of-war jailing

use serde::{Deserialize, Serialize};

use crate::core::config::WarSettings;
use crate::core::error::{Result, WarError};
use crate::core::types::{JailId, ResidentId};
use crate::war::messages::{Audience, WarMessage};
use crate::war::services::{ConflictDirectory, Diplomacy, JailReason, Jailer, Messenger, Organization};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JailOutcome {
    /// Victim and killer are not enemy townsfolk (e.g. a riot)
    NotApplicable,
    Jailed(JailId),
    /// Every jail of the killer's town has fallen out of the war
    NoJailAvailable,
}

/// Send a killed enemy to one of the killer town's jails that is still in the war
///
/// The primary jail is tried first.
pub fn attempt_jailing<H>(
    victim: ResidentId,
    killer: ResidentId,
    settings: &WarSettings,
    host: &mut H,
) -> Result<JailOutcome>
where
    H: Organization + Diplomacy + ConflictDirectory + Jailer + Messenger + ?Sized,
{
    let (victim_town, killer_town) = match (host.town_of(victim), host.town_of(killer)) {
        (Some(v), Some(k)) => (v, k),
        _ => return Ok(JailOutcome::NotApplicable),
    };

    if !host.is_enemy(killer_town, victim_town) {
        return Ok(JailOutcome::NotApplicable);
    }

    let primary = host.primary_jail(killer_town);
    let mut candidates: Vec<_> = primary.iter().cloned().collect();
    candidates.extend(
        host.jails(killer_town)
            .into_iter()
            .filter(|jail| primary.as_ref().map_or(true, |p| p.id != jail.id)),
    );

    let hours = settings.jail.prisoner_of_war_hours;
    for jail in candidates {
        if !host.is_conflict_zone(&jail.town_block) {
            continue;
        }
        if host.attempt_assign(victim, &jail, hours, JailReason::PrisonerOfWar, killer) {
            tracing::info!("{} jailed by {} as prisoner of war for {}h", victim, killer_town, hours);
            return Ok(JailOutcome::Jailed(jail.id));
        }
    }

    tracing::warn!("{} has no jail left in the war to hold {}", killer_town, victim);
    host.broadcast(Audience::Town(killer_town), &WarMessage::CantBeJailedPlotFallen)
        .map_err(WarError::messenger)?;
    Ok(JailOutcome::NoJailAvailable)
}
