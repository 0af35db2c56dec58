//! PVP eligibility between two war participants
//!
//! Riots and civil wars have free-form sides: friendly fire is off inside a
//! side and on across sides. Faction wars follow town diplomacy: only
//! enemies may fight.

use crate::core::error::{Result, WarError};
use crate::core::types::{ResidentId, TownBlockId};
use crate::war::conflict::{Conflict, WarRegistry};
use crate::war::services::{ConflictDirectory, Diplomacy, Organization};
use crate::war::war_type::SideModel;

/// Whether `attacker` may hurt `defender` inside `conflict`
///
/// Both residents must be enrolled in the war.
pub fn is_pvp_allowed<H>(
    attacker: ResidentId,
    defender: ResidentId,
    conflict: &Conflict,
    host: &H,
) -> Result<bool>
where
    H: Organization + Diplomacy + ?Sized,
{
    for resident in [attacker, defender] {
        if !conflict.is_enrolled(resident) {
            return Err(WarError::NotEnrolled {
                resident,
                conflict: conflict.id,
            });
        }
    }

    match conflict.policy.side_model {
        SideModel::FreeSides => {
            let attacker_side = conflict.participants.side_of(attacker);
            let defender_side = conflict.participants.side_of(defender);
            // Unassigned residents are on nobody's side
            Ok(attacker_side.is_none() || attacker_side != defender_side)
        }
        SideModel::Factions(_) => {
            let attacker_town = host.town_of(attacker).ok_or(WarError::NoTown(attacker))?;
            let defender_town = host.town_of(defender).ok_or(WarError::NoTown(defender))?;
            Ok(host.is_enemy(attacker_town, defender_town))
        }
    }
}

/// Whether a territory block is claimed by any running war
pub fn is_conflict_zone<D: ConflictDirectory + ?Sized>(block: &TownBlockId, directory: &D) -> bool {
    directory.is_conflict_zone(block)
}

/// PVP override for a territory block: forced on inside war zones, no opinion elsewhere
pub fn townblock_pvp_override<D: ConflictDirectory + ?Sized>(
    block: &TownBlockId,
    directory: &D,
) -> Option<bool> {
    if !directory.is_war_time() {
        return None;
    }
    is_conflict_zone(block, directory).then_some(true)
}

/// Friendly-fire verdict for a hit between two residents
///
/// `None` means the war engine has no say: no war running, one of them is
/// townless, one town is not at war, or they are not in the same war.
pub fn friendly_fire_verdict<H>(
    registry: &WarRegistry,
    attacker: ResidentId,
    defender: ResidentId,
    host: &H,
) -> Result<Option<bool>>
where
    H: Organization + Diplomacy + ConflictDirectory + ?Sized,
{
    if !host.is_war_time() {
        return Ok(None);
    }

    let (attacker_town, defender_town) = match (host.town_of(attacker), host.town_of(defender)) {
        (Some(a), Some(d)) => (a, d),
        _ => return Ok(None),
    };

    if !host.has_active_conflict(attacker_town) || !host.has_active_conflict(defender_town) {
        return Ok(None);
    }

    let conflict = match registry
        .shared_conflict(attacker, defender)
        .and_then(|id| registry.get(id))
    {
        Some(conflict) => conflict,
        None => return Ok(None),
    };

    let allowed = is_pvp_allowed(attacker, defender, conflict, host)?;
    tracing::debug!(
        "{} war '{}': {} vs {} pvp={}",
        conflict.war_type,
        conflict.name,
        attacker,
        defender,
        allowed
    );
    Ok(Some(allowed))
}
