//! Group removal and the end-of-war check

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::error::{Result, WarError};
use crate::core::types::{ResidentId, TownId};
use crate::war::conflict::{Conflict, ConflictState, Contender, Group};
use crate::war::messages::{Audience, WarMessage};
use crate::war::services::{Messenger, Organization, WarTeardown};
use crate::war::war_type::{FactionTier, SideModel, WarType};

/// How a war finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarOutcome {
    pub war_name: String,
    pub war_type: WarType,
    /// Last party standing, `None` if nobody is left
    pub winner: Option<Contender>,
    pub survivors: Vec<ResidentId>,
}

/// What removing a group did
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalReport {
    pub group: Group,
    pub removed: Vec<ResidentId>,
    pub ended: Option<WarOutcome>,
}

/// Remove every participant belonging to `group`, then check whether the war is over
///
/// Safe to call repeatedly; residents already gone are skipped.
pub fn remove_group<H>(
    conflict: &mut Conflict,
    group: Group,
    opposing: Option<TownId>,
    host: &mut H,
) -> Result<RemovalReport>
where
    H: Organization + Messenger + WarTeardown + ?Sized,
{
    let removed = {
        let org: &H = &*host;
        conflict
            .participants
            .remove_where(|p| group.contains(p.resident, org))
    };

    if conflict.record_removed_group(group) {
        match opposing {
            Some(town) => tracing::info!(
                "{} removed from war '{}' by {} ({} residents)",
                group,
                conflict.name,
                town,
                removed.len()
            ),
            None => tracing::info!(
                "{} removed from war '{}' ({} residents)",
                group,
                conflict.name,
                removed.len()
            ),
        }
    } else {
        tracing::debug!("{} already removed from war '{}'", group, conflict.name);
    }

    let ended = check_end(conflict, host)?;
    Ok(RemovalReport { group, removed, ended })
}

/// Parties that still have at least one participant in the war
pub fn contenders<O: Organization + ?Sized>(conflict: &Conflict, org: &O) -> BTreeSet<Contender> {
    conflict
        .participants
        .iter()
        .filter_map(|p| match conflict.policy.side_model {
            SideModel::FreeSides => p.side.map(Contender::Side),
            SideModel::Factions(FactionTier::Town) => org.town_of(p.resident).map(Contender::Town),
            SideModel::Factions(FactionTier::Nation) => {
                let town = org.town_of(p.resident)?;
                Some(match org.nation_of(town) {
                    Some(nation) => Contender::Nation(nation),
                    None => Contender::Town(town),
                })
            }
        })
        .collect()
}

/// End the war once fewer than two opposing parties remain
///
/// Returns the outcome the first time the war ends, `None` otherwise.
pub fn check_end<H>(conflict: &mut Conflict, host: &mut H) -> Result<Option<WarOutcome>>
where
    H: Organization + Messenger + WarTeardown + ?Sized,
{
    if !conflict.is_active() {
        return Ok(None);
    }

    let standing = contenders(conflict, &*host);
    if standing.len() >= 2 {
        return Ok(None);
    }

    let winner = standing.into_iter().next();
    conflict.state = ConflictState::Ended { winner };
    let outcome = WarOutcome {
        war_name: conflict.name.clone(),
        war_type: conflict.war_type,
        winner,
        survivors: conflict.participants.residents(),
    };

    match winner {
        Some(w) => tracing::info!("War '{}' is over, {} won", conflict.name, w),
        None => tracing::info!("War '{}' is over with no one left standing", conflict.name),
    }

    host.conflict_ended(conflict.id, &outcome);
    host.broadcast(
        Audience::Conflict(conflict.id),
        &WarMessage::WarEnded {
            war_name: conflict.name.clone(),
            winner,
        },
    )
    .map_err(WarError::messenger)?;

    Ok(Some(outcome))
}
