//! Lives and elimination
//!
//! A kill costs the victim one life. Losing the last life removes the
//! victim from the war, and depending on the war type that removal can
//! cascade: a fallen king takes the nation out, a fallen mayor takes the
//! town out, and a town with nobody left fighting is swept out too.

use crate::core::error::{Result, WarError};
use crate::core::types::{Location, ResidentId};
use crate::war::conflict::{Conflict, Group};
use crate::war::messages::{Audience, WarMessage};
use crate::war::participants::LifeLoss;
use crate::war::services::{Messenger, Organization, Scoreboard, WarTeardown};
use crate::war::termination::{check_end, remove_group, RemovalReport, WarOutcome};
use crate::war::war_type::LeaderTier;

/// How an elimination spread beyond the victim
#[derive(Debug, Clone, PartialEq)]
pub enum EliminationCascade {
    /// The victim led a group and the whole group left the war
    LeaderDeath { tier: LeaderTier, removal: RemovalReport },
    /// Only the victim left; their town may have been swept out after them
    Individual {
        town_swept: Option<RemovalReport>,
        ended: Option<WarOutcome>,
    },
}

/// Everything one kill did to the victim's standing
#[derive(Debug, Clone, PartialEq)]
pub struct KillReport {
    /// `None` when the war does not track lives
    pub lives_before: Option<u32>,
    pub lives_after: Option<u32>,
    pub eliminated: bool,
    pub cascade: Option<EliminationCascade>,
    pub points_awarded: u32,
}

/// Apply a kill of `victim` by `killer`
///
/// The victim must still be enrolled; callers check both combatants share
/// the war before invoking this.
pub fn on_lethal_kill<H>(
    conflict: &mut Conflict,
    victim: ResidentId,
    killer: ResidentId,
    location: Option<&Location>,
    host: &mut H,
) -> Result<KillReport>
where
    H: Organization + Messenger + Scoreboard + WarTeardown + ?Sized,
{
    if !conflict.is_enrolled(victim) {
        return Err(WarError::NotEnrolled {
            resident: victim,
            conflict: conflict.id,
        });
    }

    let lives_before = conflict.participants.lives_of(victim).and_then(|l| l.count());
    let mut report = KillReport {
        lives_before,
        lives_after: lives_before,
        eliminated: false,
        cascade: None,
        points_awarded: 0,
    };

    if conflict.policy.tracks_lives() {
        match conflict.participants.take_life(victim) {
            Some(LifeLoss::LastLife) => {
                report.lives_after = Some(0);
                report.eliminated = true;
                report.cascade = Some(eliminate(conflict, victim, killer, host)?);
            }
            Some(LifeLoss::Survived { before, remaining }) => {
                tracing::debug!(
                    "{} lost a life in '{}' ({} -> {})",
                    victim,
                    conflict.name,
                    before,
                    remaining
                );
                report.lives_after = Some(remaining);
            }
            Some(LifeLoss::Untracked) | None => {}
        }
    }

    if conflict.policy.scores_kills() {
        let points = conflict.policy.points_per_kill;
        host.kill_scored(victim, killer, points, location);
        report.points_awarded = points;
    }

    Ok(report)
}

/// Role the victim holds at a leadership tier, as the group it leads
fn led_group<O: Organization + ?Sized>(
    tier: LeaderTier,
    victim: ResidentId,
    org: &O,
) -> Option<(Group, WarMessage)> {
    match tier {
        LeaderTier::Nation if org.is_king(victim) => {
            let nation = org.nation_of_resident(victim)?;
            Some((Group::Nation(nation), WarMessage::KingKilled { nation }))
        }
        LeaderTier::Town if org.is_mayor(victim) => {
            let town = org.town_of(victim)?;
            Some((Group::Town(town), WarMessage::MayorKilled { town }))
        }
        _ => None,
    }
}

fn eliminate<H>(
    conflict: &mut Conflict,
    victim: ResidentId,
    killer: ResidentId,
    host: &mut H,
) -> Result<EliminationCascade>
where
    H: Organization + Messenger + WarTeardown + ?Sized,
{
    let killer_town = host.town_of(killer);
    let victim_town = host.town_of(victim);

    // Highest tier first; the first leadership cascade ends the check
    if conflict.policy.has_leader_death {
        let tiers = conflict.policy.leader_tiers.clone();
        for tier in tiers {
            if let Some((group, message)) = led_group(tier, victim, &*host) {
                tracing::info!("Leader {} of {} fell in '{}'", victim, group, conflict.name);
                host.broadcast(Audience::Conflict(conflict.id), &message)
                    .map_err(WarError::messenger)?;
                let removal = remove_group(conflict, group, killer_town, host)?;
                return Ok(EliminationCascade::LeaderDeath { tier, removal });
            }
        }
    }

    tracing::info!("{} ran out of lives and left '{}'", victim, conflict.name);
    host.broadcast(
        Audience::Conflict(conflict.id),
        &WarMessage::ResidentEliminated {
            resident: victim,
            war_name: conflict.name.clone(),
        },
    )
    .map_err(WarError::messenger)?;
    conflict.participants.remove(victim);

    if conflict.policy.sweep_empty_town {
        if let Some(town) = victim_town {
            let town_still_fighting = conflict
                .participants
                .iter()
                .any(|p| host.town_of(p.resident) == Some(town));
            if !town_still_fighting {
                let removal = remove_group(conflict, Group::Town(town), killer_town, host)?;
                return Ok(EliminationCascade::Individual {
                    town_swept: Some(removal),
                    ended: None,
                });
            }
        }
    }

    let ended = check_end(conflict, host)?;
    Ok(EliminationCascade::Individual {
        town_swept: None,
        ended,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{NationId, TownId};
    use crate::war::conflict::ConflictState;
    use crate::war::memory::MemoryHost;
    use crate::war::war_type::{Lives, Side, WarType, WarTypePolicy};

    fn policy(war_type: WarType, lives: Lives) -> WarTypePolicy {
        WarTypePolicy {
            lives,
            ..war_type.default_policy()
        }
    }

    #[test]
    fn test_life_lost_without_elimination() {
        let mut host = MemoryHost::new();
        let mut war = Conflict::new("Riot", WarType::Riot, policy(WarType::Riot, Lives::Finite(3)));
        war.enroll(ResidentId(1), Some(Side::Government));
        war.enroll(ResidentId(2), Some(Side::Rebel));

        let report = on_lethal_kill(&mut war, ResidentId(2), ResidentId(1), None, &mut host).unwrap();

        assert_eq!(report.lives_before, Some(3));
        assert_eq!(report.lives_after, Some(2));
        assert!(!report.eliminated);
        assert!(report.cascade.is_none());
        assert!(host.broadcasts.is_empty());
    }

    #[test]
    fn test_kill_on_unenrolled_victim_is_reported() {
        let mut host = MemoryHost::new();
        let mut war = Conflict::new("Riot", WarType::Riot, WarType::Riot.default_policy());
        war.enroll(ResidentId(1), Some(Side::Government));

        let err = on_lethal_kill(&mut war, ResidentId(7), ResidentId(1), None, &mut host);
        assert!(matches!(err, Err(WarError::NotEnrolled { .. })));
        assert!(host.scores.is_empty());
    }

    #[test]
    fn test_scoring_uses_policy_points() {
        let mut host = MemoryHost::new();
        let mut war_policy = policy(WarType::Riot, Lives::Finite(5));
        war_policy.points_per_kill = 4;
        let mut war = Conflict::new("Riot", WarType::Riot, war_policy);
        war.enroll(ResidentId(1), Some(Side::Government));
        war.enroll(ResidentId(2), Some(Side::Rebel));
        let spot = Location::new("world", 1.0, 64.0, -3.0);

        let report = on_lethal_kill(&mut war, ResidentId(2), ResidentId(1), Some(&spot), &mut host).unwrap();

        assert_eq!(report.points_awarded, 4);
        assert_eq!(host.scores.len(), 1);
        assert_eq!(host.scores[0].location, Some(spot));
    }

    #[test]
    fn test_zero_points_disables_scoring() {
        let mut host = MemoryHost::new();
        let mut war_policy = policy(WarType::Riot, Lives::Finite(5));
        war_policy.points_per_kill = 0;
        let mut war = Conflict::new("Riot", WarType::Riot, war_policy);
        war.enroll(ResidentId(1), Some(Side::Government));
        war.enroll(ResidentId(2), Some(Side::Rebel));

        on_lethal_kill(&mut war, ResidentId(2), ResidentId(1), None, &mut host).unwrap();
        assert!(host.scores.is_empty());
    }

    #[test]
    fn test_last_member_sweeps_town() {
        let mut host = MemoryHost::new();
        for town in 1..=3 {
            host.add_town(TownId(town), None, 0.0);
        }
        host.add_resident(ResidentId(1), Some(TownId(1)), 0.0);
        host.add_resident(ResidentId(2), Some(TownId(2)), 0.0);
        host.add_resident(ResidentId(3), Some(TownId(3)), 0.0);

        let mut war = Conflict::new("Feud", WarType::TownWar, policy(WarType::TownWar, Lives::Finite(1)));
        for r in 1..=3 {
            war.enroll(ResidentId(r), None);
        }

        let report = on_lethal_kill(&mut war, ResidentId(2), ResidentId(1), None, &mut host).unwrap();

        match report.cascade {
            Some(EliminationCascade::Individual { town_swept: Some(removal), .. }) => {
                assert_eq!(removal.group, Group::Town(TownId(2)));
                assert!(removal.ended.is_none());
            }
            other => panic!("expected town sweep, got {:?}", other),
        }
        assert_eq!(war.removed_groups, vec![Group::Town(TownId(2))]);
        assert!(war.is_active());
    }

    #[test]
    fn test_king_death_short_circuits_mayor_check() {
        let mut host = MemoryHost::new();
        host.add_town(TownId(1), Some(NationId(10)), 0.0);
        host.add_town(TownId(2), Some(NationId(10)), 0.0);
        host.add_town(TownId(3), Some(NationId(20)), 0.0);
        host.add_town(TownId(4), Some(NationId(30)), 0.0);
        // King is also mayor of the capital
        host.add_resident(ResidentId(1), Some(TownId(1)), 0.0);
        host.make_king(ResidentId(1));
        host.make_mayor(ResidentId(1));
        host.add_resident(ResidentId(2), Some(TownId(2)), 0.0);
        host.add_resident(ResidentId(3), Some(TownId(3)), 0.0);
        host.add_resident(ResidentId(4), Some(TownId(4)), 0.0);

        let mut war = Conflict::new("Great war", WarType::NationWar, policy(WarType::NationWar, Lives::Finite(1)));
        for r in 1..=4 {
            war.enroll(ResidentId(r), None);
        }

        let report = on_lethal_kill(&mut war, ResidentId(1), ResidentId(3), None, &mut host).unwrap();

        match report.cascade {
            Some(EliminationCascade::LeaderDeath { tier, removal }) => {
                assert_eq!(tier, LeaderTier::Nation);
                assert_eq!(removal.removed, vec![ResidentId(2)]);
            }
            other => panic!("expected leader death, got {:?}", other),
        }
        assert_eq!(war.removed_groups, vec![Group::Nation(NationId(10))]);
        assert_eq!(host.broadcasts_with_key("msg_war_king_killed").len(), 1);
        assert!(host.broadcasts_with_key("msg_war_mayor_killed").is_empty());
        assert_eq!(war.participants.residents(), vec![ResidentId(3), ResidentId(4)]);
    }

    #[test]
    fn test_leader_death_disabled_removes_only_victim() {
        let mut host = MemoryHost::new();
        host.add_town(TownId(1), None, 0.0);
        host.add_town(TownId(2), None, 0.0);
        for (r, t) in [(1, 1), (2, 1), (3, 2)] {
            host.add_resident(ResidentId(r), Some(TownId(t)), 0.0);
        }
        host.make_mayor(ResidentId(1));

        let mut war_policy = policy(WarType::TownWar, Lives::Finite(1));
        war_policy.has_leader_death = false;
        let mut war = Conflict::new("Feud", WarType::TownWar, war_policy);
        for r in 1..=3 {
            war.enroll(ResidentId(r), None);
        }

        on_lethal_kill(&mut war, ResidentId(1), ResidentId(3), None, &mut host).unwrap();

        assert_eq!(war.participants.residents(), vec![ResidentId(2), ResidentId(3)]);
        assert_eq!(war.state, ConflictState::Active);
        assert_eq!(
            host.broadcasts_with_key("msg_resident_has_run_out_of_lives_and_is_eliminated_from_the_war").len(),
            1
        );
    }

    #[test]
    fn test_messenger_failure_keeps_life_taken() {
        let mut host = MemoryHost::new();
        let mut war = Conflict::new("Riot", WarType::Riot, policy(WarType::Riot, Lives::Finite(1)));
        war.enroll(ResidentId(1), Some(Side::Government));
        war.enroll(ResidentId(2), Some(Side::Rebel));
        war.enroll(ResidentId(3), Some(Side::Rebel));
        host.fail_messages = true;

        let err = on_lethal_kill(&mut war, ResidentId(2), ResidentId(1), None, &mut host);

        assert!(matches!(err, Err(WarError::Collaborator { service: "messenger", .. })));
        assert!(!war.is_enrolled(ResidentId(2)));
        assert!(war.is_active());

        // Lives not at stake means nothing to announce
        let mut riot = Conflict::new("Riot", WarType::Riot, policy(WarType::Riot, Lives::Finite(3)));
        riot.enroll(ResidentId(1), Some(Side::Government));
        riot.enroll(ResidentId(2), Some(Side::Rebel));
        let report = on_lethal_kill(&mut riot, ResidentId(2), ResidentId(1), None, &mut host).unwrap();
        assert_eq!(report.lives_after, Some(2));
    }
}
