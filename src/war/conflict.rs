//! War instances and the registry of running wars

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::WarSettings;
use crate::core::error::{Result, WarError};
use crate::core::types::{ConflictId, NationId, ResidentId, TownId};
use crate::war::participants::ParticipantRegistry;
use crate::war::services::Organization;
use crate::war::war_type::{Side, SideModel, WarType, WarTypePolicy};

/// A faction that can be removed from a war as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Town(TownId),
    Nation(NationId),
}

impl Group {
    /// Whether the resident currently belongs to this group
    pub fn contains<O: Organization + ?Sized>(&self, resident: ResidentId, org: &O) -> bool {
        match self {
            Group::Town(town) => org.town_of(resident) == Some(*town),
            Group::Nation(nation) => org.nation_of_resident(resident) == Some(*nation),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Town(id) => write!(f, "{}", id),
            Group::Nation(id) => write!(f, "{}", id),
        }
    }
}

/// One of the opposing parties still standing in a war
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Contender {
    Side(Side),
    Town(TownId),
    Nation(NationId),
}

impl fmt::Display for Contender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contender::Side(Side::Government) => f.write_str("government"),
            Contender::Side(Side::Rebel) => f.write_str("rebels"),
            Contender::Town(id) => write!(f, "{}", id),
            Contender::Nation(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictState {
    Active,
    Ended { winner: Option<Contender> },
}

/// One running event war
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub id: ConflictId,
    pub name: String,
    pub war_type: WarType,
    /// Rules in force, fixed when the war starts
    pub policy: WarTypePolicy,
    pub participants: ParticipantRegistry,
    pub state: ConflictState,
    /// Groups cascaded out so far, each listed once
    pub removed_groups: Vec<Group>,
}

impl Conflict {
    pub fn new(name: impl Into<String>, war_type: WarType, policy: WarTypePolicy) -> Self {
        Self {
            id: ConflictId::new(),
            name: name.into(),
            war_type,
            policy,
            participants: ParticipantRegistry::new(),
            state: ConflictState::Active,
            removed_groups: Vec::new(),
        }
    }

    /// Start a war using the installation's rules for its type
    pub fn with_settings(name: impl Into<String>, war_type: WarType, settings: &WarSettings) -> Self {
        Self::new(name, war_type, settings.policy(war_type))
    }

    /// Enroll a resident with the starting lives of this war
    ///
    /// Riots and civil wars need a side for everyone; faction wars take
    /// none. A mismatch is refused like a duplicate enrolment.
    pub fn enroll(&mut self, resident: ResidentId, side: Option<Side>) -> bool {
        let side_fits = match self.policy.side_model {
            SideModel::FreeSides => side.is_some(),
            SideModel::Factions(_) => side.is_none(),
        };
        if !side_fits {
            tracing::debug!(
                "Refusing {} in {} '{}': side {:?} does not fit",
                resident,
                self.war_type,
                self.name,
                side
            );
            return false;
        }
        self.participants.enroll(resident, self.policy.lives, side)
    }

    pub fn is_active(&self) -> bool {
        self.state == ConflictState::Active
    }

    pub fn is_enrolled(&self, resident: ResidentId) -> bool {
        self.participants.contains(resident)
    }

    /// Record a removed group, returns false if it was already recorded
    pub(crate) fn record_removed_group(&mut self, group: Group) -> bool {
        if self.removed_groups.contains(&group) {
            return false;
        }
        self.removed_groups.push(group);
        true
    }
}

/// All wars known to the engine, addressed by explicit handle
///
/// A resident fights in at most one active war at a time; `insert` and
/// `enroll` refuse anything that would break that.
#[derive(Debug, Default)]
pub struct WarRegistry {
    conflicts: AHashMap<ConflictId, Conflict>,
}

impl WarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a war, refused if one of its participants already fights elsewhere
    pub fn insert(&mut self, conflict: Conflict) -> Result<ConflictId> {
        if conflict.is_active() {
            for resident in conflict.participants.residents() {
                if let Some(other) = self.conflict_of(resident) {
                    return Err(WarError::AlreadyFighting { resident, conflict: other });
                }
            }
        }
        let id = conflict.id;
        self.conflicts.insert(id, conflict);
        Ok(id)
    }

    /// Enroll a resident into a registered war
    ///
    /// Returns `Ok(false)` when the war is unknown or refuses the enrolment.
    pub fn enroll(&mut self, id: ConflictId, resident: ResidentId, side: Option<Side>) -> Result<bool> {
        if let Some(other) = self.conflict_of(resident) {
            if other != id {
                return Err(WarError::AlreadyFighting { resident, conflict: other });
            }
        }
        Ok(self
            .conflicts
            .get_mut(&id)
            .map_or(false, |war| war.enroll(resident, side)))
    }

    pub fn get(&self, id: ConflictId) -> Option<&Conflict> {
        self.conflicts.get(&id)
    }

    pub fn get_mut(&mut self, id: ConflictId) -> Option<&mut Conflict> {
        self.conflicts.get_mut(&id)
    }

    /// Active war the resident is still fighting in; there is at most one
    pub fn conflict_of(&self, resident: ResidentId) -> Option<ConflictId> {
        self.conflicts
            .values()
            .find(|c| c.is_active() && c.is_enrolled(resident))
            .map(|c| c.id)
    }

    /// Active war both residents are fighting in, if it is the same one
    pub fn shared_conflict(&self, a: ResidentId, b: ResidentId) -> Option<ConflictId> {
        let war = self.conflict_of(a)?;
        (self.conflict_of(b) == Some(war)).then_some(war)
    }

    /// Take ended wars out of the registry for archiving
    pub fn drain_ended(&mut self) -> Vec<Conflict> {
        let ended: Vec<ConflictId> = self
            .conflicts
            .values()
            .filter(|c| !c.is_active())
            .map(|c| c.id)
            .collect();
        ended
            .into_iter()
            .filter_map(|id| self.conflicts.remove(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::war::war_type::Lives;

    #[test]
    fn test_enroll_uses_policy_lives() {
        let mut war = Conflict::new("Border feud", WarType::TownWar, WarType::TownWar.default_policy());
        assert!(war.enroll(ResidentId(1), None));
        assert_eq!(war.participants.lives_of(ResidentId(1)), Some(Lives::Finite(3)));
    }

    #[test]
    fn test_record_removed_group_once() {
        let mut war = Conflict::new("x", WarType::TownWar, WarType::TownWar.default_policy());
        assert!(war.record_removed_group(Group::Town(TownId(1))));
        assert!(!war.record_removed_group(Group::Town(TownId(1))));
        assert_eq!(war.removed_groups.len(), 1);
    }

    #[test]
    fn test_shared_conflict_requires_same_war() {
        let mut registry = WarRegistry::new();
        let mut first = Conflict::new("a", WarType::Riot, WarType::Riot.default_policy());
        first.enroll(ResidentId(1), Some(Side::Government));
        first.enroll(ResidentId(2), Some(Side::Rebel));
        let mut second = Conflict::new("b", WarType::Riot, WarType::Riot.default_policy());
        second.enroll(ResidentId(3), Some(Side::Rebel));

        let first_id = registry.insert(first).unwrap();
        registry.insert(second).unwrap();

        assert_eq!(registry.shared_conflict(ResidentId(1), ResidentId(2)), Some(first_id));
        assert_eq!(registry.shared_conflict(ResidentId(1), ResidentId(3)), None);
        assert_eq!(registry.shared_conflict(ResidentId(1), ResidentId(99)), None);
    }

    #[test]
    fn test_drain_ended_leaves_active_wars() {
        let mut registry = WarRegistry::new();
        let mut over = Conflict::new("over", WarType::Riot, WarType::Riot.default_policy());
        over.state = ConflictState::Ended { winner: None };
        registry.insert(over).unwrap();
        registry
            .insert(Conflict::new("running", WarType::Riot, WarType::Riot.default_policy()))
            .unwrap();

        let drained = registry.drain_ended();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].name, "over");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_side_must_fit_war_type() {
        let mut riot = Conflict::new("Riot", WarType::Riot, WarType::Riot.default_policy());
        assert!(!riot.enroll(ResidentId(3), None));
        assert!(riot.enroll(ResidentId(1), Some(Side::Government)));

        let mut feud = Conflict::new("Feud", WarType::TownWar, WarType::TownWar.default_policy());
        assert!(!feud.enroll(ResidentId(1), Some(Side::Rebel)));
        assert!(feud.enroll(ResidentId(1), None));
    }

    #[test]
    fn test_one_active_war_per_resident() {
        let mut registry = WarRegistry::new();
        let mut first = Conflict::new("a", WarType::Riot, WarType::Riot.default_policy());
        first.enroll(ResidentId(1), Some(Side::Government));
        first.enroll(ResidentId(2), Some(Side::Rebel));
        let first_id = registry.insert(first).unwrap();

        let mut second = Conflict::new("b", WarType::Riot, WarType::Riot.default_policy());
        second.enroll(ResidentId(2), Some(Side::Government));
        second.enroll(ResidentId(3), Some(Side::Rebel));
        let err = registry.insert(second);
        assert!(matches!(
            err,
            Err(WarError::AlreadyFighting { resident: ResidentId(2), conflict }) if conflict == first_id
        ));
        assert_eq!(registry.len(), 1);

        let second_id = registry
            .insert(Conflict::new("c", WarType::Riot, WarType::Riot.default_policy()))
            .unwrap();
        assert!(matches!(
            registry.enroll(second_id, ResidentId(1), Some(Side::Rebel)),
            Err(WarError::AlreadyFighting { .. })
        ));
        assert!(registry.enroll(second_id, ResidentId(4), Some(Side::Rebel)).unwrap());
        assert!(!registry.enroll(first_id, ResidentId(1), Some(Side::Rebel)).unwrap());
        assert_eq!(registry.conflict_of(ResidentId(4)), Some(second_id));
    }

    #[test]
    fn test_ended_war_frees_its_residents() {
        let mut registry = WarRegistry::new();
        let mut over = Conflict::new("over", WarType::Riot, WarType::Riot.default_policy());
        over.enroll(ResidentId(1), Some(Side::Government));
        over.state = ConflictState::Ended { winner: None };
        registry.insert(over).unwrap();

        let mut next = Conflict::new("next", WarType::Riot, WarType::Riot.default_policy());
        next.enroll(ResidentId(1), Some(Side::Rebel));
        assert!(registry.insert(next).is_ok());
    }
}
