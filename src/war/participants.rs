//! Participant registry - who is still fighting a war, on which side, with how many lives

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::ResidentId;
use crate::war::war_type::{Lives, Side};

/// A resident enrolled in a war
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub resident: ResidentId,
    /// Lives left; never `Finite(0)` while registered
    pub lives: Lives,
    /// Camp in riots and civil wars, `None` in faction wars
    pub side: Option<Side>,
}

/// Result of taking one life from a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeLoss {
    /// Lives are not tracked in this war
    Untracked,
    /// Participant still has lives left
    Survived { before: u32, remaining: u32 },
    /// That was the last life; the participant has been removed
    LastLife,
}

impl LifeLoss {
    pub fn is_last_life(&self) -> bool {
        matches!(self, LifeLoss::LastLife)
    }
}

/// Residents currently taking part in one war
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantRegistry {
    participants: AHashMap<ResidentId, Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enroll a resident, returns false if already enrolled or enrolled without lives
    pub fn enroll(&mut self, resident: ResidentId, lives: Lives, side: Option<Side>) -> bool {
        if lives == Lives::Finite(0) || self.participants.contains_key(&resident) {
            return false;
        }
        self.participants.insert(resident, Participant { resident, lives, side });
        true
    }

    pub fn contains(&self, resident: ResidentId) -> bool {
        self.participants.contains_key(&resident)
    }

    pub fn get(&self, resident: ResidentId) -> Option<&Participant> {
        self.participants.get(&resident)
    }

    pub fn lives_of(&self, resident: ResidentId) -> Option<Lives> {
        self.participants.get(&resident).map(|p| p.lives)
    }

    pub fn side_of(&self, resident: ResidentId) -> Option<Side> {
        self.participants.get(&resident).and_then(|p| p.side)
    }

    /// Take one life from a participant, returns None if not enrolled
    ///
    /// Reaching zero lives and leaving the registry happen together.
    pub fn take_life(&mut self, resident: ResidentId) -> Option<LifeLoss> {
        let participant = self.participants.get_mut(&resident)?;
        let before = match participant.lives {
            Lives::Unlimited => return Some(LifeLoss::Untracked),
            Lives::Finite(n) => n,
        };

        let remaining = before.saturating_sub(1);
        if remaining == 0 {
            self.participants.remove(&resident);
            return Some(LifeLoss::LastLife);
        }

        participant.lives = Lives::Finite(remaining);
        Some(LifeLoss::Survived { before, remaining })
    }

    /// Remove a participant; removing an absent resident is a no-op
    pub fn remove(&mut self, resident: ResidentId) -> Option<Participant> {
        self.participants.remove(&resident)
    }

    /// Remove every participant matching the predicate, returns who was removed
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<ResidentId>
    where
        F: FnMut(&Participant) -> bool,
    {
        let mut removed: Vec<ResidentId> = self
            .participants
            .values()
            .filter(|p| predicate(*p))
            .map(|p| p.resident)
            .collect();
        removed.sort();
        for resident in &removed {
            self.participants.remove(resident);
        }
        removed
    }

    /// Enrolled residents in id order
    pub fn residents(&self) -> Vec<ResidentId> {
        let mut residents: Vec<ResidentId> = self.participants.keys().copied().collect();
        residents.sort();
        residents
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.values()
    }

    pub fn count_on_side(&self, side: Side) -> usize {
        self.participants.values().filter(|p| p.side == Some(side)).count()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
