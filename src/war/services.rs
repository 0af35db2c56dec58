//! Capabilities the engine borrows from the host
//!
//! Each trait is a narrow, read-mostly view of something the engine does
//! not own. Operations bound only on the traits they actually use, so a
//! test can supply exactly the fakes it needs.

use serde::{Deserialize, Serialize};

use crate::core::error::ServiceError;
use crate::core::types::{
    Account, Amount, ConflictId, JailId, Location, NationId, ResidentId, TownBlockId, TownId,
};
use crate::war::messages::{Audience, WarMessage};
use crate::war::termination::WarOutcome;

/// A jail plot owned by a town
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jail {
    pub id: JailId,
    pub town_block: TownBlockId,
}

/// Why a resident is being jailed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JailReason {
    PrisonerOfWar,
}

/// Town and nation membership and leadership
pub trait Organization {
    fn town_of(&self, resident: ResidentId) -> Option<TownId>;
    fn nation_of(&self, town: TownId) -> Option<NationId>;
    fn is_mayor(&self, resident: ResidentId) -> bool;
    fn is_king(&self, resident: ResidentId) -> bool;
    fn primary_jail(&self, town: TownId) -> Option<Jail>;
    fn jails(&self, town: TownId) -> Vec<Jail>;

    fn nation_of_resident(&self, resident: ResidentId) -> Option<NationId> {
        self.town_of(resident).and_then(|town| self.nation_of(town))
    }
}

/// Relations between towns
pub trait Diplomacy {
    fn is_enemy(&self, a: TownId, b: TownId) -> bool;
    fn is_ally(&self, a: TownId, b: TownId) -> bool;
}

/// Host-wide view of which towns and territory are at war
pub trait ConflictDirectory {
    /// Whether any event war is running at all
    fn is_war_time(&self) -> bool;
    fn has_active_conflict(&self, town: TownId) -> bool;
    /// Whether a territory block is claimed by an active war
    fn is_conflict_zone(&self, block: &TownBlockId) -> bool;
}

/// Account balances and money movement
pub trait Ledger {
    fn spendable_balance(&self, account: Account) -> Amount;
    fn transfer(
        &mut self,
        amount: Amount,
        from: Account,
        to: Account,
        memo: &str,
    ) -> Result<(), ServiceError>;
}

/// Message delivery
pub trait Messenger {
    fn notify(&mut self, resident: ResidentId, message: &WarMessage) -> Result<(), ServiceError>;
    fn broadcast(&mut self, audience: Audience, message: &WarMessage) -> Result<(), ServiceError>;
}

/// Kill point bookkeeping, location weighting is up to the host
pub trait Scoreboard {
    fn kill_scored(
        &mut self,
        victim: ResidentId,
        killer: ResidentId,
        points: u32,
        location: Option<&Location>,
    );
}

/// Incarceration requests
pub trait Jailer {
    fn attempt_assign(
        &mut self,
        resident: ResidentId,
        jail: &Jail,
        hours: u32,
        reason: JailReason,
        authority: ResidentId,
    ) -> bool;
}

/// Told once when a war is over
pub trait WarTeardown {
    fn conflict_ended(&mut self, conflict: ConflictId, outcome: &WarOutcome);
}

/// Everything the dispatcher needs from the host
pub trait WarHost:
    Organization + Diplomacy + ConflictDirectory + Ledger + Messenger + Scoreboard + Jailer + WarTeardown
{
}

impl<T: ?Sized> WarHost for T where
    T: Organization
        + Diplomacy
        + ConflictDirectory
        + Ledger
        + Messenger
        + Scoreboard
        + Jailer
        + WarTeardown
{
}
