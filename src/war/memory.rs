//! In-memory host
//!
//! A self-contained implementation of every host capability. It backs the
//! scenario replay tool and the test suites, and records everything the
//! engine asked of it so callers can inspect the effects afterwards.

use ahash::{AHashMap, AHashSet};
use serde::Serialize;

use crate::core::error::ServiceError;
use crate::core::types::{
    Account, Amount, ConflictId, JailId, Location, NationId, ResidentId, TownBlockId, TownId,
};
use crate::war::messages::{Audience, WarMessage};
use crate::war::services::{
    ConflictDirectory, Diplomacy, Jail, JailReason, Jailer, Ledger, Messenger, Organization,
    Scoreboard, WarTeardown,
};
use crate::war::termination::WarOutcome;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRecord {
    pub amount: Amount,
    pub from: Account,
    pub to: Account,
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub victim: ResidentId,
    pub killer: ResidentId,
    pub points: u32,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JailRecord {
    pub resident: ResidentId,
    pub jail: JailId,
    pub hours: u32,
    pub reason: JailReason,
    pub authority: ResidentId,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    residents: AHashMap<ResidentId, TownId>,
    nations: AHashMap<TownId, NationId>,
    mayors: AHashSet<ResidentId>,
    kings: AHashSet<ResidentId>,
    enemies: AHashSet<(TownId, TownId)>,
    allies: AHashSet<(TownId, TownId)>,
    jails: AHashMap<TownId, Vec<Jail>>,
    primary_jails: AHashMap<TownId, JailId>,
    full_jails: AHashSet<JailId>,
    balances: AHashMap<Account, Amount>,

    pub war_time: bool,
    pub active_towns: AHashSet<TownId>,
    pub conflict_zones: AHashSet<TownBlockId>,
    /// Make every transfer fail
    pub fail_transfers: bool,
    /// Make every message delivery fail
    pub fail_messages: bool,

    pub transfers: Vec<TransferRecord>,
    pub notifications: Vec<(ResidentId, WarMessage)>,
    pub broadcasts: Vec<(Audience, WarMessage)>,
    pub scores: Vec<ScoreRecord>,
    pub jailed: Vec<JailRecord>,
    pub ended: Vec<(ConflictId, WarOutcome)>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            war_time: true,
            ..Default::default()
        }
    }

    pub fn add_town(&mut self, town: TownId, nation: Option<NationId>, bank: Amount) {
        if let Some(nation) = nation {
            self.nations.insert(town, nation);
        }
        self.balances.insert(Account::Town(town), bank);
        self.active_towns.insert(town);
    }

    pub fn add_resident(&mut self, resident: ResidentId, town: Option<TownId>, balance: Amount) {
        if let Some(town) = town {
            self.residents.insert(resident, town);
        }
        self.balances.insert(Account::Resident(resident), balance);
    }

    pub fn make_mayor(&mut self, resident: ResidentId) {
        self.mayors.insert(resident);
    }

    pub fn make_king(&mut self, resident: ResidentId) {
        self.kings.insert(resident);
    }

    pub fn declare_enemies(&mut self, a: TownId, b: TownId) {
        self.enemies.insert((a, b));
        self.enemies.insert((b, a));
    }

    pub fn declare_allies(&mut self, a: TownId, b: TownId) {
        self.allies.insert((a, b));
        self.allies.insert((b, a));
    }

    pub fn add_jail(&mut self, town: TownId, jail: Jail, primary: bool) {
        if primary {
            self.primary_jails.insert(town, jail.id);
        }
        self.jails.entry(town).or_default().push(jail);
    }

    /// Jails marked full refuse every assignment
    pub fn mark_jail_full(&mut self, jail: JailId) {
        self.full_jails.insert(jail);
    }

    pub fn balance(&self, account: Account) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0.0)
    }

    /// Every broadcast sent with the given translation key
    pub fn broadcasts_with_key(&self, key: &str) -> Vec<&WarMessage> {
        self.broadcasts
            .iter()
            .filter(|(_, msg)| msg.key() == key)
            .map(|(_, msg)| msg)
            .collect()
    }

    /// All known account balances, residents first, in id order
    pub fn balances(&self) -> Vec<(Account, Amount)> {
        let mut balances: Vec<(Account, Amount)> =
            self.balances.iter().map(|(a, b)| (*a, *b)).collect();
        balances.sort_by_key(|(account, _)| match account {
            Account::Resident(id) => (0, id.0),
            Account::Town(id) => (1, id.0),
        });
        balances
    }
}

impl Organization for MemoryHost {
    fn town_of(&self, resident: ResidentId) -> Option<TownId> {
        self.residents.get(&resident).copied()
    }

    fn nation_of(&self, town: TownId) -> Option<NationId> {
        self.nations.get(&town).copied()
    }

    fn is_mayor(&self, resident: ResidentId) -> bool {
        self.mayors.contains(&resident)
    }

    fn is_king(&self, resident: ResidentId) -> bool {
        self.kings.contains(&resident)
    }

    fn primary_jail(&self, town: TownId) -> Option<Jail> {
        let primary = self.primary_jails.get(&town)?;
        self.jails
            .get(&town)?
            .iter()
            .find(|jail| jail.id == *primary)
            .cloned()
    }

    fn jails(&self, town: TownId) -> Vec<Jail> {
        self.jails.get(&town).cloned().unwrap_or_default()
    }
}

impl Diplomacy for MemoryHost {
    fn is_enemy(&self, a: TownId, b: TownId) -> bool {
        self.enemies.contains(&(a, b))
    }

    fn is_ally(&self, a: TownId, b: TownId) -> bool {
        a == b || self.allies.contains(&(a, b))
    }
}

impl ConflictDirectory for MemoryHost {
    fn is_war_time(&self) -> bool {
        self.war_time
    }

    fn has_active_conflict(&self, town: TownId) -> bool {
        self.active_towns.contains(&town)
    }

    fn is_conflict_zone(&self, block: &TownBlockId) -> bool {
        self.conflict_zones.contains(block)
    }
}

impl Ledger for MemoryHost {
    fn spendable_balance(&self, account: Account) -> Amount {
        self.balance(account)
    }

    fn transfer(
        &mut self,
        amount: Amount,
        from: Account,
        to: Account,
        memo: &str,
    ) -> Result<(), ServiceError> {
        if self.fail_transfers {
            return Err(ServiceError::new(format!("ledger offline, {} not moved", amount)));
        }
        let available = self.balance(from);
        if available < amount {
            return Err(ServiceError::new(format!(
                "{} holds {:.2}, cannot pay {:.2}",
                from, available, amount
            )));
        }
        *self.balances.entry(from).or_insert(0.0) -= amount;
        *self.balances.entry(to).or_insert(0.0) += amount;
        self.transfers.push(TransferRecord {
            amount,
            from,
            to,
            memo: memo.to_string(),
        });
        Ok(())
    }
}

impl Messenger for MemoryHost {
    fn notify(&mut self, resident: ResidentId, message: &WarMessage) -> Result<(), ServiceError> {
        if self.fail_messages {
            return Err(ServiceError::new("message bus unavailable"));
        }
        self.notifications.push((resident, message.clone()));
        Ok(())
    }

    fn broadcast(&mut self, audience: Audience, message: &WarMessage) -> Result<(), ServiceError> {
        if self.fail_messages {
            return Err(ServiceError::new("message bus unavailable"));
        }
        self.broadcasts.push((audience, message.clone()));
        Ok(())
    }
}

impl Scoreboard for MemoryHost {
    fn kill_scored(
        &mut self,
        victim: ResidentId,
        killer: ResidentId,
        points: u32,
        location: Option<&Location>,
    ) {
        self.scores.push(ScoreRecord {
            victim,
            killer,
            points,
            location: location.cloned(),
        });
    }
}

impl Jailer for MemoryHost {
    fn attempt_assign(
        &mut self,
        resident: ResidentId,
        jail: &Jail,
        hours: u32,
        reason: JailReason,
        authority: ResidentId,
    ) -> bool {
        if self.full_jails.contains(&jail.id) {
            return false;
        }
        self.jailed.push(JailRecord {
            resident,
            jail: jail.id,
            hours,
            reason,
            authority,
        });
        true
    }
}

impl WarTeardown for MemoryHost {
    fn conflict_ended(&mut self, conflict: ConflictId, outcome: &WarOutcome) {
        self.ended.push((conflict, outcome.clone()));
    }
}
