//! War death payments
//!
//! The victim pays the killer a flat war death price. What the victim
//! cannot cover falls to the victim's town bank; a town that cannot cover
//! the rest is removed from the war. Riots have no opposing town, so a
//! victim who cannot pay is simply put out of the riot; the same goes for
//! a townless victim in any other war.

use serde::{Deserialize, Serialize};

use crate::core::config::WarSettings;
use crate::core::error::{Result, WarError};
use crate::core::types::{Account, Amount, ResidentId};
use crate::war::conflict::{Conflict, Group};
use crate::war::messages::{Audience, WarMessage};
use crate::war::services::{Ledger, Messenger, Organization, WarTeardown};
use crate::war::termination::{check_end, remove_group, WarOutcome};
use crate::war::war_type::WarType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// The victim paid everything
    Covered,
    /// The town bank paid the rest
    TownCovered,
    /// The victim could not pay, had no town bank to fall back on and left the war
    VictimRemoved,
    /// The town could not pay the rest and left the war
    TownRemoved,
}

/// What a war death cost and who paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathPayment {
    pub resident_paid: Amount,
    /// Part of the price the victim could not cover
    pub shortfall: Amount,
    pub town_paid: Amount,
    pub outcome: PaymentOutcome,
    pub ended: Option<WarOutcome>,
}

/// Charge the war death price for `victim` killed by `killer`
///
/// Who covers a shortfall is settled before any money moves, so a failed
/// lookup never leaves a half-paid death behind.
pub fn on_war_death<H>(
    conflict: &mut Conflict,
    victim: ResidentId,
    killer: ResidentId,
    settings: &WarSettings,
    host: &mut H,
) -> Result<DeathPayment>
where
    H: Organization + Ledger + Messenger + WarTeardown + ?Sized,
{
    let death_price = settings.economy.wartime_death_price.max(0.0);
    let spendable = host.spendable_balance(Account::Resident(victim)).max(0.0);
    let price = spendable.min(death_price);
    let shortfall = (death_price - spendable).max(0.0);

    // Riots share one town, so only faction wars fall back on a bank
    let fallback_town = match conflict.war_type {
        WarType::Riot => None,
        _ => host.town_of(victim),
    };

    if price > 0.0 {
        host.transfer(
            price,
            Account::Resident(victim),
            Account::Resident(killer),
            "Death Payment (War)",
        )
        .map_err(WarError::ledger)?;
        host.notify(killer, &WarMessage::YouRobbedPlayer { victim, amount: price })
            .map_err(WarError::messenger)?;
        host.notify(victim, &WarMessage::PlayerRobbedYou { killer, amount: price })
            .map_err(WarError::messenger)?;
    }

    let mut payment = DeathPayment {
        resident_paid: price,
        shortfall,
        town_paid: 0.0,
        outcome: PaymentOutcome::Covered,
        ended: None,
    };

    if shortfall <= 0.0 {
        return Ok(payment);
    }

    let victim_town = match fallback_town {
        Some(town) => town,
        None => {
            tracing::warn!(
                "{} could not pay {:.2} and has no bank behind them, out of '{}'",
                victim,
                shortfall,
                conflict.name
            );
            let message = if conflict.war_type == WarType::Riot {
                WarMessage::CouldNotPayEliminatedRiot { victim, shortfall }
            } else {
                WarMessage::CouldNotPayEliminated { victim, shortfall }
            };
            host.broadcast(Audience::Conflict(conflict.id), &message)
                .map_err(WarError::messenger)?;
            conflict.participants.remove(victim);
            payment.outcome = PaymentOutcome::VictimRemoved;
            payment.ended = check_end(conflict, host)?;
            return Ok(payment);
        }
    };

    let killer_town = host.town_of(killer);
    let bank = host.spendable_balance(Account::Town(victim_town)).max(0.0);
    let town_paid = shortfall.min(bank);

    if town_paid > 0.0 {
        host.transfer(
            town_paid,
            Account::Town(victim_town),
            Account::Resident(killer),
            &format!("Death Payment (War) ({} couldn't pay)", victim),
        )
        .map_err(WarError::ledger)?;
        payment.town_paid = town_paid;
        payment.outcome = PaymentOutcome::TownCovered;
        host.broadcast(
            Audience::Town(victim_town),
            &WarMessage::TownBankPaying {
                victim,
                killer,
                amount: town_paid,
            },
        )
        .map_err(WarError::messenger)?;
    }

    if town_paid < shortfall {
        tracing::warn!(
            "{} could not cover {:.2} for {}, removing it from '{}'",
            victim_town,
            shortfall - town_paid,
            victim,
            conflict.name
        );
        host.broadcast(
            Audience::Conflict(conflict.id),
            &WarMessage::TownCouldNotPayRemoving {
                town: victim_town,
                killer_town,
            },
        )
        .map_err(WarError::messenger)?;
        let removal = remove_group(conflict, Group::Town(victim_town), killer_town, host)?;
        payment.outcome = PaymentOutcome::TownRemoved;
        payment.ended = removal.ended;
    }

    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TownId;
    use crate::war::memory::MemoryHost;
    use crate::war::war_type::Side;

    fn settings(price: f64) -> WarSettings {
        let mut settings = WarSettings::default();
        settings.economy.wartime_death_price = price;
        settings
    }

    fn town_war(host: &mut MemoryHost, victim_balance: f64, bank: f64) -> Conflict {
        host.add_town(TownId(1), None, bank);
        host.add_town(TownId(2), None, 0.0);
        host.add_town(TownId(3), None, 0.0);
        host.add_resident(ResidentId(1), Some(TownId(1)), victim_balance);
        host.add_resident(ResidentId(2), Some(TownId(2)), 0.0);
        host.add_resident(ResidentId(3), Some(TownId(3)), 0.0);
        let mut war = Conflict::new("Feud", WarType::TownWar, WarType::TownWar.default_policy());
        for r in 1..=3 {
            war.enroll(ResidentId(r), None);
        }
        war
    }

    #[test]
    fn test_victim_covers_full_price() {
        let mut host = MemoryHost::new();
        let mut war = town_war(&mut host, 1500.0, 0.0);

        let payment = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(1000.0), &mut host).unwrap();

        assert_eq!(payment.resident_paid, 1000.0);
        assert_eq!(payment.shortfall, 0.0);
        assert_eq!(payment.outcome, PaymentOutcome::Covered);
        assert_eq!(host.balance(Account::Resident(ResidentId(1))), 500.0);
        assert_eq!(host.balance(Account::Resident(ResidentId(2))), 1000.0);
        assert_eq!(host.notifications.len(), 2);
    }

    #[test]
    fn test_town_bank_covers_rest() {
        let mut host = MemoryHost::new();
        let mut war = town_war(&mut host, 300.0, 5000.0);

        let payment = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(1000.0), &mut host).unwrap();

        assert_eq!(payment.resident_paid, 300.0);
        assert_eq!(payment.town_paid, 700.0);
        assert_eq!(payment.outcome, PaymentOutcome::TownCovered);
        assert_eq!(host.balance(Account::Town(TownId(1))), 4300.0);
        assert!(war.is_enrolled(ResidentId(1)));
        assert_eq!(host.transfers[1].memo, "Death Payment (War) (resident#1 couldn't pay)");
    }

    #[test]
    fn test_broke_victim_and_broke_town_removes_town() {
        let mut host = MemoryHost::new();
        let mut war = town_war(&mut host, 0.0, 0.0);

        let payment = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(1000.0), &mut host).unwrap();

        assert_eq!(payment.resident_paid, 0.0);
        assert_eq!(payment.town_paid, 0.0);
        assert_eq!(payment.outcome, PaymentOutcome::TownRemoved);
        assert!(host.transfers.is_empty());
        assert!(!war.is_enrolled(ResidentId(1)));
        assert!(war.is_active());
    }

    #[test]
    fn test_negative_balance_treated_as_empty() {
        let mut host = MemoryHost::new();
        let mut war = town_war(&mut host, -250.0, 2000.0);

        let payment = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(1000.0), &mut host).unwrap();

        assert_eq!(payment.resident_paid, 0.0);
        assert_eq!(payment.shortfall, 1000.0);
        assert_eq!(payment.town_paid, 1000.0);
    }

    #[test]
    fn test_riot_victim_who_cannot_pay_is_removed() {
        let mut host = MemoryHost::new();
        host.add_town(TownId(1), None, 10_000.0);
        host.add_resident(ResidentId(1), Some(TownId(1)), 100.0);
        host.add_resident(ResidentId(2), Some(TownId(1)), 0.0);
        host.add_resident(ResidentId(3), Some(TownId(1)), 0.0);
        let mut war = Conflict::new("Riot", WarType::Riot, WarType::Riot.default_policy());
        war.enroll(ResidentId(1), Some(Side::Rebel));
        war.enroll(ResidentId(2), Some(Side::Government));
        war.enroll(ResidentId(3), Some(Side::Rebel));

        let payment = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(1000.0), &mut host).unwrap();

        assert_eq!(payment.outcome, PaymentOutcome::VictimRemoved);
        assert_eq!(payment.town_paid, 0.0);
        assert_eq!(host.balance(Account::Town(TownId(1))), 10_000.0);
        assert!(!war.is_enrolled(ResidentId(1)));
        assert!(war.is_active());
        assert_eq!(host.broadcasts_with_key("msg_player_couldnt_pay_eliminated_riot").len(), 1);
    }

    #[test]
    fn test_ledger_failure_surfaces() {
        let mut host = MemoryHost::new();
        let mut war = town_war(&mut host, 1500.0, 0.0);
        host.fail_transfers = true;

        let err = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(1000.0), &mut host);
        assert!(matches!(err, Err(WarError::Collaborator { service: "ledger", .. })));
    }

    #[test]
    fn test_zero_price_charges_nothing() {
        let mut host = MemoryHost::new();
        let mut war = town_war(&mut host, 1500.0, 0.0);

        let payment = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(0.0), &mut host).unwrap();
        assert_eq!(payment.resident_paid, 0.0);
        assert!(host.transfers.is_empty());
        assert!(host.notifications.is_empty());
    }

    #[test]
    fn test_townless_victim_is_removed_without_error() {
        let mut host = MemoryHost::new();
        host.add_town(TownId(2), None, 0.0);
        host.add_town(TownId(3), None, 0.0);
        host.add_resident(ResidentId(1), None, 400.0);
        host.add_resident(ResidentId(2), Some(TownId(2)), 0.0);
        host.add_resident(ResidentId(3), Some(TownId(2)), 0.0);
        let mut war = Conflict::new("Uprising", WarType::CivilWar, WarType::CivilWar.default_policy());
        war.enroll(ResidentId(1), Some(Side::Rebel));
        war.enroll(ResidentId(2), Some(Side::Government));
        war.enroll(ResidentId(3), Some(Side::Rebel));

        let payment = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(1000.0), &mut host).unwrap();

        assert_eq!(payment.resident_paid, 400.0);
        assert_eq!(payment.shortfall, 600.0);
        assert_eq!(payment.town_paid, 0.0);
        assert_eq!(payment.outcome, PaymentOutcome::VictimRemoved);
        assert_eq!(host.balance(Account::Resident(ResidentId(2))), 400.0);
        assert_eq!(host.transfers.len(), 1);
        assert!(!war.is_enrolled(ResidentId(1)));
        assert!(war.is_active());
        assert_eq!(host.broadcasts_with_key("msg_player_couldnt_pay_eliminated").len(), 1);
    }

    #[test]
    fn test_failed_bank_transfer_is_not_announced() {
        let mut host = MemoryHost::new();
        let mut war = town_war(&mut host, 0.0, 5000.0);
        host.fail_transfers = true;

        let err = on_war_death(&mut war, ResidentId(1), ResidentId(2), &settings(1000.0), &mut host);

        assert!(matches!(err, Err(WarError::Collaborator { service: "ledger", .. })));
        assert!(host
            .broadcasts_with_key("msg_player_couldnt_pay_player_town_bank_paying_instead")
            .is_empty());
        assert_eq!(host.balance(Account::Town(TownId(1))), 5000.0);
    }
}
