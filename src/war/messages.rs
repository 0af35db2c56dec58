//! Player-facing war messages
//!
//! The engine never renders text itself. Each message carries its
//! translation key and the arguments the host substitutes into it.

use serde::{Deserialize, Serialize};

use crate::core::types::{Amount, ConflictId, NationId, ResidentId, TownId};
use crate::war::conflict::Contender;

/// Who receives a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Audience {
    /// Everyone taking part in a war
    Conflict(ConflictId),
    /// Every resident of a town
    Town(TownId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WarMessage {
    YouRobbedPlayer { victim: ResidentId, amount: Amount },
    PlayerRobbedYou { killer: ResidentId, amount: Amount },
    CouldNotPayEliminatedRiot { victim: ResidentId, shortfall: Amount },
    CouldNotPayEliminated { victim: ResidentId, shortfall: Amount },
    TownBankPaying { victim: ResidentId, killer: ResidentId, amount: Amount },
    TownCouldNotPayRemoving { town: TownId, killer_town: Option<TownId> },
    ResidentEliminated { resident: ResidentId, war_name: String },
    KingKilled { nation: NationId },
    MayorKilled { town: TownId },
    CantBeJailedPlotFallen,
    WarEnded { war_name: String, winner: Option<Contender> },
}

impl WarMessage {
    /// Translation key looked up by the host
    pub fn key(&self) -> &'static str {
        match self {
            WarMessage::YouRobbedPlayer { .. } => "msg_you_robbed_player",
            WarMessage::PlayerRobbedYou { .. } => "msg_player_robbed_you",
            WarMessage::CouldNotPayEliminatedRiot { .. } => "msg_player_couldnt_pay_eliminated_riot",
            WarMessage::CouldNotPayEliminated { .. } => "msg_player_couldnt_pay_eliminated",
            WarMessage::TownBankPaying { .. } => {
                "msg_player_couldnt_pay_player_town_bank_paying_instead"
            }
            WarMessage::TownCouldNotPayRemoving { .. } => {
                "msg_town_could_not_pay_death_costs_removing_from_war"
            }
            WarMessage::ResidentEliminated { .. } => {
                "msg_resident_has_run_out_of_lives_and_is_eliminated_from_the_war"
            }
            WarMessage::KingKilled { .. } => "msg_war_king_killed",
            WarMessage::MayorKilled { .. } => "msg_war_mayor_killed",
            WarMessage::CantBeJailedPlotFallen => "msg_war_player_cant_be_jailed_plot_fallen",
            WarMessage::WarEnded { .. } => "msg_war_ended",
        }
    }

    /// Positional arguments for the translation
    pub fn args(&self) -> Vec<String> {
        match self {
            WarMessage::YouRobbedPlayer { victim, amount } => {
                vec![victim.to_string(), format_money(*amount)]
            }
            WarMessage::PlayerRobbedYou { killer, amount } => {
                vec![killer.to_string(), format_money(*amount)]
            }
            WarMessage::CouldNotPayEliminatedRiot { victim, shortfall }
            | WarMessage::CouldNotPayEliminated { victim, shortfall } => {
                vec![victim.to_string(), format_money(*shortfall)]
            }
            WarMessage::TownBankPaying { victim, killer, amount } => {
                vec![victim.to_string(), killer.to_string(), format_money(*amount)]
            }
            // The removed town is named twice: "<town> could not pay <killer>, removing <town>"
            WarMessage::TownCouldNotPayRemoving { town, killer_town } => vec![
                town.to_string(),
                killer_town.map(|t| t.to_string()).unwrap_or_default(),
                town.to_string(),
            ],
            WarMessage::ResidentEliminated { resident, war_name } => {
                vec![resident.to_string(), war_name.clone()]
            }
            WarMessage::KingKilled { nation } => vec![nation.to_string()],
            WarMessage::MayorKilled { town } => vec![town.to_string()],
            WarMessage::CantBeJailedPlotFallen => Vec::new(),
            WarMessage::WarEnded { war_name, winner } => vec![
                war_name.clone(),
                winner.map(|w| w.to_string()).unwrap_or_default(),
            ],
        }
    }
}

fn format_money(amount: Amount) -> String {
    format!("{:.2}", amount)
}
