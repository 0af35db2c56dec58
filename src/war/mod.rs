//! Event-war combat resolution
//!
//! Decides, for every kill between two residents fighting the same war,
//! what it costs the victim: lives, standing, money, freedom. Whole towns
//! and nations can cascade out of a war, and the war ends once fewer than
//! two opposing parties remain.

pub mod conflict;
pub mod dispatch;
pub mod economy;
pub mod eligibility;
pub mod elimination;
pub mod jail;
pub mod memory;
pub mod messages;
pub mod participants;
pub mod services;
pub mod termination;
pub mod war_type;

pub use conflict::{Conflict, ConflictState, Contender, Group, WarRegistry};
pub use dispatch::{cancels_default_death_price, on_player_killed_player, KillOccurrence, KillResolution};
pub use economy::{on_war_death, DeathPayment, PaymentOutcome};
pub use eligibility::{friendly_fire_verdict, is_conflict_zone, is_pvp_allowed, townblock_pvp_override};
pub use elimination::{on_lethal_kill, EliminationCascade, KillReport};
pub use jail::{attempt_jailing, JailOutcome};
pub use messages::{Audience, WarMessage};
pub use participants::{LifeLoss, Participant, ParticipantRegistry};
pub use services::{
    ConflictDirectory, Diplomacy, Jail, JailReason, Jailer, Ledger, Messenger, Organization,
    Scoreboard, WarHost, WarTeardown,
};
pub use termination::{check_end, contenders, remove_group, RemovalReport, WarOutcome};
pub use war_type::{FactionTier, LeaderTier, Lives, Side, SideModel, WarType, WarTypePolicy};
