//! War Replay
//!
//! Replays a scenario of kills through the war engine against the
//! in-memory host and prints a JSON summary of what happened.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use eventwar::core::error::Result;
use eventwar::core::types::{Account, Amount, JailId, NationId, ResidentId, TownBlockId, TownId};
use eventwar::core::WarSettings;
use eventwar::war::memory::MemoryHost;
use eventwar::war::{
    on_player_killed_player, Conflict, ConflictState, Jail, JailOutcome, KillOccurrence,
    PaymentOutcome, Side, WarRegistry, WarType, WarOutcome,
};

/// War Replay - run a scripted event war and report the result
#[derive(Parser, Debug)]
#[command(name = "war_replay")]
#[command(about = "Replay kills of an event war scenario and print a JSON summary")]
struct Args {
    /// Scenario TOML file
    scenario: PathBuf,

    /// Separate settings TOML, overrides the scenario's [settings]
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Pretty-print the JSON summary
    #[arg(long)]
    pretty: bool,

    /// Log filter, e.g. "eventwar=debug"
    #[arg(long, default_value = "eventwar=info")]
    log: String,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    war_type: WarType,
    #[serde(default)]
    settings: WarSettings,
    #[serde(default)]
    towns: Vec<TownSpec>,
    #[serde(default)]
    residents: Vec<ResidentSpec>,
    #[serde(default)]
    enemies: Vec<(u32, u32)>,
    #[serde(default)]
    allies: Vec<(u32, u32)>,
    #[serde(default)]
    jails: Vec<JailSpec>,
    #[serde(default)]
    kills: Vec<KillOccurrence>,
}

#[derive(Debug, Deserialize)]
struct TownSpec {
    id: u32,
    #[serde(default)]
    nation: Option<u32>,
    #[serde(default)]
    bank: Amount,
    #[serde(default)]
    mayor: Option<u32>,
    #[serde(default)]
    king: bool,
}

#[derive(Debug, Deserialize)]
struct ResidentSpec {
    id: u32,
    #[serde(default)]
    town: Option<u32>,
    #[serde(default)]
    balance: Amount,
    #[serde(default)]
    side: Option<Side>,
    #[serde(default = "default_true")]
    enrolled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct JailSpec {
    id: u32,
    town: u32,
    #[serde(default)]
    primary: bool,
    world: String,
    x: i32,
    z: i32,
    #[serde(default = "default_true")]
    in_war_zone: bool,
}

#[derive(Serialize)]
struct KillLine {
    victim: ResidentId,
    killer: ResidentId,
    counted: bool,
    lives_after: Option<u32>,
    eliminated: bool,
    resident_paid: Option<Amount>,
    town_paid: Option<Amount>,
    payment: Option<PaymentOutcome>,
    jail: Option<JailOutcome>,
}

#[derive(Serialize)]
struct MessageLine {
    key: &'static str,
    args: Vec<String>,
}

#[derive(Serialize)]
struct Summary {
    war: String,
    war_type: WarType,
    ended: bool,
    outcome: Option<WarOutcome>,
    remaining: Vec<ResidentId>,
    kills: Vec<KillLine>,
    balances: Vec<(Account, Amount)>,
    broadcasts: Vec<MessageLine>,
}

fn build_host(scenario: &Scenario) -> MemoryHost {
    let mut host = MemoryHost::new();

    for town in &scenario.towns {
        host.add_town(TownId(town.id), town.nation.map(NationId), town.bank);
    }
    for resident in &scenario.residents {
        host.add_resident(ResidentId(resident.id), resident.town.map(TownId), resident.balance);
    }
    for town in &scenario.towns {
        if let Some(mayor) = town.mayor {
            host.make_mayor(ResidentId(mayor));
            if town.king {
                host.make_king(ResidentId(mayor));
            }
        }
    }
    for (a, b) in &scenario.enemies {
        host.declare_enemies(TownId(*a), TownId(*b));
    }
    for (a, b) in &scenario.allies {
        host.declare_allies(TownId(*a), TownId(*b));
    }
    for jail in &scenario.jails {
        let block = TownBlockId::new(jail.world.clone(), jail.x, jail.z);
        if jail.in_war_zone {
            host.conflict_zones.insert(block.clone());
        }
        host.add_jail(
            TownId(jail.town),
            Jail { id: JailId(jail.id), town_block: block },
            jail.primary,
        );
    }

    host
}

fn run(args: &Args) -> Result<Summary> {
    let content = std::fs::read_to_string(&args.scenario)?;
    let scenario: Scenario = toml::from_str(&content)?;

    let settings = match &args.settings {
        Some(path) => WarSettings::load(path)?,
        None => {
            scenario.settings.validate()?;
            scenario.settings.clone()
        }
    };

    let mut host = build_host(&scenario);
    let mut war = Conflict::with_settings(scenario.name.clone(), scenario.war_type, &settings);
    for resident in scenario.residents.iter().filter(|r| r.enrolled) {
        if !war.enroll(ResidentId(resident.id), resident.side) {
            tracing::warn!(
                "{} was not enrolled in '{}' (listed twice, or side {:?} does not fit a {})",
                ResidentId(resident.id),
                scenario.name,
                resident.side,
                scenario.war_type
            );
        }
    }

    let mut registry = WarRegistry::new();
    let war_id = registry.insert(war)?;

    tracing::info!(
        "Replaying {} kills in {} '{}'",
        scenario.kills.len(),
        scenario.war_type,
        scenario.name
    );

    let mut kills = Vec::with_capacity(scenario.kills.len());
    for occurrence in &scenario.kills {
        let resolution = on_player_killed_player(&mut registry, occurrence, &settings, &mut host)?;
        kills.push(match resolution {
            Some(res) => KillLine {
                victim: occurrence.victim,
                killer: occurrence.killer,
                counted: true,
                lives_after: res.kill.lives_after,
                eliminated: res.kill.eliminated,
                resident_paid: res.payment.as_ref().map(|p| p.resident_paid),
                town_paid: res.payment.as_ref().map(|p| p.town_paid),
                payment: res.payment.as_ref().map(|p| p.outcome),
                jail: res.jail,
            },
            None => KillLine {
                victim: occurrence.victim,
                killer: occurrence.killer,
                counted: false,
                lives_after: None,
                eliminated: false,
                resident_paid: None,
                town_paid: None,
                payment: None,
                jail: None,
            },
        });
    }

    let (ended, remaining) = match registry.get(war_id) {
        Some(war) => (
            matches!(war.state, ConflictState::Ended { .. }),
            war.participants.residents(),
        ),
        None => (false, Vec::new()),
    };

    Ok(Summary {
        war: scenario.name.clone(),
        war_type: scenario.war_type,
        ended,
        outcome: host.ended.first().map(|(_, outcome)| outcome.clone()),
        remaining,
        kills,
        balances: host.balances(),
        broadcasts: host
            .broadcasts
            .iter()
            .map(|(_, msg)| MessageLine { key: msg.key(), args: msg.args() })
            .collect(),
    })
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log))
        .with_writer(std::io::stderr)
        .init();

    let summary = match run(&args) {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Replay failed: {}", e);
            std::process::exit(1);
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    };

    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("Could not serialize summary: {}", e);
            std::process::exit(1);
        }
    }
}
