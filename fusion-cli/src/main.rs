//! Intel Fusion CLI
//!
//! Replays recorded intel streams through the fusion engine and probes
//! remote scan links.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use fusion_core::{ChatMessage, IntelConfig, ProcessedKillmail, SystemEntity};
use fusion_runtime::{
    ChannelHistory, Clock, IntelSnapshot, IntelStateStore, KillmailOutcome, LoggingAlerts,
    ManualClock, SubmitOutcome, SystemClock,
};
use fusion_scan::{parse_scan_link, NoScan, RemoteDscanExtractor, ScanExtractor, ShipTypeList};
use fusion_understanding::{MessageUnderstanding, StaticCharacterDirectory};

#[derive(Parser)]
#[command(name = "fusion")]
#[command(author, version, about = "Intel Fusion: per-system intel from chat and killmails", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines stream of tokenized messages and killmails
    Replay {
        /// Events file, one JSON event per line
        #[arg(short, long)]
        input: PathBuf,

        /// Engine configuration (TOML)
        #[arg(short, long, env = "FUSION_CONFIG")]
        config: Option<PathBuf>,

        /// Additional intel channel names
        #[arg(long = "channel")]
        channels: Vec<String>,

        /// Known characters (JSON array of character details)
        #[arg(long)]
        characters: Option<PathBuf>,

        /// Ship type names, one per line; enables remote scan fetching
        #[arg(long)]
        ships: Option<PathBuf>,

        /// Judge freshness and expiry by wall-clock time instead of event time
        #[arg(long)]
        wall_clock: bool,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a remote d-scan link and list its ships
    Scan {
        /// adashboard or dscan.info link
        url: String,

        /// Ship type names, one per line
        #[arg(long)]
        ships: PathBuf,

        /// Engine configuration (TOML), for scan service settings
        #[arg(short, long, env = "FUSION_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Validate a configuration file
    CheckConfig {
        path: PathBuf,
    },
}

/// One line of a replay file
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ReplayEvent {
    Message(ChatMessage),
    Killmail(ProcessedKillmail),
}

impl ReplayEvent {
    fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        match self {
            ReplayEvent::Message(message) => message.timestamp,
            ReplayEvent::Killmail(killmail) => killmail.timestamp,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Replay {
            input,
            config,
            channels,
            characters,
            ships,
            wall_clock,
            json,
        } => {
            run_replay(
                &input,
                config.as_deref(),
                channels,
                characters.as_deref(),
                ships.as_deref(),
                wall_clock,
                json,
            )
            .await?;
        }
        Commands::Scan { url, ships, config } => {
            run_scan(&url, &ships, config.as_deref()).await?;
        }
        Commands::CheckConfig { path } => {
            check_config(&path)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<IntelConfig> {
    match path {
        Some(path) => IntelConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(IntelConfig::default()),
    }
}

fn read_events(path: &Path) -> Result<Vec<ReplayEvent>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {} of {}", index + 1, path.display()))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
async fn run_replay(
    input: &Path,
    config_path: Option<&Path>,
    channels: Vec<String>,
    characters: Option<&Path>,
    ships: Option<&Path>,
    wall_clock: bool,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    for channel in channels {
        config = config.with_channel(&channel, None);
    }
    config.validate()?;
    if config.intel_channels.is_empty() {
        bail!("No intel channels configured. Use --config or --channel");
    }

    let directory = match characters {
        Some(path) => StaticCharacterDirectory::load(path)?,
        None => StaticCharacterDirectory::default(),
    };
    let extractor: Arc<dyn ScanExtractor> = match ships {
        Some(path) => {
            let resolver = ShipTypeList::load(path)
                .with_context(|| format!("loading ship types {}", path.display()))?;
            Arc::new(RemoteDscanExtractor::new(config.scan.clone(), Arc::new(resolver))?)
        }
        None => Arc::new(NoScan),
    };

    let events = read_events(input)?;
    println!("📡 Replaying {} events from {}", events.len(), input.display());

    let replay_clock = Arc::new(ManualClock::new(
        events.first().map(ReplayEvent::timestamp).unwrap_or_else(chrono::Utc::now),
    ));
    let clock: Arc<dyn Clock> = if wall_clock {
        Arc::new(SystemClock)
    } else {
        replay_clock.clone()
    };

    let understanding = MessageUnderstanding::new(Arc::new(directory), extractor);
    let store = IntelStateStore::new(config.into_shared(), understanding, Arc::new(LoggingAlerts))
        .with_clock(clock.clone());

    let mut history = ChannelHistory::new();
    let mut applied = 0usize;
    for event in events {
        replay_clock.set(event.timestamp());
        match event {
            ReplayEvent::Message(message) => {
                let context = history.context_for(&message);
                match store.submit_message(&message, &context).await {
                    SubmitOutcome::Applied { .. } => applied += 1,
                    SubmitOutcome::Rejected(reason) => warn!("Rejected message: {}", reason),
                    _ => {}
                }
                history.record(message);
            }
            ReplayEvent::Killmail(killmail) => {
                if let KillmailOutcome::Applied { .. } = store.submit_killmail(&killmail) {
                    applied += 1;
                }
            }
        }
    }
    store.refresh();

    let stats = store.stats();
    println!(
        "✅ Applied {} events | {} systems with intel ({} raw)\n",
        applied, stats.published_systems, stats.raw_systems
    );

    let snapshot = store.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        print_snapshot(&snapshot, clock.now());
    }

    Ok(())
}

fn print_snapshot(snapshot: &IntelSnapshot, now: chrono::DateTime<chrono::Utc>) {
    if snapshot.is_empty() {
        println!("No current intel.");
        return;
    }

    let sorted: BTreeMap<_, _> = snapshot.iter().collect();
    for (system, entities) in sorted {
        println!("{}", system);
        for dated in entities {
            let age = (now - dated.timestamp).num_seconds().max(0);
            println!("  {:>5}s  {}", age, describe(&dated.item));
        }
    }
}

fn describe(entity: &SystemEntity) -> String {
    match entity {
        SystemEntity::Character { name, details, .. } => {
            match &details.alliance_ticker {
                Some(alliance) => format!("{} [{}] <{}>", name, details.corporation_ticker, alliance),
                None => format!("{} [{}]", name, details.corporation_ticker),
            }
        }
        SystemEntity::UnspecifiedCharacter { count } => format!("{} unidentified", count),
        SystemEntity::Ship { name, count, .. } => format!("{}x {}", count, name),
        SystemEntity::Gate { system, is_ansiblex } => {
            if *is_ansiblex {
                format!("{} ansiblex", system)
            } else {
                format!("{} gate", system)
            }
        }
        SystemEntity::Killmail { url, ship } => match ship {
            Some(ship) => format!("killmail ({}) {}", ship, url),
            None => format!("killmail {}", url),
        },
        other => format!("{:?}", other.kind()).to_lowercase(),
    }
}

async fn run_scan(url: &str, ships: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let link = parse_scan_link(url).ok_or_else(|| anyhow!("Not a supported scan link: {}", url))?;
    let resolver = ShipTypeList::load(ships)
        .with_context(|| format!("loading ship types {}", ships.display()))?;

    println!("🔍 Fetching {} scan...", link.service());
    let extractor = RemoteDscanExtractor::new(config.scan, Arc::new(resolver))?;
    let entities = extractor.extract_link(&link).await;

    if entities.is_empty() {
        println!("⚠️  No ships found (see log for fetch errors)");
    }
    for entity in &entities {
        println!("  {}", describe(entity));
    }

    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = IntelConfig::load(path).with_context(|| format!("loading config {}", path.display()))?;

    println!("✅ {} is valid", path.display());
    println!("   Expiry: {}s", config.intel_expire_secs);
    for channel in &config.intel_channels {
        match &channel.region {
            Some(region) => println!("   Channel: {} ({})", channel.name, region),
            None => println!("   Channel: {}", channel.name),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_events_parse() {
        let events: Vec<ReplayEvent> = include_str!("../../demos/events.jsonl")
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(events.len(), 5);
        assert!(matches!(events[3], ReplayEvent::Killmail(_)));
    }

    #[test]
    fn test_describe_entities() {
        assert_eq!(describe(&SystemEntity::ship("Sabre", 2)), "2x Sabre");
        assert_eq!(describe(&SystemEntity::GateCamp), "gatecamp");
        assert_eq!(
            describe(&SystemEntity::Gate {
                system: "Jita".to_string(),
                is_ansiblex: true
            }),
            "Jita ansiblex"
        );
    }

    #[test]
    fn test_demo_config_is_valid() {
        let config = IntelConfig::from_toml_str(include_str!("../../demos/intel.toml")).unwrap();
        assert_eq!(config.region_for("delve.imperium"), Some("Delve"));
    }
}
