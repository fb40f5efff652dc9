//! Cube upgrade planner CLI.
//!
//! Usage:
//!   cargo run --bin cube-sim -- <COMMAND> [OPTIONS]
//!
//! Examples:
//!   cargo run --bin cube-sim -- simulate --quick --seed 42
//!   cargo run --bin cube-sim -- simulate -n 500 -b 300 --policy greedy --policy worst
//!   cargo run --bin cube-sim -- advise --slots my_slots.json --class mage
//!   cargo run --bin cube-sim -- rank --position weapon --tier legendary --top 10

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use cube_optimizer::catalogue::Position;
use cube_optimizer::estimator::GUIDANCE_SAMPLE_SIZE;
use cube_optimizer::simulator::{Policy, SimConfig};
use cube_optimizer::slots::{default_slots, load_slots, SlotState};
use cube_optimizer::stats::{ClassConfig, DamageFormula, StatBundle};
use cube_optimizer::tiers::Tier;
use cube_optimizer::utils::persistence::{data_path, load_json};
use cube_optimizer::{Engine, GameData};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cube-sim")]
#[command(about = "Cube upgrade planner and strategy simulator", long_about = None)]
struct Cli {
    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare allocation policies over many simulated budgets
    Simulate {
        #[command(flatten)]
        common: CommonArgs,

        /// Trials per policy
        #[arg(short = 'n', long)]
        trials: Option<u32>,

        /// Attempts per trial
        #[arg(short, long)]
        budget: Option<u32>,

        /// Random seed for reproducibility
        #[arg(short, long, env = "CUBE_SEED")]
        seed: Option<u64>,

        /// Policies to compare (default: all five)
        #[arg(short, long)]
        policy: Vec<String>,

        /// Tier the hybrid-rush policy drives slots to
        #[arg(long)]
        rush_target: Option<String>,

        /// Small, fast run
        #[arg(long, conflicts_with = "thorough")]
        quick: bool,

        /// Large run for stable quartiles
        #[arg(long)]
        thorough: bool,

        /// Save a JSON report next to the current directory
        #[arg(long)]
        json: bool,
    },

    /// Recommend which slot to spend the next attempt on
    Advise {
        #[command(flatten)]
        common: CommonArgs,

        /// Best combinations to show for the recommended slot
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Estimator samples per slot
        #[arg(long, default_value_t = GUIDANCE_SAMPLE_SIZE)]
        samples: usize,

        /// Random seed for reproducibility
        #[arg(short, long, env = "CUBE_SEED")]
        seed: Option<u64>,
    },

    /// List the best line combinations for one position and tier
    Rank {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(long)]
        position: String,

        #[arg(long)]
        tier: String,

        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Class preset (warrior, guardian, mage, archer, thief)
    #[arg(short, long, env = "CUBE_CLASS", default_value = "warrior")]
    class: String,

    /// Tier transition table JSON (default: built-in)
    #[arg(long, env = "CUBE_TIERS")]
    tiers: Option<PathBuf>,

    /// Reward catalogue JSON (default: built-in)
    #[arg(long, env = "CUBE_CATALOGUE")]
    catalogue: Option<PathBuf>,

    /// Baseline stat bundle JSON (default: built-in baseline)
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Persisted slots JSON (default: ~/.cube-optimizer/slots.json if present)
    #[arg(long, env = "CUBE_SLOTS")]
    slots: Option<PathBuf>,

    /// Tier of the generated slots when no slot file is found
    #[arg(long, default_value = "rare")]
    start_tier: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Simulate {
            common,
            trials,
            budget,
            seed,
            policy,
            rush_target,
            quick,
            thorough,
            json,
        } => {
            let mut config = if quick {
                SimConfig::quick()
            } else if thorough {
                SimConfig::thorough()
            } else {
                SimConfig::default()
            };
            if let Some(n) = trials {
                config.num_trials = n;
            }
            if let Some(b) = budget {
                config.budget = b;
            }
            config.seed = seed;
            config.verbosity = cli.verbose + 1;
            if let Some(target) = rush_target {
                config.rush_target = parse_tier(&target)?;
            }
            let policies = parse_policies(&policy, config.rush_target)?;
            simulate(&common, &config, &policies, json)
        }
        Commands::Advise {
            common,
            top,
            samples,
            seed,
        } => advise(&common, top, samples, seed),
        Commands::Rank {
            common,
            position,
            tier,
            top,
        } => rank(&common, &position, &tier, top),
    }
}

fn setup_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_tier(name: &str) -> Result<Tier> {
    Tier::from_name(name).ok_or_else(|| anyhow!("unknown tier '{name}'"))
}

fn parse_policies(names: &[String], rush_target: Tier) -> Result<Vec<Policy>> {
    if names.is_empty() {
        return Ok(Policy::all(rush_target).to_vec());
    }
    names
        .iter()
        .map(|n| Policy::from_name(n, rush_target).ok_or_else(|| anyhow!("unknown policy '{n}'")))
        .collect()
}

/// Build the engine and starting slots shared by every command.
fn setup(common: &CommonArgs, seed: Option<u64>) -> Result<(Engine, Vec<SlotState>)> {
    let data = GameData::load(common.tiers.as_deref(), common.catalogue.as_deref())
        .context("Failed to load game data")?;

    let class = ClassConfig::preset(&common.class)
        .ok_or_else(|| anyhow!("unknown class '{}'", common.class))?;
    let baseline: StatBundle = match &common.baseline {
        Some(path) => load_json(path)
            .with_context(|| format!("Failed to read baseline {}", path.display()))?,
        None => StatBundle::default(),
    };

    let slot_file = match &common.slots {
        Some(path) => Some(path.clone()),
        None => data_path("slots.json").ok().filter(|p| p.exists()),
    };
    let slots = match &slot_file {
        Some(path) => load_slots(path, &data.tiers)
            .with_context(|| format!("Failed to load slots from {}", path.display()))?,
        None => {
            let tier = parse_tier(&common.start_tier)?;
            info!(tier = tier.name(), "no slot file, starting from empty slots");
            default_slots(&Position::ALL, tier)
        }
    };

    let value_fn = Arc::new(DamageFormula::default());
    let mut engine = match seed {
        Some(seed) => Engine::with_seed(data, value_fn, seed),
        None => Engine::new(data, value_fn),
    };
    engine.set_class(Some(class));
    engine.set_baseline(baseline);
    // fail on a degenerate baseline before any command runs
    engine.evaluator()?;
    Ok((engine, slots))
}

fn simulate(common: &CommonArgs, config: &SimConfig, policies: &[Policy], json: bool) -> Result<()> {
    let (engine, slots) = setup(common, config.seed)?;

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║                 CUBE STRATEGY SIMULATOR                       ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Trials:         {}", config.num_trials);
    println!("  Budget:         {}", config.budget);
    println!("  Slots:          {}", slots.len());
    println!("  Rush Target:    {}", config.rush_target.name());
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();

    let report = engine.compare_strategies(policies, config, &slots)?;
    println!("{}", report.to_text());

    if json {
        let filename = format!(
            "cube_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        std::fs::write(&filename, report.to_json())
            .with_context(|| format!("Failed to write {filename}"))?;
        println!("JSON report saved to: {}", filename);
    }
    Ok(())
}

fn advise(common: &CommonArgs, top: usize, samples: usize, seed: Option<u64>) -> Result<()> {
    let (engine, slots) = setup(common, seed)?;
    let mut engine = engine.with_guidance_sample_size(samples);
    let advice = engine.advise(&slots, top)?;

    let Some(choice) = advice.choice else {
        warn!("no slots to advise on");
        println!("No slots available.");
        return Ok(());
    };
    let slot = &slots[choice.index];

    println!("Next attempt: slot {} ({} {})", slot.id, slot.position.name(), slot.tier.name());
    println!("  Expected gain:      {:+.3}%", choice.marginal_gain);
    if let Some(p) = advice.transition_probability {
        println!("  Tier-up chance:     {:.2}%", p * 100.0);
    }
    if let Some(gain) = advice.current_gain {
        println!("  Current lines:      {:.2}%", gain);
    }
    if let Some(rank) = advice.current_rank {
        println!("  Beats or matches:   {:.1}% of combinations", rank * 100.0);
    }
    println!();
    print_entries(&advice.top_entries);
    Ok(())
}

fn rank(common: &CommonArgs, position: &str, tier: &str, top: usize) -> Result<()> {
    let position =
        Position::from_name(position).ok_or_else(|| anyhow!("unknown position '{position}'"))?;
    let tier = parse_tier(tier)?;
    let (mut engine, _) = setup(common, None)?;

    let entries = engine.rank_combinations(position, tier)?;
    if entries.is_empty() {
        bail!("nothing to rank for {} at {}", position.name(), tier.name());
    }
    println!(
        "{} distinct combinations for {} {}",
        entries.len(),
        position.name(),
        tier.name()
    );
    println!();
    let shown: Vec<_> = entries.iter().take(top).copied().collect();
    print_entries(&shown);
    Ok(())
}

fn print_entries(entries: &[cube_optimizer::ranking::RankingEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        let lines: Vec<String> = entry.lines.iter().map(|l| l.describe()).collect();
        println!("  {:>3}. {:>7.2}%  {}", i + 1, entry.value_gain, lines.join(" | "));
    }
}
