use anyhow::Context;
use clap::{Parser, Subcommand};
use cohort::{Engine, EngineConfig, ProfileRecord, UserProfile};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Compatibility ranking and cohort clustering
#[derive(Parser, Debug)]
#[command(name = "cohort")]
#[command(about = "Rank compatible users and group populations into cohorts", long_about = None)]
struct Args {
    /// Path to a JSON engine config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank candidates for one user
    Rank {
        /// JSON array of profile records
        #[arg(short, long)]
        profiles: PathBuf,

        /// Target user id
        #[arg(short, long)]
        user: String,

        /// Number of matches (config default when omitted)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Fit clusters over the whole population
    Cluster {
        /// JSON array of profile records
        #[arg(short, long)]
        profiles: PathBuf,
    },
}

#[derive(Serialize)]
struct ClusterOutput<'a> {
    model_version: u64,
    schema_version: String,
    cluster_sizes: Vec<usize>,
    assignments: &'a [cohort::ClusterAssignment],
}

fn load_profiles(path: &Path) -> anyhow::Result<Vec<UserProfile>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading profiles from {:?}", path))?;
    let records: Vec<ProfileRecord> =
        serde_json::from_str(&content).with_context(|| format!("parsing {:?}", path))?;
    Ok(records.into_iter().map(UserProfile::from).collect())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting cohort v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => {
            info!("Config file: {:?}", path);
            EngineConfig::from_file(path)?
        }
        None => EngineConfig::default(),
    };
    let engine = Engine::init(config)?;

    match args.command {
        Command::Rank {
            profiles,
            user,
            top_k,
        } => {
            let profiles = load_profiles(&profiles)?;
            let target = profiles
                .iter()
                .find(|p| p.id.as_str() == user)
                .with_context(|| format!("user {:?} not found in profiles", user))?;
            info!("Ranking {} candidates for {}", profiles.len().saturating_sub(1), user);

            let response = engine.match_response(target, &profiles, top_k);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Cluster { profiles } => {
            let profiles = load_profiles(&profiles)?;
            info!("Clustering {} profiles", profiles.len());

            let assignments = engine.fit_population(&profiles)?;
            let snapshot = engine
                .snapshot()
                .context("no cluster model was published")?;
            let output = ClusterOutput {
                model_version: snapshot.version().as_u64(),
                schema_version: snapshot.schema().version().to_string(),
                cluster_sizes: snapshot.cluster_sizes(),
                assignments: &assignments,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    engine.shutdown();
    Ok(())
}
