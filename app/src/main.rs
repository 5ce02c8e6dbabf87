#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod command;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, EnchantsInput, EnchantsStrategy, ImpactStrategy, InfoStrategy, InitStrategy,
    LoadBuildStrategy, RelayStrategy, RunesInput, RunesStrategy, SetInput, SetStrategy,
    TransformInput, TransformStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "runeforge")]
#[command(about = "Rune, socket and enchant overrides for copied item text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Show configuration and service status
    Info,
    /// Show version
    Version,
    /// Apply the override policy to an item and print the result
    Transform {
        /// Item text file (reads stdin when omitted)
        path: Option<PathBuf>,

        /// Check applied runes against the service's rune catalog
        #[arg(long)]
        check: bool,
    },
    /// Transform an item and print its impact on the loaded build
    Impact {
        /// Item text file (reads stdin when omitted)
        path: Option<PathBuf>,
    },
    /// List runes valid for an item class
    Runes {
        /// Item class, e.g. "Helmets"
        class: String,

        /// Base type, e.g. "Iron Cap"
        #[arg(short = 't', long = "type")]
        base_type: Option<String>,
    },
    /// Search amulet enchants
    Enchants {
        /// Search words
        query: Vec<String>,

        /// Maximum results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Change the override policy
    Set {
        /// Fill every socket with the rune line
        #[arg(long)]
        uniform: Option<bool>,

        /// Fill sockets from per-socket choices
        #[arg(long)]
        per_socket: Option<bool>,

        /// Rune line used by uniform fill
        #[arg(long)]
        rune: Option<String>,

        /// Per-socket choice, repeatable
        #[arg(long = "socket", value_name = "INDEX=TEXT")]
        sockets: Vec<String>,

        /// Add sockets up to the item's standard maximum
        #[arg(long)]
        pad: Option<bool>,

        /// Override amulet enchants
        #[arg(long)]
        enchant: Option<bool>,

        /// Enchant to apply
        #[arg(long, value_name = "ID=TEXT")]
        select_enchant: Option<String>,

        /// Forget the selected enchant
        #[arg(long)]
        clear_enchant: bool,
    },
    /// Ask the service to load a build
    LoadBuild {
        /// Build file path or build code (service default when omitted)
        path: Option<String>,
    },
    /// Bridge JSON-lines relay frames between stdin and stdout
    Relay,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
        Commands::Transform { path, check } => {
            TransformStrategy
                .execute(TransformInput { path, check })
                .await
        }
        Commands::Impact { path } => ImpactStrategy.execute(path).await,
        Commands::Runes { class, base_type } => {
            RunesStrategy
                .execute(RunesInput { class, base_type })
                .await
        }
        Commands::Enchants { query, limit } => {
            EnchantsStrategy
                .execute(EnchantsInput {
                    query: query.join(" "),
                    limit,
                })
                .await
        }
        Commands::Set {
            uniform,
            per_socket,
            rune,
            sockets,
            pad,
            enchant,
            select_enchant,
            clear_enchant,
        } => {
            SetStrategy
                .execute(SetInput {
                    uniform,
                    per_socket,
                    rune,
                    sockets,
                    pad,
                    enchant,
                    select_enchant,
                    clear_enchant,
                })
                .await
        }
        Commands::LoadBuild { path } => LoadBuildStrategy.execute(path).await,
        Commands::Relay => RelayStrategy.execute(()).await,
    }
}
