use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::info;
use shipfit::{Corpus, InvariantOptions, ModifierTargets, assert_invariants, report};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "shipfit")]
#[command(about = "Ship configurations, modifiers and corpus checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check corpus invariants; exits non-zero if any is violated.
    Validate {
        #[arg(long)]
        data: PathBuf,

        /// Ship name whose module ambiguity is known and accepted (repeatable).
        #[arg(long)]
        ignore: Vec<String>,
    },

    /// Print the module lines of a ship as JSON.
    Lines {
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        ship: String,

        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },

    /// Print the stats of an equipped ship as JSON.
    Stats {
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        ship: String,

        /// Equip descriptor, e.g. "top" or "engine: stock, others: top".
        #[arg(long, default_value = "stock")]
        descriptor: String,

        /// Modifier target table (JSON); defaults to the built-in one.
        #[arg(long)]
        targets: Option<PathBuf>,

        /// Modernization to equip (repeatable).
        #[arg(long)]
        modernization: Vec<String>,

        #[arg(long)]
        camouflage: Option<String>,

        #[arg(long)]
        captain: Option<String>,

        /// Captain skill to learn (repeatable).
        #[arg(long, requires = "captain")]
        skill: Vec<String>,

        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Validate { data, ignore } => {
            let corpus = load_corpus(&data)?;
            assert_invariants(&corpus, &InvariantOptions::ignoring(ignore))?;
            println!("All invariants hold for {} objects", corpus.len());
        }
        Commands::Lines { data, ship, out } => {
            let corpus = load_corpus(&data)?;
            let mut ship = corpus
                .ship(&ship, "stock", Arc::new(ModifierTargets::default()))
                .with_context(|| format!("building ship {}", ship))?;
            let report = report::lines_report(&mut ship)?;
            emit(&serde_json::to_string_pretty(&report)?, out.as_deref())?;
        }
        Commands::Stats {
            data,
            ship,
            descriptor,
            targets,
            modernization,
            camouflage,
            captain,
            skill,
            out,
        } => {
            let corpus = load_corpus(&data)?;
            let targets = match targets {
                Some(path) => ModifierTargets::from_path(&path)
                    .with_context(|| format!("loading modifier targets {}", path.display()))?,
                None => ModifierTargets::default(),
            };
            let mut ship = corpus
                .ship(&ship, &descriptor, Arc::new(targets))
                .with_context(|| format!("equipping {} with {:?}", ship, descriptor))?;

            for key in &modernization {
                let m = corpus.modernization(key)?;
                if !ship.equip_modernization(&m)? {
                    bail!("{} cannot be equipped on {}", key, ship.name());
                }
            }
            if let Some(key) = &captain {
                let mut c = corpus.captain(key)?;
                for name in &skill {
                    if !c.learn(name) {
                        bail!("captain {} has no skill {}", key, name);
                    }
                }
                ship.set_captain(Some(c))?;
            }
            if let Some(key) = &camouflage {
                let c = corpus.camouflage(key)?;
                if !ship.set_camouflage(Some(c))? {
                    bail!("{} is not available for {}", key, ship.name());
                }
            }

            let report = report::stats_report(&ship);
            emit(&serde_json::to_string_pretty(&report)?, out.as_deref())?;
        }
    }

    Ok(())
}

fn load_corpus(path: &Path) -> Result<Corpus> {
    let corpus =
        Corpus::from_path(path).with_context(|| format!("loading corpus {}", path.display()))?;
    info!("loaded {} objects from {}", corpus.len(), path.display());
    Ok(corpus)
}

fn emit(json: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
