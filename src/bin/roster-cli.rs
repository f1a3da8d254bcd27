#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rostering::{
    io,
    render::{ReportRenderer, TextSummary},
    storage::{JsonStorage, Storage},
    CancellationToken, DateRange, EngineConfig, Scheduler,
};
use std::time::Duration;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de planning (instantané JSON, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de l'instantané
    #[arg(long, global = true, default_value = "snapshot.json")]
    snapshot: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer un planning sur une période
    Generate {
        /// AAAA-MM-JJ, inclus
        #[arg(long)]
        start: String,
        /// AAAA-MM-JJ, inclus
        #[arg(long)]
        end: String,
        /// Réglages du moteur (JSON)
        #[arg(long)]
        config: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Résultat JSON
        #[arg(long)]
        out: Option<String>,
        /// Affectations CSV
        #[arg(long)]
        csv: Option<String>,
        /// Délai maximal en millisecondes
        #[arg(long)]
        deadline_ms: Option<u64>,
        /// Liste chaque affectation
        #[arg(long)]
        detailed: bool,
    },

    /// Vérifier un résultat contre l'instantané
    Check {
        #[arg(long)]
        result: String,
    },

    /// Importer du personnel depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Importer des congés depuis un CSV
    ImportLeave {
        #[arg(long)]
        csv: String,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.snapshot)?;

    let code = match cli.cmd {
        Commands::Generate {
            start,
            end,
            config,
            seed,
            out,
            csv,
            deadline_ms,
            detailed,
        } => {
            let snapshot = storage.load()?;
            let period = DateRange::new(parse_date(&start)?, parse_date(&end)?)?;
            let mut config = match config {
                Some(path) => EngineConfig::from_path(path)?,
                None => EngineConfig::default(),
            };
            if seed.is_some() {
                config.tie_break_seed = seed;
            }
            let mut cancel = CancellationToken::new();
            if let Some(ms) = deadline_ms {
                cancel = cancel.with_timeout(Duration::from_millis(ms));
            }

            let scheduler = Scheduler::new(config);
            let result = scheduler.generate_with_cancel(&snapshot, period, &cancel)?;

            if let Some(path) = out {
                io::export_result_json(path, &result)?;
            }
            if let Some(path) = csv {
                io::export_assignments_csv(path, &result)?;
            }
            print!("{}", TextSummary { detailed }.render(&snapshot, &result));

            if result.report.violations.is_empty() {
                0
            } else {
                3
            }
        }
        Commands::Check { result } => {
            let snapshot = storage.load()?;
            let result = io::load_result_json(result)?;
            let conflicts = rostering::verify(&snapshot, &result);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                for c in &conflicts {
                    println!("{:?}: {}", c.kind, c.detail);
                }
                2
            }
        }
        Commands::ImportStaff { csv } => {
            let staff = io::import_staff_csv(csv)?;
            if staff.is_empty() {
                bail!("no staff rows found");
            }
            let count = staff.len();
            let mut snapshot = storage.load_or_default()?;
            io::merge_staff(&mut snapshot, staff);
            storage.save(&snapshot)?;
            println!("imported {count} staff into {}", storage.path().display());
            0
        }
        Commands::ImportLeave { csv } => {
            let leave = io::import_leave_csv(csv)?;
            let count = leave.len();
            let mut snapshot = storage.load_or_default()?;
            io::merge_leave(&mut snapshot, leave);
            storage.save(&snapshot)?;
            println!("imported {count} leave requests into {}", storage.path().display());
            0
        }
    };

    std::process::exit(code);
}
