mod classify;
mod runs;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "icpe-cli")]
#[command(about = "ICPE rubrique enrichment command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape facility pages and store their classified rubriques
    Scrape {
        /// Facilities per chunk (defaults to `ICPE_SCRAPER_CHUNK_SIZE`)
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Concurrent page fetches (defaults to `ICPE_SCRAPER_MAX_CONCURRENT`)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Stop after this many facilities
        #[arg(long)]
        limit: Option<usize>,
        /// Scrape and report counts without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Look up the classification of a rubrique code
    Classify {
        /// Rubrique code (e.g. 2710)
        code: String,
        /// Alinea (e.g. 1a)
        sub_code: Option<String>,
        /// Classification table to use instead of the embedded one
        #[arg(long, env = "ICPE_RUBRIQUES_PATH")]
        table: Option<PathBuf>,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// List recent scrape runs
    Runs {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("icpe-cli: no command given, see --help");
        return Ok(());
    };

    match command {
        Commands::Classify {
            code,
            sub_code,
            table,
        } => {
            // Lookups need neither the database nor the full config.
            init_tracing("warn", LogFormat::Text)?;
            classify::run_classify(&code, sub_code.as_deref(), table.as_deref())?;
        }
        Commands::Scrape {
            chunk_size,
            concurrency,
            limit,
            dry_run,
        } => {
            let (config, pool) = bootstrap().await?;
            let options =
                scrape::ScrapeOptions::resolve(&config, chunk_size, concurrency, limit, dry_run);
            scrape::run_scrape(&pool, &config, options).await?;
        }
        Commands::Db { command } => {
            let (_, pool) = bootstrap().await?;
            match command {
                DbCommands::Migrate => {
                    let applied = icpe_db::run_migrations(&pool).await?;
                    println!("applied {applied} migrations");
                }
                DbCommands::Ping => {
                    icpe_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
        }
        Commands::Runs { limit } => {
            let (_, pool) = bootstrap().await?;
            runs::run_list_runs(&pool, limit).await?;
        }
    }

    Ok(())
}

/// Loads config, installs logging, and connects the pool.
async fn bootstrap() -> anyhow::Result<(icpe_core::AppConfig, sqlx::PgPool)> {
    let config = icpe_core::load_app_config()?;
    init_tracing(&config.log_level, LogFormat::for_env(&config.env))?;
    tracing::debug!(?config, "configuration loaded");

    let pool_config = icpe_db::PoolConfig::from_app_config(&config);
    let pool = icpe_db::connect_pool(&config.database_url, pool_config).await?;
    Ok((config, pool))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// JSON in production, human-readable text elsewhere.
    fn for_env(env: &icpe_core::Environment) -> Self {
        match env {
            icpe_core::Environment::Production => LogFormat::Json,
            icpe_core::Environment::Development | icpe_core::Environment::Test => LogFormat::Text,
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`.
fn init_tracing(default_directive: &str, format: LogFormat) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

/// Marks a run as failed, logging rather than propagating a secondary error
/// so the original failure is what surfaces.
pub(crate) async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: &str) {
    if let Err(mark_err) = icpe_db::fail_scrape_run(pool, run_id, message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark scrape run as failed"
        );
    }
}
