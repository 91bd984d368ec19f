use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use ibgematch::config::{get_config_path, save_config, AppConfig};
use ibgematch::errors::IbgeMatchError;
use ibgematch::normalize::normalize;
use ibgematch::pipeline::{Pipeline, RunOptions};
use ibgematch::submit::{display_score, score};

/// Resolve municipality names against the IBGE registry.
#[derive(Parser)]
#[command(
    name = "ibgematch",
    about = "Resolve municipality names against the IBGE registry"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default ibgematch.toml
    Init {
        /// Project path (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
    /// Resolve the input CSV, write the result CSV, and submit the statistics
    Run {
        /// Project path (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
        /// Input CSV (default: from config)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Result CSV (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Access token for the grading endpoint
        #[arg(long)]
        token: Option<String>,
        /// Skip submitting the statistics
        #[arg(long)]
        no_submit: bool,
        /// Refetch the registry instead of using the cache
        #[arg(long)]
        refresh: bool,
    },
    /// Resolve ad-hoc names
    Resolve {
        /// Names to resolve
        #[arg(required = true)]
        names: Vec<String>,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
        /// Refetch the registry instead of using the cache
        #[arg(long)]
        refresh: bool,
    },
    /// Refetch the registry and rewrite the cache
    Fetch {
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Print the normalized comparison key of each argument
    Normalize {
        /// Text to normalize
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr; `IBGEMATCH_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("IBGEMATCH_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("ibgematch=debug")
        } else {
            EnvFilter::new("ibgematch=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> ibgematch::errors::Result<()> {
    match cli.command {
        Commands::Init { path, force } => {
            let project_path = resolve_path(path);
            let config_path = get_config_path(&project_path);
            if config_path.exists() && !force {
                return Err(IbgeMatchError::Config {
                    message: format!(
                        "'{}' already exists; use --force to overwrite",
                        config_path.display()
                    ),
                });
            }
            save_config(&project_path, &AppConfig::default())?;
            println!("Wrote {}", config_path.display());
        }
        Commands::Run {
            path,
            input,
            output,
            token,
            no_submit,
            refresh,
        } => {
            let project_path = resolve_path(path);
            let pipeline = Pipeline::open(&project_path)?;
            let summary = pipeline.run(&RunOptions {
                input,
                output,
                refresh,
            })?;

            println!("resultado.csv gerado em: {}", summary.output_path.display());
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "stats": summary.stats }))?
            );
            if !summary.registry_available {
                eprintln!("Warning: registry unavailable; every row was reported as ERRO_API");
            }

            if no_submit {
                println!("Modo --no-submit (não enviou para correção).");
                return Ok(());
            }

            let token = pipeline.access_token(token.as_deref()).ok_or_else(|| {
                IbgeMatchError::Config {
                    message: "missing ACCESS_TOKEN (set ACCESS_TOKEN=... or pass --token=...)"
                        .to_string(),
                }
            })?;

            let response = pipeline.submit(&summary.stats, &token)?;
            println!("Resposta da correção:");
            println!("{}", serde_json::to_string_pretty(&response)?);
            if let Some(score) = score(&response) {
                println!("\nSCORE: {}", display_score(score));
            }
        }
        Commands::Resolve {
            names,
            path,
            json,
            refresh,
        } => {
            let project_path = resolve_path(path);
            let pipeline = Pipeline::open(&project_path)?;
            let results = pipeline.resolve_names(&names, refresh)?;

            if json {
                let values: Vec<serde_json::Value> = results
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "query": r.query,
                            "key": r.key,
                            "status": r.status.as_str(),
                            "method": r.method.map(|m| m.as_str()),
                            "entry": r.entry,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for r in &results {
                    match &r.entry {
                        Some(entry) => println!(
                            "{} [{}] -> {} ({}) - {}/{} #{}",
                            r.query,
                            r.key,
                            r.status.as_str(),
                            r.method.map(|m| m.as_str()).unwrap_or("candidate"),
                            entry.display_name,
                            entry.region_code,
                            entry.id
                        ),
                        None => println!("{} [{}] -> {}", r.query, r.key, r.status.as_str()),
                    }
                }
            }
        }
        Commands::Fetch { path } => {
            let project_path = resolve_path(path);
            let pipeline = Pipeline::open(&project_path)?;
            let count = pipeline.refresh_registry()?;
            println!("Fetched {} municipalities", count);
        }
        Commands::Normalize { text } => {
            for t in &text {
                println!("{}", normalize(t));
            }
        }
    }
    Ok(())
}

/// Resolves an optional path argument to a `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
