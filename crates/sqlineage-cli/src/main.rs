use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqlineage_cli::{load_lineage, serve, Toolbox};
use sqlineage_core::Config;
use sqlineage_lineage::SharedRegistry;

/// sqlineage - SQLite toolbox with field lineage tracking
#[derive(Parser)]
#[command(name = "sqlineage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlineage.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file of lineage records to declare before running
    #[arg(short, long, global = true)]
    lineage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer newline-delimited JSON tool requests on stdin/stdout
    Serve,

    /// Run a single tool and print its output
    Call {
        /// Tool name, e.g. describe_table
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },

    /// Report table and field references in a query
    Analyze {
        /// SQL text to analyze
        sql: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    init_tracing(&config, cli.verbose);

    let registry = match &cli.lineage {
        Some(path) => {
            let registry = load_lineage(path)?;
            if cli.verbose {
                eprintln!("{} {} lineage records", "Loaded".green(), registry.len());
            }
            registry
        }
        None => SharedRegistry::new(),
    };
    let toolbox = Toolbox::new(config, registry)?;

    let result = match cli.command {
        Commands::Serve => serve_command(&toolbox, cli.verbose),
        Commands::Call { tool, args } => call_command(&toolbox, &tool, args.as_deref()),
        Commands::Analyze { sql } => {
            println!("{}", toolbox.lineage().analyze_query(&sql));
            Ok(())
        }
    };

    toolbox.close();
    result
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(config_path) = path {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else if Path::new("sqlineage.toml").exists() {
        Config::from_file(Path::new("sqlineage.toml"))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if verbose {
        eprintln!(
            "{} csv delimiter {:?}, {} sample rows",
            "Using".cyan(),
            config.csv.delimiter,
            config.sample_data.default_rows
        );
    }

    Ok(config)
}

/// Logs go to stderr; stdout belongs to tool output
fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn serve_command(toolbox: &Toolbox, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{}", "Serving tool requests on stdin...".cyan());
    }
    tracing::info!("starting tool session");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(toolbox, stdin.lock(), stdout.lock())?;
    Ok(())
}

fn call_command(toolbox: &Toolbox, tool: &str, args: Option<&str>) -> Result<()> {
    let arguments = args
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--args must be valid JSON")?;

    let output = toolbox
        .call(tool, arguments)
        .with_context(|| format!("Invalid call to {}", tool))?;
    println!("{}", output);
    Ok(())
}
