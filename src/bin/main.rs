//! semquery CLI - Compile semantic query documents to SQL
//!
//! Usage:
//!   semquery compile <query.json|-> [-d NAME=PATH]... [--explain] [--format sql|json] [--bind] [--strict]
//!   semquery validate <query.json|-> [-d NAME=PATH]...
//!   semquery datasets [-d NAME=PATH]...
//!
//! Examples:
//!   semquery compile query.json -d orders_ds=orders_ds.json
//!   echo '{"dataset": "orders_ds", "measures": ["total_revenue"]}' | semquery compile - --bind --format json

use clap::{Args, Parser, Subcommand, ValueEnum};
use semquery::config::Settings;
use semquery::engine::SemanticEngine;
use semquery::parser;
use semquery::sql::LiteralMode;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "semquery")]
#[command(about = "semquery - Compile JSON semantic queries over registered datasets to SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a semantic query to SQL
    Compile {
        /// Path to the query document, or - for stdin
        query: String,

        #[command(flatten)]
        common: CommonArgs,

        /// Return the SQL as an explain response
        #[arg(long)]
        explain: bool,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        format: OutputFormat,

        /// Emit $n placeholders and return values separately
        #[arg(long)]
        bind: bool,

        /// Fail on unknown operators, granularities and empty filters
        #[arg(long)]
        strict: bool,
    },

    /// Validate a semantic query without generating SQL
    Validate {
        /// Path to the query document, or - for stdin
        query: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List registered datasets
    Datasets {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Register a dataset document: NAME=PATH (repeatable)
    #[arg(short = 'd', long = "dataset", value_name = "NAME=PATH")]
    datasets: Vec<String>,

    /// Config file (defaults to $SEMQUERY_CONFIG, ./semquery.toml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// SQL statement only
    Sql,
    /// JSON object with sql, schema and params
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            query,
            common,
            explain,
            format,
            bind,
            strict,
        } => cmd_compile(&query, &common, explain, format, bind, strict),
        Commands::Validate { query, common } => cmd_validate(&query, &common),
        Commands::Datasets { common } => cmd_datasets(&common),
    }
}

fn cmd_compile(
    query: &str,
    common: &CommonArgs,
    explain: bool,
    format: OutputFormat,
    bind: bool,
    strict: bool,
) -> ExitCode {
    let Some(mut settings) = load_settings(common) else {
        return ExitCode::FAILURE;
    };
    if bind {
        settings.compiler.literal_mode = LiteralMode::Bind;
    }
    settings.compiler.strict |= strict;

    let Some(engine) = build_engine(&settings, common) else {
        return ExitCode::FAILURE;
    };
    let Some(text) = read_query(query) else {
        return ExitCode::FAILURE;
    };

    let response = match engine.semantic_query(&text, explain) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Sql => println!("{}", response.sql()),
        OutputFormat::Json => match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn cmd_validate(query: &str, common: &CommonArgs) -> ExitCode {
    let Some(settings) = load_settings(common) else {
        return ExitCode::FAILURE;
    };
    let Some(engine) = build_engine(&settings, common) else {
        return ExitCode::FAILURE;
    };
    let Some(text) = read_query(query) else {
        return ExitCode::FAILURE;
    };

    let options = engine.options();
    let result = parser::parse_with(&text, options.parse)
        .map_err(|e| e.to_string())
        .and_then(|q| {
            engine
                .registry()
                .validate_with(&q, options.validate)
                .map_err(|e| e.to_string())
        });

    match result {
        Ok(()) => {
            println!("OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_datasets(common: &CommonArgs) -> ExitCode {
    let Some(settings) = load_settings(common) else {
        return ExitCode::FAILURE;
    };
    let Some(engine) = build_engine(&settings, common) else {
        return ExitCode::FAILURE;
    };

    let registry = engine.registry();
    if registry.is_empty() {
        println!("No datasets registered");
        return ExitCode::SUCCESS;
    }

    println!("Datasets:");
    for name in registry.names() {
        if let Some(dataset) = registry.get(&name) {
            println!(
                "  {} ({} measures, {} dimensions)",
                name,
                dataset.measures.len(),
                dataset.dimensions.len()
            );
        }
    }

    ExitCode::SUCCESS
}

/// Load settings and install the log subscriber.
fn load_settings(common: &CommonArgs) -> Option<Settings> {
    let result = match &common.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };

    let settings = match result {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return None;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Some(settings)
}

/// Engine with configured datasets preloaded, then `-d` datasets on top.
fn build_engine(settings: &Settings, common: &CommonArgs) -> Option<SemanticEngine> {
    let engine = SemanticEngine::new(settings.engine_options());

    if let Err(e) = settings.preload(&engine) {
        eprintln!("Error: {}", e);
        return None;
    }

    for spec in &common.datasets {
        let Some((name, path)) = spec.split_once('=') else {
            eprintln!("Error: dataset must be NAME=PATH, got '{}'", spec);
            return None;
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return None;
            }
        };
        match engine.register_dataset(name, &text) {
            Ok(summary) => tracing::info!("{}", summary),
            Err(e) => {
                eprintln!("Error: {}", e);
                return None;
            }
        }
    }

    Some(engine)
}

fn read_query(query: &str) -> Option<String> {
    if query == "-" {
        let mut text = String::new();
        return match std::io::stdin().read_to_string(&mut text) {
            Ok(_) => Some(text),
            Err(e) => {
                eprintln!("Error reading stdin: {}", e);
                None
            }
        };
    }

    match fs::read_to_string(query) {
        Ok(text) => Some(text),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", query, e);
            None
        }
    }
}
