use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cql_criteria::config::{CliOverrides, CompilerConfig, DurationToPolicy};
use cql_criteria::{compile, Ast, TypeCatalog};

/// cqlc - compile a parsed CQL expression into filter criteria
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Type catalog describing the queryable entities (YAML)
    #[arg(long)]
    catalog: PathBuf,

    /// Entity the expression filters
    #[arg(long)]
    root_type: String,

    /// Parsed CQL expression (JSON node arena)
    #[arg(long)]
    ast: PathBuf,

    /// Compiler configuration file (YAML); environment variables are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum expression nesting depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Handling of `during duration D to Y` timespans
    #[arg(long, value_enum)]
    duration_to_policy: Option<DurationToPolicy>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        CliOverrides {
            max_expression_depth: cli.max_depth,
            duration_to_policy: cli.duration_to_policy,
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => CompilerConfig::from_yaml_file(path)
            .with_context(|| format!("loading compiler config {}", path.display()))?,
        None => CompilerConfig::from_env().context("reading compiler config from environment")?,
    };
    config.merge(cli.into()).context("applying command-line overrides")?;
    log::debug!("cqlc: using {:?}", config);

    let catalog = TypeCatalog::from_yaml_file(&cli.catalog)
        .with_context(|| format!("loading type catalog {}", cli.catalog.display()))?;

    let json = std::fs::read_to_string(&cli.ast)
        .with_context(|| format!("reading AST {}", cli.ast.display()))?;
    let ast = Ast::from_json(&json).with_context(|| format!("parsing AST {}", cli.ast.display()))?;

    let criteria = compile(&ast, &cli.root_type, &catalog, &config)?;
    println!("{}", serde_json::to_string_pretty(&criteria)?);
    Ok(())
}
