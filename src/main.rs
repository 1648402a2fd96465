//! sbom-vet: SBOM format detection and validation tool
//!
//! Classifies `CycloneDX` and SPDX documents against a format registry and
//! validates them with JSON Schema conformance and custom rules.

#![allow(clippy::too_many_lines)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_vet::cli;
use sbom_vet::config::{AppConfig, AppConfigBuilder};
use sbom_vet::reports::ReportFormat;
use sbom_vet::validation::UniquenessScope;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nBuilt-in format registry:",
        "\n  CycloneDX: 1.2, 1.3, 1.4, 1.5, 1.6 (JSON)",
        "\n  SPDX:      2.2, 2.3 (JSON)",
        "\n\nReport formats:",
        "\n  text, json, csv, markdown"
    )
}

#[derive(Parser)]
#[command(name = "sbom-vet")]
#[command(version, long_version = build_long_version())]
#[command(about = "SBOM format detection and validation tool", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Every input was valid
    1  Application error (configuration or internal failure)
    2  Validation findings (violations, conformance errors, unknown formats)

EXAMPLES:
    # Validate one SBOM with the built-in registry
    sbom-vet validate bom.cdx.json

    # Batch validation with custom rules, JSON report to a file
    sbom-vet validate --rules rules.json -o report.json fleet/*.json

    # Extract component names and versions
    sbom-vet query bom.cdx.json --select name,version --from components

    # License inventory with policy rulings
    sbom-vet license list bom.cdx.json --policy")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags available on every subcommand
#[derive(clap::Args)]
struct GlobalArgs {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Format registry file (defaults to the built-in registry)
    #[arg(long, global = true, env = "SBOM_VET_REGISTRY")]
    registry: Option<PathBuf>,

    /// Custom validation rules file
    #[arg(long, global = true, env = "SBOM_VET_RULES")]
    rules: Option<PathBuf>,

    /// License policy file (defaults to the built-in table)
    #[arg(long, global = true, env = "SBOM_VET_POLICIES")]
    policies: Option<PathBuf>,

    /// Output file path (stdout if not specified)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output format (auto picks by output file extension)
    #[arg(long, global = true, default_value = "auto")]
    format: ReportFormat,
}

// ============================================================================
// Command argument structs (extracted for readability)
// ============================================================================

/// Arguments for the `validate` subcommand
#[derive(Parser)]
struct ValidateArgs {
    /// Paths to the SBOM files to validate
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Force one schema file for the conformance stage of every input
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Base directory for registry-declared schema files
    #[arg(long)]
    schema_dir: Option<PathBuf>,

    /// Skip the JSON-Schema conformance stage
    #[arg(long)]
    skip_conformance: bool,

    /// Evaluate custom rules even when format detection fails
    #[arg(long)]
    rules_only: bool,

    /// Pooling scope for uniqueness rules (overrides the rules file)
    #[arg(long, value_enum)]
    uniqueness_scope: Option<UniquenessScope>,

    /// Stop the batch at the first document that is not valid
    #[arg(long)]
    fail_fast: bool,
}

/// Arguments for the `query` subcommand
#[derive(Parser)]
struct QueryArgs {
    /// Path to the SBOM file
    file: PathBuf,

    /// Fields to project, comma-separated, or `*` for everything
    #[arg(long, default_value = "*")]
    select: String,

    /// Dot-separated key path to walk before selecting
    #[arg(long, default_value = "")]
    from: String,

    /// Filter array entries: comma-separated `key=regex` predicates
    #[arg(long = "where", value_name = "PREDICATES")]
    where_clause: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more SBOMs (detection, conformance, custom rules)
    Validate(ValidateArgs),

    /// Extract a sub-tree from an SBOM with SELECT/FROM/WHERE clauses
    Query(QueryArgs),

    /// Inspect license declarations and the license policy table
    License {
        #[command(subcommand)]
        action: LicenseAction,
    },

    /// Inspect the format registry
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Sub-subcommands for the `license` command
#[derive(Subcommand)]
enum LicenseAction {
    /// List license declarations found in a document
    List {
        /// Path to the SBOM file
        file: PathBuf,

        /// Join each declaration with the policy table ruling
        #[arg(long)]
        policy: bool,
    },
    /// Print the loaded license policy table
    Policy,
}

/// Sub-subcommands for the `schema` command
#[derive(Subcommand)]
enum SchemaAction {
    /// List the registry's format/version descriptors in declaration order
    List,
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .sbom-vet.yaml in the current directory
    Init,
    /// Print the JSON Schema for the config file format
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; reports go to stdout, logs to stderr
    let log_level = if cli.global.quiet {
        "warn"
    } else {
        match cli.global.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Validate(args) => {
            let overrides = global_overrides(&cli.global)
                .schema_dir(args.schema_dir)
                .uniqueness_scope(args.uniqueness_scope)
                .skip_conformance(args.skip_conformance)
                .rules_only(args.rules_only)
                .fail_fast(args.fail_fast)
                .build();
            let config = effective_config(&cli.global, &overrides);

            let options = cli::ValidateOptions {
                paths: args.files,
                schema: args.schema,
            };
            let exit_code = cli::run_validate(&config, &options)?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }

        Commands::Query(args) => {
            let config = effective_config(&cli.global, &global_overrides(&cli.global).build());
            let options = cli::QueryOptions {
                select: args.select,
                from: args.from,
                where_clause: args.where_clause,
            };
            cli::run_query(&config, &args.file, &options)
        }

        Commands::License { ref action } => {
            let config = effective_config(&cli.global, &global_overrides(&cli.global).build());
            match action {
                LicenseAction::List { file, policy } => {
                    cli::run_license_list(&config, file, *policy)
                }
                LicenseAction::Policy => cli::run_license_policy(&config),
            }
        }

        Commands::Schema { action: SchemaAction::List } => {
            let config = effective_config(&cli.global, &global_overrides(&cli.global).build());
            cli::run_schema_list(&config)
        }

        Commands::Config { ref action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    sbom_vet::config::load_or_default(cli.global.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml =
                    serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    dirs::config_dir().map(|p| p.join("sbom-vet").display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!("  (plus the enclosing git repository root, if any)");
                eprintln!();
                eprintln!("Recognized file names:");
                for name in sbom_vet::config::file::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match sbom_vet::config::discover_config_file(cli.global.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".sbom-vet.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = sbom_vet::config::generate_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
            ConfigAction::Schema => {
                let schema = sbom_vet::config::generate_json_schema();
                match &cli.global.output {
                    Some(path) => {
                        std::fs::write(path, &schema)
                            .with_context(|| format!("failed to write {}", path.display()))?;
                        eprintln!("Schema written to {}", path.display());
                    }
                    None => {
                        println!("{schema}");
                    }
                }
                Ok(())
            }
        },

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbom-vet", &mut io::stdout());
            Ok(())
        }
    }
}

/// Overrides shared by every subcommand, built from the global flags.
fn global_overrides(global: &GlobalArgs) -> AppConfigBuilder {
    AppConfig::builder()
        .registry(global.registry.clone())
        .rules(global.rules.clone())
        .policies(global.policies.clone())
        .output_format(global.format)
        .output_file(global.output.clone())
        .no_color(global.no_color)
        .quiet(global.quiet)
}

/// Layer file-based settings under the flags given on the command line.
fn effective_config(global: &GlobalArgs, overrides: &AppConfig) -> AppConfig {
    let (config, loaded_from) =
        AppConfig::from_file_with_overrides(global.config.as_deref(), overrides);
    match &loaded_from {
        Some(path) => tracing::debug!(config = %path.display(), "using configuration file"),
        None => tracing::debug!("no configuration file found, using defaults"),
    }
    config
}
