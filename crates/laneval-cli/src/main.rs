//! laneval - requirement-driven lanelet map validation
//!
//! ## Modes
//!
//! - `--print`: list the available checks matching `--validator` and exit
//! - `--input_requirements`: run a requirement set against `--map_file`,
//!   print the requirement summary and optionally write the output document
//! - otherwise: run every check matching `--validator` against the map and
//!   print all issues
//!
//! The process exits unsuccessfully when any warning or error was found.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use laneval_core::{
    render_detected_issues, validate_map, FaultPolicy, LaneletMap, OrchestratorConfig,
    RequirementOrchestrator, RequirementSpec, ValidationConfig, ValidatorCatalog,
};

#[derive(Parser, Debug)]
#[command(name = "laneval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Requirement-driven validation of lanelet maps", long_about = None)]
struct Cli {
    /// Map document to validate (JSON)
    #[arg(short = 'm', long = "map_file", env = "LANEVAL_MAP")]
    map_file: Option<PathBuf>,

    /// Requirement set to validate the map against (JSON)
    #[arg(short = 'i', long = "input_requirements", env = "LANEVAL_REQUIREMENTS")]
    input_requirements: Option<PathBuf>,

    /// Directory to write lanelet2_validation_results.json into
    #[arg(short = 'o', long = "output_directory", env = "LANEVAL_OUTPUT_DIR")]
    output_directory: Option<PathBuf>,

    /// Regex selecting checks for direct validation and --print
    #[arg(short = 'v', long = "validator")]
    validator: Option<String>,

    /// List the available checks and exit
    #[arg(short = 'p', long = "print")]
    print: bool,

    /// What to do when a check cannot run: contain or abort
    #[arg(long, env = "LANEVAL_FAULT_POLICY", default_value_t = FaultPolicy::Contain)]
    fault_policy: FaultPolicy,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            checks_filter: self.validator.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    laneval_core::init_tracing(cli.json, level);

    match run(&cli, &ValidatorCatalog::with_builtin()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch on the selected mode. Returns whether the map is clean.
fn run(cli: &Cli, catalog: &ValidatorCatalog) -> Result<bool> {
    let config = cli.validation_config();

    if cli.print {
        print!("{}", cmd_print(catalog, &config)?);
        return Ok(true);
    }

    let map_path = cli
        .map_file
        .as_deref()
        .context("No map file is given (use --map_file)")?;
    let map = load_map(map_path)?;

    match cli.input_requirements.as_deref() {
        Some(requirements) => cmd_requirements(
            catalog,
            &map,
            requirements,
            cli.output_directory.as_deref(),
            cli.fault_policy,
        ),
        None => cmd_direct(catalog, &map, &config, cli.fault_policy),
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("{what} not found: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("{what} is not a file: {}", path.display());
    }
    Ok(())
}

fn load_map(path: &Path) -> Result<LaneletMap> {
    require_file(path, "Map file")?;
    let map = LaneletMap::from_path(path)
        .with_context(|| format!("Failed to load map {}", path.display()))?;
    info!(map = %path.display(), "map loaded");
    Ok(map)
}

fn cmd_print(catalog: &ValidatorCatalog, config: &ValidationConfig) -> Result<String> {
    let names = catalog
        .available_names(config)
        .context("Invalid --validator pattern")?;

    if names.is_empty() {
        let pattern = config.checks_filter.as_deref().unwrap_or_default();
        return Ok(format!("No checks found matching to '{pattern}'\n"));
    }

    let mut out = String::from("The following checks are available:\n");
    for name in names {
        out.push_str(&name);
        out.push('\n');
    }
    Ok(out)
}

fn cmd_requirements(
    catalog: &ValidatorCatalog,
    map: &LaneletMap,
    requirements: &Path,
    output_directory: Option<&Path>,
    fault_policy: FaultPolicy,
) -> Result<bool> {
    require_file(requirements, "Requirement file")?;
    let spec = RequirementSpec::from_path(requirements)
        .with_context(|| format!("Failed to load requirements {}", requirements.display()))?;

    let report = RequirementOrchestrator::new(catalog, OrchestratorConfig { fault_policy })
        .run(spec, map)
        .context("Validation aborted")?;

    print!("{}", report.render_summary());

    if let Some(dir) = output_directory {
        let path = report
            .write_output(dir)
            .with_context(|| format!("Failed to write results to {}", dir.display()))?;
        println!("Results are output to {}", path.display());
    }

    Ok(report.is_success())
}

fn cmd_direct(
    catalog: &ValidatorCatalog,
    map: &LaneletMap,
    config: &ValidationConfig,
    fault_policy: FaultPolicy,
) -> Result<bool> {
    let detected =
        validate_map(catalog, map, config, fault_policy).context("Validation aborted")?;
    print!("{}", render_detected_issues(&detected));
    Ok(laneval_core::detected_totals(&detected).is_clean())
}
