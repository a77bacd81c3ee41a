//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use titlescout_core::pipeline::{self, RunConfig};
use titlescout_core::progress::ProgressReporter;
use titlescout_core::report;
use titlescout_core::summary::RunSummary;
use titlescout_geocode::CensusGeocoder;
use titlescout_owners::CountyRecordsProvider;
use titlescout_shared::{
    AppConfig, EnrichmentOutcome, GeocodeConfig, OwnerLookupConfig, TableConfig, TargetField,
    init_config, load_config, validate_geocoder, validate_owner_lookup,
};
use titlescout_table::AddressTable;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// TitleScout — fill in county names and title owners for property records.
#[derive(Parser)]
#[command(
    name = "titlescout",
    version,
    about = "Enrich property-record CSVs with county names and recorded title owners.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the enrichment pipeline over a CSV file.
    Enrich {
        /// Input CSV path.
        input: String,

        /// Output CSV path (defaults to `<input>_enriched.csv`).
        #[arg(short, long)]
        output: Option<String>,

        /// Skip the county (geocoding) phase.
        #[arg(long)]
        skip_county: bool,

        /// Skip the owner (scraping) phase.
        #[arg(long)]
        skip_owner: bool,
    },

    /// Analyze a CSV file: totals, missing fields, top counties/cities/zips.
    Analyze {
        /// CSV path to analyze.
        file: String,

        /// Also write the analysis as JSON to this path.
        #[arg(long)]
        json: Option<String>,
    },

    /// Compare an original CSV against its enriched output.
    Compare {
        /// Original CSV path.
        original: String,

        /// Updated CSV path.
        updated: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "titlescout=info",
        1 => "titlescout=debug",
        _ => "titlescout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich {
            input,
            output,
            skip_county,
            skip_owner,
        } => cmd_enrich(&input, output.as_deref(), skip_county, skip_owner).await,
        Command::Analyze { file, json } => cmd_analyze(&file, json.as_deref()),
        Command::Compare { original, updated } => cmd_compare(&original, &updated),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// enrich
// ---------------------------------------------------------------------------

async fn cmd_enrich(
    input: &str,
    output: Option<&str>,
    skip_county: bool,
    skip_owner: bool,
) -> Result<()> {
    let config = load_config()?;
    validate_geocoder(&config)?;
    validate_owner_lookup(&config)?;

    let input_path = PathBuf::from(input);
    if !input_path.exists() {
        return Err(eyre!("input file not found: {input}"));
    }

    let output_path = match output {
        Some(p) => PathBuf::from(p),
        None => default_output_path(&input_path),
    };

    let geocode_config = GeocodeConfig::from(&config);
    let owner_config = OwnerLookupConfig::from(&config);

    let run_config = RunConfig {
        input: input_path,
        output: output_path.clone(),
        table: TableConfig::from(&config),
        geocode_delay_secs: geocode_config.delay_secs,
        owner_delay_secs: owner_config.delay_secs,
        skip_county,
        skip_owner,
    };

    let geocoder = CensusGeocoder::new(&geocode_config)?;
    let mut owners = CountyRecordsProvider::new(&owner_config);

    info!(input, skip_county, skip_owner, "starting enrichment");

    let reporter = CliProgress::new();
    let summary = pipeline::run(&run_config, &geocoder, &mut owners, &reporter).await?;

    println!();
    println!("  Enrichment complete!");
    println!("  Rows:    {}", summary.total_rows);
    println!(
        "  County:  {}/{} resolved ({} already complete)",
        summary.county.resolved, summary.county.candidates, summary.county.already_complete
    );
    println!(
        "  Owner:   {}/{} resolved ({} already complete)",
        summary.owner.resolved, summary.owner.candidates, summary.owner.already_complete
    );
    println!("  Output:  {}", output_path.display());
    println!("  Time:    {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// Derive `<stem>_enriched.csv` next to the input file.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}_enriched.csv"))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn record(
        &self,
        field: TargetField,
        current: usize,
        total: usize,
        outcome: &EnrichmentOutcome,
    ) {
        let mark = if outcome.is_resolved() { "✓" } else { "✗" };
        self.spinner
            .set_message(format!("{field} [{current}/{total}] {mark}"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// analyze / compare
// ---------------------------------------------------------------------------

fn cmd_analyze(file: &str, json_out: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let table = AddressTable::load(Path::new(file), &TableConfig::from(&config))?;
    let analysis = report::analyze(&table);

    println!();
    println!("  Property data analysis — {file}");
    println!("  Total rows:      {}", analysis.total_rows);
    println!("  Missing county:  {}", analysis.missing_county);
    println!("  Missing owner:   {}", analysis.missing_owner);

    println!("\n  Top counties:");
    for (county, count) in analysis.counties.iter().take(5) {
        println!("    {county}: {count}");
    }
    println!("\n  Top cities:");
    for (city, count) in analysis.cities.iter().take(5) {
        println!("    {city}: {count}");
    }
    println!("\n  Top zip codes:");
    for (zip, count) in analysis.zipcodes.iter().take(5) {
        println!("    {zip}: {count}");
    }
    println!();

    if let Some(path) = json_out {
        std::fs::write(path, serde_json::to_string_pretty(&analysis)?)?;
        println!("  Report saved to: {path}");
    }

    Ok(())
}

fn cmd_compare(original: &str, updated: &str) -> Result<()> {
    let config = load_config()?;
    let table_config = TableConfig::from(&config);
    let before = AddressTable::load(Path::new(original), &table_config)?;
    let after = AddressTable::load(Path::new(updated), &table_config)?;

    let comparison = report::compare(&before, &after);

    println!();
    println!("  Comparison — {original} → {updated}");
    println!("  Original missing: {}", comparison.original_missing);
    println!("  Updated missing:  {}", comparison.updated_missing);
    println!("  Records updated:  {}", comparison.records_updated);
    println!("  Success rate:     {:.1}%", comparison.success_rate);
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
