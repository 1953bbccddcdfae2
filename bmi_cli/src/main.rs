use bmi_core::csv_export::export_history;
use bmi_core::*;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bmi")]
#[command(about = "Body mass index calculator with history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate BMI and record it
    Calc {
        /// Height in centimetres (50-300)
        #[arg(long, allow_negative_numbers = true)]
        height: f64,

        /// Weight in kilograms (10-500)
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,

        /// Dry run - show the result without recording it
        #[arg(long)]
        dry_run: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show recorded calculations, newest first
    History {
        /// Show at most this many calculations
        #[arg(long)]
        limit: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export recorded calculations to CSV
    Export {
        /// Destination file (defaults to the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    bmi_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_validation() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    tracing::debug!("Using data directory {:?}", config.data.data_dir);

    match cli.command {
        Commands::Calc {
            height,
            weight,
            dry_run,
            json,
        } => cmd_calc(
            &config,
            CalculateBmiInput {
                height_cm: height,
                weight_kg: weight,
            },
            dry_run,
            json,
        ),
        Commands::History { limit, json } => cmd_history(&config, limit, json),
        Commands::Export { output } => cmd_export(&config, output),
    }
}

fn cmd_calc(config: &Config, input: CalculateBmiInput, dry_run: bool, json: bool) -> Result<()> {
    if dry_run {
        let result = preview_bmi(&input)?;
        if json {
            return print_json(&result);
        }
        display_result(&result);
        println!("\n[Dry run - not recording calculation]");
        return Ok(());
    }

    let mut store = JsonlStore::new(config.data.log_path());
    let record = calculate_and_save(&mut store, &input)?;

    if json {
        return print_json(&record);
    }
    display_record(&record);
    println!("\n✓ Calculation recorded (#{})", record.id);
    Ok(())
}

fn cmd_history(config: &Config, limit: Option<usize>, json: bool) -> Result<()> {
    if limit == Some(0) {
        return Err(Error::Validation("--limit must be at least 1".into()));
    }

    let store = JsonlStore::new(config.data.log_path());
    let mut history = get_bmi_history(&store)?;
    if let Some(limit) = limit.or(config.history.limit) {
        history.truncate(limit);
    }

    if json {
        return print_json(&history);
    }

    if history.is_empty() {
        println!("No calculations recorded yet.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<19}  {:>9}  {:>9}  {:>8}  {}",
        "ID", "CALCULATED AT (UTC)", "HEIGHT", "WEIGHT", "BMI", "CATEGORY"
    );
    for record in &history {
        println!(
            "{:>5}  {:<19}  {:>9}  {:>9}  {:>8}  {}",
            record.id,
            record.calculated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{} cm", record.height_cm),
            format!("{} kg", record.weight_kg),
            record.bmi_value.to_string(),
            record.category
        );
    }

    Ok(())
}

fn cmd_export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let csv_path = output.unwrap_or_else(|| config.data.export_path());
    let store = JsonlStore::new(config.data.log_path());

    let count = export_history(&store, &csv_path)?;

    println!("✓ Exported {} calculations to CSV", count);
    println!("  CSV: {}", csv_path.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_banner(bmi_value: Decimal, category: BmiCategory) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BMI {}  ({})", bmi_value, category);
    println!("╰─────────────────────────────────────────╯");
    println!();
}

fn display_result(result: &BmiResult) {
    display_banner(result.bmi_value, result.category);
    println!("  Height: {} cm", result.height_cm);
    println!("  Weight: {} kg", result.weight_kg);
}

fn display_record(record: &CalculationRecord) {
    display_banner(record.bmi_value, record.category);
    println!("  Height: {} cm", record.height_cm);
    println!("  Weight: {} kg", record.weight_kg);
    println!(
        "  Calculated: {}",
        record.calculated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}
