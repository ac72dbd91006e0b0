use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

use mobility_analyzer::config::{AnalyzerConfig, DEFAULT_CONFIG_PATH};
use mobility_analyzer::observability::init_logging;
use mobility_analyzer::pipeline::MvrRanking;
use mobility_analyzer::{Analyzer, CleaningSummary, FieldKey, FileExt, Gender};

#[derive(Parser)]
#[command(name = "mobility")]
#[command(about = "Academic mobility analysis over faculty survey sheets")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the source directory and print a summary
    Clean,
    /// Clean, then print per-field statistics as JSON
    Report {
        /// Lower percentile bound for the mobility band
        #[arg(long, default_value_t = 0)]
        low: u32,
        /// Upper percentile bound for the mobility band
        #[arg(long, default_value_t = 20)]
        high: u32,
    },
    /// Clean, then export vertex and edge lists for every field
    Export {
        /// Output format: csv or xlsx
        #[arg(long, default_value = "csv")]
        format: FileExt,
    },
}

#[derive(Serialize)]
struct FieldReport {
    field: FieldKey,
    gini: f64,
    ranking: Option<MvrRanking>,
    avg_move_female: Option<f64>,
    avg_move_male: Option<f64>,
    avg_move_in_band: Option<f64>,
}

#[derive(Serialize)]
struct Report {
    summary: CleaningSummary,
    band: (u32, u32),
    fields: Vec<FieldReport>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = AnalyzerConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?
        .with_env_overrides();
    config.validate()?;

    let _guard = init_logging(&config.logging);
    info!("Starting mobility analyzer");

    let mut analyzer = Analyzer::new(config);
    preload_ids(&mut analyzer);

    let summary = analyzer.clean_data().context("cleaning failed")?;

    match cli.command {
        Commands::Clean => {
            println!("\n📊 Cleaning Results:");
            println!("   Files read: {}", summary.files_cleaned);
            println!("   Files skipped: {}", summary.files_skipped);
            println!("   Rows dispatched: {}", summary.rows_dispatched);
            println!("   Rows without field: {}", summary.rows_skipped);
            println!("   Fields: {}", summary.fields);
            println!("   Institutions: {}", analyzer.institutions().len());
        }
        Commands::Report { low, high } => {
            let report = build_report(&mut analyzer, summary, low, high)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Export { format } => {
            let exported = analyzer.export_for_all(format)?;
            println!(
                "✅ Exported {} fields to {}",
                exported,
                analyzer.config().export_dir.display()
            );
        }
    }

    Ok(())
}

fn preload_ids(analyzer: &mut Analyzer) {
    let Some(path) = analyzer.config().inst_id_dict.clone() else {
        return;
    };

    let report = analyzer.load_inst_ids_from(&path);
    if report.succeeded() {
        info!("Institution ID dictionary loaded ({} entries)", report.allocated);
    } else {
        warn!(
            "Institution ID dictionary partially loaded: {} of {} rows, {} duplicates",
            report.allocated,
            report.rows,
            report.duplicates.len()
        );
    }
}

fn build_report(analyzer: &mut Analyzer, summary: CleaningSummary, low: u32, high: u32) -> anyhow::Result<Report> {
    let gini = analyzer.gini_for_all()?;
    analyzer.mvr_rank_for_all()?;
    let female = analyzer.avg_move_by_gender(Gender::Female)?;
    let male = analyzer.avg_move_by_gender(Gender::Male)?;
    let band = analyzer.avg_move_for_percentile_range(low, high)?;

    let mut fields = Vec::with_capacity(gini.len());
    for (field, gini) in gini {
        let ranking = if field.is_name() {
            match analyzer.mvr_rank_for(field.clone()) {
                Ok(ranking) => Some(ranking),
                Err(e) => {
                    error!("No ranking for {}: {}", field, e);
                    None
                }
            }
        } else {
            None
        };

        fields.push(FieldReport {
            avg_move_female: female.get(&field).copied().flatten(),
            avg_move_male: male.get(&field).copied().flatten(),
            avg_move_in_band: band.get(&field).copied().flatten(),
            field,
            gini,
            ranking,
        });
    }

    Ok(Report {
        summary,
        band: (low, high),
        fields,
    })
}
