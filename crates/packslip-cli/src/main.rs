//! packslip - shipment documents from a trading-card ledger
//!
//! The `packslip` command reads a ledger export and writes per-package packing
//! slips and a visual pick checklist.
//!
//! ## Commands
//!
//! - `run`: packing slips and checklist
//! - `slips`: packing slips only, optionally converted to PDF
//! - `checklist`: visual pick checklist only
//! - `classify`: print each committed row's classification

use anyhow::{Context, Result};
use card_lookup::{
    LookupConfig, MultiverseBridgeClient, ScryfallClient, DEFAULT_DETAIL_URL, DEFAULT_SEARCH_URL,
};
use clap::{Args, Parser, Subcommand};
use packslip_core::{
    write_report, ConverterConfig, CsvRowSource, Pipeline, PipelineConfig, RunReport,
    WkhtmltopdfConverter,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "packslip")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Packing slips and pick checklists from a card shipment ledger", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write packing slips and the visual pick checklist
    Run {
        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        slips: SlipArgs,

        #[command(flatten)]
        lookups: LookupArgs,
    },

    /// Write one packing slip per package
    Slips {
        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        slips: SlipArgs,
    },

    /// Write the visual pick checklist
    Checklist {
        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        lookups: LookupArgs,
    },

    /// Print the classification of every committed row
    Classify {
        /// Ledger export (CSV)
        #[arg(short, long)]
        ledger: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Ledger export (CSV)
    #[arg(short, long)]
    ledger: PathBuf,

    /// Directory receiving the generated documents
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Abort before writing anything if a committed row has no classification
    #[arg(long)]
    fail_on_gap: bool,
}

#[derive(Args, Debug, Clone)]
struct SlipArgs {
    /// Convert each packing slip to PDF
    #[arg(long)]
    pdf: bool,

    /// wkhtmltopdf executable
    #[arg(long, env = "PACKSLIP_WKHTMLTOPDF", default_value = "wkhtmltopdf")]
    wkhtmltopdf: PathBuf,

    /// Seconds to wait for one PDF conversion
    #[arg(long, default_value_t = 120)]
    pdf_timeout: u64,
}

#[derive(Args, Debug, Clone)]
struct LookupArgs {
    /// Checklist destination (default: <out-dir>/search_list.html)
    #[arg(long)]
    checklist: Option<PathBuf>,

    /// Card search service base URL
    #[arg(long, env = "PACKSLIP_SEARCH_URL", default_value = DEFAULT_SEARCH_URL)]
    search_url: String,

    /// Card detail service base URL
    #[arg(long, env = "PACKSLIP_DETAIL_URL", default_value = DEFAULT_DETAIL_URL)]
    detail_url: String,

    /// Rows resolved concurrently within a checklist section
    #[arg(long, env = "PACKSLIP_MAX_CONCURRENT_LOOKUPS", default_value_t = 4)]
    max_concurrent: usize,

    /// Per-request timeout for the lookup services, in seconds
    #[arg(long, default_value_t = 30)]
    lookup_timeout: u64,

    /// Exit non-zero if any card lookup failed
    #[arg(long)]
    fail_on_lookup_errors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    packslip_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            output,
            slips,
            lookups,
        } => {
            let pipeline = build_pipeline(&output, Some(&slips), Some(&lookups))?;
            execute(pipeline, &output, lookups.fail_on_lookup_errors).await
        }
        Commands::Slips { output, slips } => {
            let pipeline = build_pipeline(&output, Some(&slips), None)?;
            execute(pipeline, &output, false).await
        }
        Commands::Checklist { output, lookups } => {
            let pipeline = build_pipeline(&output, None, Some(&lookups))?;
            execute(pipeline, &output, lookups.fail_on_lookup_errors).await
        }
        Commands::Classify { ledger } => cmd_classify(&ledger),
    }
}

/// Assemble a pipeline. Slips are written only when `slips` is given, the
/// checklist only when `lookups` is given.
fn build_pipeline(
    output: &OutputArgs,
    slips: Option<&SlipArgs>,
    lookups: Option<&LookupArgs>,
) -> Result<Pipeline> {
    let mut config = PipelineConfig::default().with_output_dir(&output.out_dir);
    config.fail_on_gap = output.fail_on_gap;
    config.write_slips = slips.is_some();
    config.write_checklist = lookups.is_some();
    config.convert_pdf = slips.is_some_and(|s| s.pdf);

    if let Some(lookups) = lookups {
        config.checklist.max_concurrent_lookups = lookups.max_concurrent;
        if let Some(path) = &lookups.checklist {
            config = config.with_checklist_path(path);
        }
    }

    let mut pipeline = Pipeline::new(config);

    if let Some(lookups) = lookups {
        let lookup_config = LookupConfig::new(&lookups.search_url, &lookups.detail_url)
            .with_timeout_secs(lookups.lookup_timeout);
        let search = MultiverseBridgeClient::new(&lookup_config)
            .context("Failed to build card search client")?;
        let details =
            ScryfallClient::new(&lookup_config).context("Failed to build card detail client")?;
        pipeline = pipeline.with_lookups(Arc::new(search), Arc::new(details));
    }

    if let Some(slips) = slips.filter(|s| s.pdf) {
        let converter_config = ConverterConfig::from_env()
            .with_executable(&slips.wkhtmltopdf)
            .with_timeout_secs(slips.pdf_timeout);
        pipeline = pipeline.with_converter(Arc::new(WkhtmltopdfConverter::new(converter_config)));
    }

    Ok(pipeline)
}

async fn execute(pipeline: Pipeline, output: &OutputArgs, fail_on_lookup_errors: bool) -> Result<()> {
    let source = CsvRowSource::from_path(&output.ledger);
    let report = pipeline
        .run(&source)
        .await
        .with_context(|| format!("Run failed for ledger {}", output.ledger.display()))?;

    print_summary(&report);

    if let Some(path) = &output.report {
        write_report(&report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
        println!("Report:     {}", path.display());
    }

    let failed = report.lookup_failure_count();
    if fail_on_lookup_errors && failed > 0 {
        anyhow::bail!("{} card lookup(s) failed", failed);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("Run {}", report.run_id);
    println!(
        "Ledger:     {} rows, {} committed",
        report.total_rows, report.committed_rows
    );

    if !report.slips.is_empty() {
        println!("Slips:      {}", report.slips.len());
        for slip in &report.slips {
            let pdf = slip
                .pdf
                .as_ref()
                .map(|p| format!(" + {}", p.display()))
                .unwrap_or_default();
            println!(
                "  {:<16} {:>3} rows  {}{}",
                slip.package_id,
                slip.rows,
                slip.html.display(),
                pdf
            );
        }
    }

    if let (Some(path), Some(summary)) = (&report.checklist_path, &report.checklist) {
        println!(
            "Checklist:  {} ({} sections, {} entries, {} images)",
            path.display(),
            summary.sections,
            summary.entries,
            summary.images
        );
    }

    if !report.gaps.is_empty() {
        println!("\nUnclassified rows (left off the checklist):");
        for gap in &report.gaps {
            println!("  - {} / {} [{}]", gap.package_id, gap.card_name, gap.tags.join(", "));
        }
    }

    if let Some(summary) = &report.checklist {
        if !summary.mismatches.is_empty() {
            println!("\nNo printing found:");
            for issue in &summary.mismatches {
                println!("  - {} / {} ({})", issue.package_id, issue.card_name, issue.set_name);
            }
        }
        if !summary.failures.is_empty() {
            println!("\nLookup failures:");
            for issue in &summary.failures {
                println!("  - {} / {}: {}", issue.package_id, issue.card_name, issue.reason);
            }
        }
    }

    if !report.conversion_failures.is_empty() {
        println!("\nPDF conversion failures:");
        for failure in &report.conversion_failures {
            println!("  - {}: {}", failure.package_id, failure.reason);
        }
    }

    if report.is_clean() {
        println!("\nNo issues.");
    } else {
        println!("\n{} issue(s) need review.", report.issue_count());
    }
}

fn cmd_classify(ledger: &Path) -> Result<()> {
    let source = CsvRowSource::from_path(ledger);
    let (shipments, _) = Pipeline::new(PipelineConfig::default())
        .partition(&source)
        .with_context(|| format!("Failed to read ledger {}", ledger.display()))?;

    for classified in &shipments.committed {
        let label = classified
            .classification
            .as_ref()
            .map(|c| c.label.as_str())
            .unwrap_or("-");
        println!(
            "{}\t{}\t{}\t{}",
            classified.row.package_id, classified.row.card_name, classified.row.set_name, label
        );
    }

    println!(
        "\n{} committed of {} rows, {} section(s), {} unclassified",
        shipments.committed.len(),
        shipments.total_rows,
        shipments.sections.len(),
        shipments.gaps.len()
    );
    Ok(())
}
