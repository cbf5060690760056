//! Prism CLI - Convert Tableau workbooks to Power BI report models
//!
//! Usage:
//!   prism convert <workbook.twb> [--out <dir>] [--pack <file.zip>]
//!   prism inspect <workbook.twb>
//!
//! Examples:
//!   prism convert superstore.twbx --out out/superstore
//!   prism convert superstore.twb --pack superstore-report.zip
//!   prism inspect superstore.twb

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use prism::convert::{convert_path, ConvertOptions};
use prism::package;

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Prism - Convert Tableau workbooks to Power BI report models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a workbook and write the report documents
    Convert {
        /// Path to the .twb or .twbx workbook
        file: PathBuf,

        /// Directory for the loose JSON documents
        #[arg(short, long, default_value = "out")]
        out: PathBuf,

        /// Also pack the documents into a single zip container
        #[arg(short, long)]
        pack: Option<PathBuf>,

        /// Report model name (defaults to the workbook file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show what a workbook contains without converting it
    Inspect {
        /// Path to the .twb or .twbx workbook
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            file,
            out,
            pack,
            name,
        } => cmd_convert(file, out, pack, name),
        Commands::Inspect { file } => cmd_inspect(file),
    }
}

fn cmd_convert(
    file: PathBuf,
    out: PathBuf,
    pack: Option<PathBuf>,
    name: Option<String>,
) -> ExitCode {
    let mut options = ConvertOptions::new();
    if let Some(name) = name {
        options = options.with_name(name);
    }

    let conversion = match convert_path(&file, &options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Conversion error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for diag in &conversion.diagnostics {
        eprintln!("{}", diag);
    }

    if let Err(e) = package::write_documents(&out, &conversion.documents) {
        eprintln!("Error writing documents to '{}': {}", out.display(), e);
        return ExitCode::FAILURE;
    }
    println!(
        "Converted {}: {} tables, {} measures, {} visuals, {} pages -> {}",
        file.display(),
        conversion.schema.tables.len(),
        conversion.measures.len(),
        conversion.visuals.len(),
        conversion.pages.len(),
        out.display()
    );

    if let Some(pack_path) = pack {
        if let Err(e) = package::pack(&pack_path, &conversion.documents) {
            eprintln!("Error packing '{}': {}", pack_path.display(), e);
            return ExitCode::FAILURE;
        }
        println!("Packed {}", pack_path.display());
    }

    ExitCode::SUCCESS
}

fn cmd_inspect(file: PathBuf) -> ExitCode {
    let xml = match package::read_workbook_xml(&file) {
        Ok(xml) => xml,
        Err(e) => {
            eprintln!("Error reading '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let ir = match prism::extract::extract(&xml) {
        Ok(ir) => ir,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("File: {}", file.display());
    println!();

    if !ir.data_sources.is_empty() {
        println!("Data sources:");
        for ds in &ir.data_sources {
            println!(
                "  - {} ({}, {} columns)",
                ds.name,
                if ds.connection.kind.is_empty() {
                    "no connection"
                } else {
                    &ds.connection.kind
                },
                ds.columns.len()
            );
        }
        println!();
    }

    if !ir.calculations.is_empty() {
        println!("Calculations:");
        for calc in &ir.calculations {
            println!("  - {} = {}", calc.name, calc.formula);
        }
        println!();
    }

    if !ir.worksheets.is_empty() {
        println!("Worksheets:");
        for ws in &ir.worksheets {
            println!(
                "  - {} ({} visualizations, {} filters)",
                ws.name,
                ws.visualizations.len(),
                ws.filters.len()
            );
        }
        println!();
    }

    if !ir.dashboards.is_empty() {
        println!("Dashboards:");
        for db in &ir.dashboards {
            println!(
                "  - {} ({}x{}, {} zones)",
                db.name,
                db.size.width,
                db.size.height,
                db.zones.len()
            );
        }
    }

    ExitCode::SUCCESS
}
