// src/main.rs
mod emit;
mod engine;
mod extract;
mod utils;

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use engine::MappingConfig;
use utils::AppError;

/// Command Line Interface for the soil report ingester
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a single soil report PDF
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory containing soil report PDFs
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Where records go: UDP metric lines, markdown files, or both
    #[arg(short, long, value_enum, default_value = "markdown")]
    output: Output,

    /// Host receiving metric lines over UDP
    #[arg(long, default_value = "gus.local")]
    metrics_host: String,

    /// JSON file overriding entries of the built-in name mapping
    #[arg(long)]
    mapping: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    Metrics,
    Markdown,
    Both,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Load the label mapping configuration; failure here is fatal
    let mapping = MappingConfig::load(args.mapping.as_deref())?;

    // 4. Collect the documents to process
    let pdf_files = collect_pdf_files(&args)?;
    tracing::info!("Found {} report(s) to process", pdf_files.len());

    // 5. Process each document; one bad report never stops the run
    let mut success_count = 0;
    let mut failure_count = 0;

    for pdf_file in &pdf_files {
        match process_file(pdf_file, &args, &mapping) {
            Ok(()) => {
                tracing::info!("Successfully processed {}", pdf_file.display());
                success_count += 1;
            }
            Err(e) => {
                tracing::error!("Failed to process {}: {}", pdf_file.display(), e);
                failure_count += 1;
            }
        }
    }

    tracing::info!(
        "Processing finished. Success: {}, Failures: {}",
        success_count,
        failure_count
    );

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "failed to ingest any of {} report(s)",
            failure_count
        )));
    }

    Ok(())
}

/// Resolves the CLI's file/directory arguments to the list of PDFs to
/// ingest. A directory is scanned non-recursively for `*.pdf`.
fn collect_pdf_files(args: &Args) -> Result<Vec<PathBuf>, AppError> {
    if let Some(file) = &args.file {
        return Ok(vec![file.clone()]);
    }
    let Some(directory) = &args.directory else {
        return Err(AppError::Config(
            "no file or directory path provided; specify a file (-f) or a directory (-d)"
                .to_string(),
        ));
    };

    let mut pdf_files = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            pdf_files.push(path);
        }
    }
    pdf_files.sort();

    if pdf_files.is_empty() {
        return Err(AppError::Config(format!(
            "no PDF files found in {}",
            directory.display()
        )));
    }
    Ok(pdf_files)
}

/// Ingests one report: extract, build the record, emit.
fn process_file(pdf_file: &Path, args: &Args, mapping: &MappingConfig) -> Result<(), AppError> {
    let page = extract::extract_first_page(pdf_file)?;
    let record = engine::build_record(&page.text, &page.grid, mapping)?;
    let timestamp = extract::resolve_timestamp(&page.text);

    if matches!(args.output, Output::Metrics | Output::Both) {
        let line = emit::build_line(&record, &timestamp);
        tracing::debug!("metric line: {}", line);
        emit::send_line(&line, &args.metrics_host, record.variant)?;
    }

    if matches!(args.output, Output::Markdown | Output::Both) {
        // The markdown file lands next to the source PDF.
        let directory = pdf_file.parent().unwrap_or_else(|| Path::new("."));
        emit::write_markdown(directory, &record, &timestamp)?;
    }

    Ok(())
}
