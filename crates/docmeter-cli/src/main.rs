//! # Docmeter CLI
//!
//! Command-line interface for Docmeter extraction quality assessment.
//!
//! ## Commands
//!
//! - `docmeter process <FILE>` - Extract a document and report its quality scores
//! - `docmeter detect <FILE>` - Print the detected MIME type
//! - `docmeter optimize-image <IN> <OUT>` - Normalize, enhance or convert an image
//!
//! ## Examples
//!
//! ```bash
//! # Score an HTML export
//! docmeter process report.html
//!
//! # Machine-readable report with a custom configuration
//! docmeter process report.html --config docmeter.toml --json
//!
//! # Produce a web rendition of a scan
//! docmeter optimize-image scan.png scan.jpg --mode web
//! ```
//!
//! Set `RUST_LOG` to control log output; `--verbose` switches the default to `debug`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docmeter::image::ImageOptimizer;
use docmeter::{DocmeterConfig, Document, DocumentProcessor, InMemoryDocumentStore, ProcessingReport, detect_mime_type};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docmeter")]
#[command(about = "Assess the quality of document extractions")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a document and report quality scores and diagnostics
    Process {
        /// Document to process
        file: PathBuf,

        /// Configuration file (TOML, YAML or JSON); docmeter.toml is discovered otherwise
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the detected MIME type of a file
    Detect {
        /// File to inspect
        file: PathBuf,
    },

    /// Rewrite an image with the optimizer
    OptimizeImage {
        /// Source image
        input: PathBuf,

        /// Destination path
        output: PathBuf,

        /// Transformation to apply
        #[arg(short, long, value_enum, default_value_t = ImageMode::Optimize)]
        mode: ImageMode,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ImageMode {
    /// Storage normalization (resize, sharpen, re-encode)
    #[default]
    Optimize,
    /// Upscale, contrast and sharpen with the configured options
    Enhance,
    /// Web rendition (bounded size, JPEG)
    Web,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Process { file, config, json } => process(&file, config.as_deref(), json),
        Commands::Detect { file } => {
            validate_input(&file)?;
            println!("{}", detect_mime_type(&file));
            Ok(())
        }
        Commands::OptimizeImage {
            input,
            output,
            mode,
            config,
        } => optimize_image(&input, &output, mode, config.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DocmeterConfig> {
    let config = match path {
        Some(path) => DocmeterConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from '{}'", path.display()))?,
        None => DocmeterConfig::discover()
            .context("Failed to discover configuration")?
            .unwrap_or_default(),
    };
    debug!(?config, "Configuration loaded");
    Ok(config)
}

fn validate_input(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("File not found: '{}'", path.display());
    }
    Ok(())
}

fn process(file: &Path, config_path: Option<&Path>, as_json: bool) -> Result<()> {
    validate_input(file)?;
    let config = load_config(config_path)?;
    let processor = DocumentProcessor::new(config).context("Invalid configuration")?;
    let store = InMemoryDocumentStore::new();

    let id = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let title = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.clone());
    let mut document = Document::new(id, title, file);

    let report = processor
        .process(&mut document, &store)
        .with_context(|| format!("Failed to process '{}'", file.display()))?;
    info!(precision = report.precision, "Processing finished");

    if as_json {
        let output = json!({
            "status": document.status,
            "title": document.title,
            "author": document.author,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&output).context("Failed to serialize report")?);
    } else {
        print_report(&document, &report);
    }

    Ok(())
}

fn print_report(document: &Document, report: &ProcessingReport) {
    let metrics = &report.metrics;

    println!("Document:   {} ({})", document.title, document.id);
    println!("Status:     {}", document.status);
    println!("MIME type:  {}", report.mime_type);
    println!("Extractor:  {} ({} attempted)", report.extractor, report.attempts);
    if let Some(author) = &document.author {
        println!("Author:     {}", author);
    }
    println!("Pages:      {}", metrics.page_count);
    println!(
        "Elements:   {}/{} extracted",
        metrics.total_elements_extracted, metrics.total_elements_detected
    );
    println!("Images:     {} saved", report.images_saved);
    println!();
    println!("Text quality:   {:>6.2}", metrics.text_quality);
    println!("Image quality:  {:>6.2}", metrics.image_quality);
    println!("Table quality:  {:>6.2}", metrics.table_quality);
    println!("Precision:      {:>6.2}%", report.precision);

    if metrics.errors.is_empty() {
        return;
    }

    println!();
    println!("Diagnostics ({}):", metrics.errors.len());
    for record in &metrics.errors {
        println!(
            "  [{}] {} (page {}): {}",
            record.severity(),
            record.error_type(),
            record.page_number(),
            record.message()
        );
        println!("      fix: {}", record.suggested_fix());
    }
}

fn optimize_image(input: &Path, output: &Path, mode: ImageMode, config_path: Option<&Path>) -> Result<()> {
    validate_input(input)?;
    let config = load_config(config_path)?;
    config.validate().context("Invalid configuration")?;
    let optimizer = ImageOptimizer::new(&config);

    let bytes = fs::read(input).with_context(|| format!("Failed to read '{}'", input.display()))?;
    let data = match mode {
        ImageMode::Optimize => optimizer.optimize(&bytes).data,
        ImageMode::Enhance => optimizer.enhance_image_quality(&bytes, &optimizer.enhance_options()),
        ImageMode::Web => optimizer.convert_to_web_format(&bytes),
    };

    fs::write(output, &data).with_context(|| format!("Failed to write '{}'", output.display()))?;
    info!(mode = ?mode, input_len = bytes.len(), output_len = data.len(), "Image written");
    println!("{} -> {} ({} bytes)", input.display(), output.display(), data.len());
    Ok(())
}
