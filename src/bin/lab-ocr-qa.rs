use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lab_ocr_qa::ocr_input::read_tokens;
use lab_ocr_qa::{Extractor, LabVocabulary, PipelineConfig, correct_value};

#[derive(Parser, Debug)]
#[command(
    name = "lab-ocr-qa",
    version,
    about = "Build lab-value QA examples from OCR output and correct predicted values."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract QA examples and the dossier number from an OCR token dump
    Extract(ExtractArgs),

    /// Rescale a predicted value for an analyte
    Correct(CorrectArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Tesseract TSV file, or a JSON token list (.json)
    #[arg(long)]
    input: PathBuf,

    /// Document identifier used in example ids (defaults to the file name)
    #[arg(long)]
    document: Option<String>,

    /// JSON pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page width in pixels; with --page-height, boxes are rescaled to 0-1000
    #[arg(long, requires = "page_height")]
    page_width: Option<u32>,

    /// Page height in pixels
    #[arg(long, requires = "page_width")]
    page_height: Option<u32>,
}

#[derive(Args, Debug)]
struct CorrectArgs {
    /// Analyte key, e.g. hemoglobine
    #[arg(long)]
    analyte: String,

    /// Raw predicted value
    #[arg(long)]
    value: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lab_ocr_qa=info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Extract(args) => run_extract(args),
        Commands::Correct(args) => run_correct(args),
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let tokens =
        read_tokens(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let document = args.document.clone().unwrap_or_else(|| {
        args.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    tracing::info!(document = %document, tokens = tokens.len(), "extracting");
    let extractor = Extractor::new(config, LabVocabulary::builtin());
    let mut extraction = extractor.extract(&document, &tokens);

    if let (Some(w), Some(h)) = (args.page_width, args.page_height) {
        for example in &mut extraction.examples {
            example.normalize_boxes(w, h);
        }
    }

    println!("{}", serde_json::to_string_pretty(&extraction)?);
    Ok(())
}

fn run_correct(args: CorrectArgs) -> Result<()> {
    let corrected = correct_value(&args.analyte, &args.value);
    println!("{}", serde_json::to_string(&corrected)?);
    Ok(())
}
