//! OCR Skill CLI
//!
//! Extracts text from images and PDFs with DeepSeek-OCR (via Ollama) or
//! PaddleOCR, and diagnoses the local setup.
//!
//! # Usage
//!
//! ```bash
//! ocr-skill ocr scan.png                          # DeepSeek-OCR (smart)
//! ocr-skill ocr scan.png --fast --lang en         # PaddleOCR (fast)
//! ocr-skill ocr report.pdf --json -o report.json
//! ocr-skill check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_skill::check::SetupChecker;
use ocr_skill::input::InputKind;
use ocr_skill::ocr::{OcrMode, OcrOptions, OcrService};
use ocr_skill::output::{self, OutputFormat};
use ocr_skill::{AppError, Config};

#[derive(Parser)]
#[command(name = "ocr-skill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "OCR for images and PDFs: DeepSeek-OCR (smart) or PaddleOCR (fast)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from an image or PDF
    Ocr {
        /// Image (png, jpg, jpeg, webp, bmp, gif, tiff) or PDF file
        input_file: PathBuf,

        /// Use PaddleOCR instead of DeepSeek-OCR
        #[arg(short, long)]
        fast: bool,

        /// Custom prompt for DeepSeek-OCR
        #[arg(short, long)]
        prompt: Option<String>,

        /// PaddleOCR language code (fast mode only)
        #[arg(short, long)]
        lang: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ollama model to use
        #[arg(long)]
        model: Option<String>,

        /// Ollama base URL
        #[arg(long = "ollama-url")]
        ollama_url: Option<String>,

        /// Rasterization resolution for PDF pages
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        dpi: Option<u32>,
    },
    /// Check that Ollama, the model, PaddleOCR and poppler are set up
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, stdout is reserved for results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocr_skill=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e.downcast_ref::<AppError>().and_then(AppError::hint) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, mut config: Config) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Ocr {
            input_file,
            fast,
            prompt,
            lang,
            json,
            output,
            model,
            ollama_url,
            dpi,
        } => {
            if let Some(model) = model {
                config.ollama.model = model;
            }
            if let Some(url) = ollama_url {
                config.ollama.base_url = url.trim_end_matches('/').to_string();
            }
            if let Some(dpi) = dpi {
                config.pdf.dpi = dpi;
            }

            // Path and extension are checked before any backend is set up
            InputKind::detect(&input_file).map_err(AppError::from)?;

            let options = OcrOptions {
                mode: OcrMode::from_fast_flag(fast),
                prompt,
                lang,
            };

            let service = OcrService::new(&config, &options)?;
            let document = service.process(&input_file).await?;
            let rendered = output::render(&document, OutputFormat::from_json_flag(json))?;

            output::emit(&rendered, output.as_deref())
                .await
                .with_context(|| match &output {
                    Some(path) => format!("Failed to write {}", path.display()),
                    None => "Failed to write output".to_string(),
                })?;

            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { json } => {
            let report = SetupChecker::new(config).run().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }

            Ok(ExitCode::from(report.exit_code()))
        }
    }
}
