//! Scengen CLI - test scenario generation pipeline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use llm::GeminiProvider;
use scengen::pipeline::{Pipeline, RunInputs, DEFAULT_OUTPUT_NAME};
use scengen::{analysis, Config};

/// Scengen CLI - Generate test scenarios from Jira issues, screenshots and
/// impact-area spreadsheets.
#[derive(Parser)]
#[command(name = "scengen")]
#[command(about = "Test scenario generation pipeline")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate test scenarios from the provided sources
    Generate {
        /// Jira issue key or URL
        #[arg(long)]
        jira: Option<String>,

        /// Screenshot path (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,

        /// Impact-area spreadsheet path
        #[arg(long)]
        excel: Option<PathBuf>,

        /// Output directory (overrides OUTPUT_DIR)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output workbook filename
        #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
        name: String,

        /// Model to use
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature (0.0-1.0)
        #[arg(long)]
        temperature: Option<f32>,
    },

    /// Check source availability and content completeness without
    /// generating anything
    Check {
        /// Jira issue key or URL
        #[arg(long)]
        jira: Option<String>,

        /// Screenshot path (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,

        /// Impact-area spreadsheet path
        #[arg(long)]
        excel: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("scengen=debug,llm=debug,info")
    } else {
        EnvFilter::new("scengen=info,llm=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Generate {
            jira,
            images,
            excel,
            output,
            name,
            model,
            temperature,
        } => run_generate(jira, images, excel, output, name, model, temperature).await,
        Commands::Check { jira, images, excel } => run_check(jira, images, excel).await,
    }
}

async fn run_generate(
    jira: Option<String>,
    images: Vec<PathBuf>,
    excel: Option<PathBuf>,
    output: Option<PathBuf>,
    name: String,
    model: Option<String>,
    temperature: Option<f32>,
) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(temperature) = temperature {
        config.temperature = temperature;
    }

    tracing::info!(
        model = %config.model,
        output_dir = %config.output_dir.display(),
        "Starting scenario generation"
    );

    let provider = Arc::new(GeminiProvider::new(config.google_api_key.clone()));
    let pipeline = Pipeline::new(config, provider);

    let result = pipeline
        .run(RunInputs {
            jira,
            images,
            excel,
            output_name: Some(name),
        })
        .await?;

    println!("\n✅ Generated {} test scenarios", result.scenario_count);
    println!("   Sources: {}", result.sources_loaded.join(", "));
    println!("   Workbook: {}", result.workbook_path.display());
    println!("   Report:   {}", result.report_path.display());
    if !result.source_errors.is_empty() {
        println!("\n⚠️  Some sources failed to load:");
        for error in &result.source_errors {
            println!("   - {error}");
        }
    }
    if !result.completeness.sufficient {
        println!("\n⚠️  Input data was thin; consider adding more sources:");
        for recommendation in &result.completeness.recommendations {
            println!("   - {recommendation}");
        }
    }

    Ok(())
}

/// Dry-run assessment: loads Jira and Excel locally, checks that image
/// files are readable, and prints the completeness report. Screenshots are
/// excluded from scoring because their text only exists after a vision
/// call.
async fn run_check(
    jira: Option<String>,
    images: Vec<PathBuf>,
    excel: Option<PathBuf>,
) -> Result<()> {
    let config = Config::from_env()?;
    let provider = Arc::new(GeminiProvider::new(config.google_api_key.clone()));
    let pipeline = Pipeline::new(config, provider);

    let loaded_images = scengen::sources::images::load_images(&images);
    let inputs = RunInputs {
        jira,
        images: Vec::new(),
        excel,
        output_name: None,
    };
    let (bundle, errors) = pipeline.load_sources(&inputs).await;
    let report = analysis::assess(&bundle);

    println!("\n📊 Source check");
    for assessment in &report.sources {
        match assessment.score {
            Some(score) => println!("   {}: {} (score {score:.2})", assessment.kind, assessment.status),
            None => println!("   {}: {}", assessment.kind, assessment.status),
        }
    }
    println!(
        "   screenshots: {} of {} readable (analyzed at generation time)",
        loaded_images.len(),
        images.len()
    );
    println!("   Overall score: {:.2}", report.overall);
    println!(
        "   Sufficient: {}",
        if report.sufficient { "yes" } else { "no" }
    );

    if !errors.is_empty() {
        println!("\n⚠️  Load errors:");
        for error in &errors {
            println!("   - {error}");
        }
    }
    if !report.recommendations.is_empty() {
        println!("\nRecommendations:");
        for recommendation in &report.recommendations {
            println!("   - {recommendation}");
        }
    }

    Ok(())
}
