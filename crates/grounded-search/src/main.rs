//! A command line tool to perform a grounded search using the Gemini API.

#[macro_use]
extern crate tracing;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use grounded_search::{
    ClientBuilder, DEFAULT_MODEL, GeminiConfigBuilder, GeminiProvider,
    GroundedResponse, ThinkingConfig, ThinkingLevel,
};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "grounded-search",
    about = "Performs a grounded search using the Gemini API."
)]
struct Cli {
    /// Google AI API key.
    #[arg(short = 'k', long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model to use.
    #[arg(short, long, env = "GEMINI_MODEL_ID", default_value = DEFAULT_MODEL)]
    model: String,

    /// Thinking level for the model (minimal, low, medium, high).
    #[arg(short, long)]
    thinking_level: Option<ThinkingLevel>,

    /// Enables verbose output for debugging.
    #[arg(short, long)]
    verbose: bool,

    /// Keeps the source URLs as the API reported them.
    #[arg(long)]
    no_redirection: bool,

    /// The search query.
    query: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{} {message}", "error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let Some(api_key) = cli.api_key.filter(|key| !key.is_empty()) else {
        return Err("API key is required. Set it with --api-key or the \
                    GEMINI_API_KEY environment variable."
            .to_owned());
    };
    if cli.query.is_empty() {
        return Err("Search query argument is required.".to_owned());
    }

    let mut config =
        GeminiConfigBuilder::with_api_key(&api_key).with_model(&cli.model);
    if let Some(level) = cli.thinking_level {
        config = config.with_thinking_config(ThinkingConfig {
            thinking_level: Some(level),
            include_thoughts: false,
        });
    }
    let config = config
        .build()
        .map_err(|err| format!("Failed to create client: {err}"))?;

    let mut builder = ClientBuilder::with_provider(GeminiProvider::new(config));
    if cli.no_redirection {
        builder = builder.with_no_redirection();
    }
    let client = builder
        .build()
        .map_err(|err| format!("Failed to create client: {err}"))?;

    info!("API key: {}", mask_api_key(&api_key));
    info!("Using model: {}", cli.model);
    info!("Search query: {}", cli.query);
    if let Some(level) = cli.thinking_level {
        info!("Thinking level: {}", level.as_str());
    }

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    progress_bar.set_message("🔎 Searching...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let result = client.generate_grounded_content(&cli.query).await;
    progress_bar.finish_and_clear();
    let resp = result.map_err(|err| format!("Search failed: {err}"))?;

    print_response(&resp);
    info!("Search completed in {:?}", start.elapsed());
    Ok(())
}

fn print_response(resp: &GroundedResponse) {
    println!("{}", resp.generated_text);
    if resp.attributions.is_empty() {
        return;
    }

    println!("\n---\n{}", "Sources:".bold());
    for attribution in &resp.attributions {
        println!(
            "- {} ({})",
            attribution.title,
            attribution.url.bright_blue()
        );
    }
}

fn mask_api_key(api_key: &str) -> String {
    let len = api_key.len();
    match (api_key.get(..4), api_key.get(len.saturating_sub(4)..)) {
        (Some(head), Some(tail)) if len > 8 => format!("{head}****{tail}"),
        _ => "****".to_owned(),
    }
}
