//! # sitekb CLI Application
//!
//! Command-line interface for the knowledge base builder, providing the
//! end-to-end workflow through two subcommands:
//!
//! - `build`: crawl a website and assemble its knowledge base and
//!   chatbot training dataset
//! - `convert`: categorize a chatbot dataset and render it as SQL
//!   INSERT statements
//!
//! ## Features
//!
//! - Configurable crawling with page budget and rate controls
//! - Optional AI enrichment with automatic heuristic fallback
//! - Progress tracking for long-running crawls
//! - Graceful cancellation on Ctrl-C

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{instrument, warn};
use tracing_subscriber::EnvFilter;

use sitekb::convert::{Classifier, categorize_dataset, load_dataset, render_sql};
use sitekb::crawler::{CrawlerConfig, HttpFetcher, crawl_site};
use sitekb::enrich::{AiConfig, AiStructurer, EnrichOptions, Enricher};
use sitekb::kb::build_dataset;
use sitekb::progress::{CancelFlag, CrawlEvent, progress_channel};

/// Environment variable holding the AI structuring credential
const API_KEY_VAR: &str = "STRUCTURING_API_KEY";

#[derive(Parser)]
#[command(author, version, about = "Build chatbot knowledge bases from websites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl a website and build its knowledge base
    Build(BuildArgs),

    /// Convert a chatbot dataset into SQL INSERT statements
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// URL of the website to crawl
    #[arg(required = true)]
    url: String,

    /// Maximum number of pages to accept
    #[arg(short = 'p', long, default_value = "50")]
    max_pages: u32,

    /// Politeness delay between requests, in seconds
    #[arg(short, long, default_value = "1.0")]
    delay: f64,

    /// Minimum body-text length for a page to be kept
    #[arg(long, default_value = "100")]
    min_content: usize,

    /// Maximum content length sent to the AI capability
    #[arg(long, default_value = "5000")]
    max_content: usize,

    /// Token budget per AI completion
    #[arg(long, default_value = "1000")]
    max_tokens: u32,

    /// Directory to write output files into
    #[arg(short, long, default_value = "knowledge_base")]
    output_dir: PathBuf,

    /// Knowledge base file name within the output directory
    #[arg(long, default_value = "knowledge_base.json")]
    output: String,

    /// Disable AI enrichment and use heuristics only
    #[arg(long)]
    no_ai: bool,

    /// AI model to use for enrichment
    #[arg(long)]
    model: Option<String>,

    /// AI endpoint URL
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Path to the chatbot dataset JSON file
    #[arg(required = true)]
    chatbot_file: PathBuf,

    /// Business identifier embedded in every INSERT
    #[arg(short, long, required = true)]
    business_id: String,

    /// Output SQL file (default: knowledge_base_inserts_<business_id>.sql)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Classifier to use (keyword|ai)
    #[arg(short, long, default_value = "keyword", value_parser = ["keyword", "ai"])]
    classifier: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitekb=info")),
        )
        .init();

    match cli.command {
        Some(Commands::Build(args)) => {
            build_command(args).await?;
        }
        Some(Commands::Convert(args)) => {
            convert_command(args).await?;
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

#[instrument(skip(args))]
async fn build_command(args: BuildArgs) -> anyhow::Result<()> {
    println!("Building knowledge base for {}...", args.url);

    let config = CrawlerConfig::builder()
        .max_pages(args.max_pages)
        .delay_seconds(args.delay)
        .min_content_length(args.min_content)
        .build();

    let options = EnrichOptions {
        max_content_length: args.max_content,
        ..EnrichOptions::default()
    };
    let enricher = make_enricher(&args, options);

    let fetcher = HttpFetcher::new(&config)?;

    // Cancellation on Ctrl-C, taking effect at the next page boundary
    let cancel = CancelFlag::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\nCancellation requested, finishing current page...");
                cancel.cancel();
            }
        }
    });

    // Progress over a channel so the crawl never blocks on the terminal
    let (progress_sender, mut progress_receiver) = progress_channel(100);

    let progress_bar = ProgressBar::new(args.max_pages as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    progress_bar.set_message("Crawling...");

    let progress_handle = tokio::spawn({
        let progress_bar = progress_bar.clone();
        async move {
            while let Some(event) = progress_receiver.recv().await {
                match event {
                    CrawlEvent::Fetching { url } => {
                        progress_bar.set_message(format!("Fetching {}", url));
                    }
                    CrawlEvent::PageAdded { title, .. } => {
                        progress_bar.inc(1);
                        progress_bar.set_message(format!("Added: {}", title));
                    }
                    CrawlEvent::PageSkipped { url, .. } => {
                        progress_bar.set_message(format!("Skipped {}", url));
                    }
                    CrawlEvent::PageFailed { url, .. } => {
                        progress_bar.set_message(format!("Failed {}", url));
                    }
                    CrawlEvent::Finished { pages, .. } => {
                        progress_bar.finish_with_message(format!("Crawled {} pages", pages));
                    }
                }
            }
        }
    });

    let kb = crawl_site(
        &args.url,
        &fetcher,
        &enricher,
        &config,
        Some(progress_sender),
        cancel,
    )
    .await?;

    let _ = progress_handle.await;

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .with_context(|| format!("creating output directory {}", args.output_dir.display()))?;

    let kb_path = args.output_dir.join(&args.output);
    let kb_json = serde_json::to_string_pretty(&kb)?;
    tokio::fs::write(&kb_path, kb_json).await?;
    println!("Saved knowledge base to {}", kb_path.display());

    let dataset = build_dataset(&kb);
    let dataset_path = args.output_dir.join("chatbot_data.json");
    let dataset_json = serde_json::to_string_pretty(&dataset)?;
    tokio::fs::write(&dataset_path, dataset_json).await?;
    println!("Saved chatbot dataset to {}", dataset_path.display());

    println!();
    println!("Pages: {}", kb.metadata.total_pages);
    println!("FAQ entries: {}", kb.metadata.total_faqs);
    println!("Keywords: {}", kb.metadata.total_keywords);
    println!(
        "Skipped: {}, failed: {}",
        kb.metadata.skipped_pages, kb.metadata.failed_pages
    );
    println!("Training examples: {}", dataset.training_data.len());

    Ok(())
}

/// Build the enricher from CLI flags and the environment credential
///
/// AI enrichment is used when it is not disabled and a credential is
/// present; everything else degrades to heuristics with a warning.
fn make_enricher(args: &BuildArgs, options: EnrichOptions) -> Enricher {
    if args.no_ai {
        return Enricher::heuristic(options);
    }

    let Ok(api_key) = std::env::var(API_KEY_VAR) else {
        warn!("{} not set; using heuristic enrichment", API_KEY_VAR);
        return Enricher::heuristic(options);
    };

    let mut config = AiConfig {
        max_tokens: args.max_tokens,
        ..AiConfig::default()
    };
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }

    match AiStructurer::new(api_key, config) {
        Ok(ai) => Enricher::with_ai(ai, options),
        Err(e) => {
            warn!("AI enrichment unavailable ({}); using heuristics", e);
            Enricher::heuristic(options)
        }
    }
}

#[instrument(skip(args))]
async fn convert_command(args: ConvertArgs) -> anyhow::Result<()> {
    println!("Converting {}...", args.chatbot_file.display());

    let text = tokio::fs::read_to_string(&args.chatbot_file)
        .await
        .with_context(|| format!("reading {}", args.chatbot_file.display()))?;
    let dataset = load_dataset(&text)?;

    let classifier = match args.classifier.as_str() {
        "ai" => {
            let api_key = std::env::var(API_KEY_VAR)
                .map_err(|_| anyhow!("{} must be set for --classifier ai", API_KEY_VAR))?;
            Classifier::Ai(AiStructurer::new(api_key, AiConfig::default())?)
        }
        _ => Classifier::Keyword,
    };

    let records = categorize_dataset(&dataset, &args.business_id, &classifier).await?;
    let sql = render_sql(&records);

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "knowledge_base_inserts_{}.sql",
            args.business_id.trim()
        ))
    });
    tokio::fs::write(&output, sql).await?;

    println!(
        "Wrote {} INSERT statements to {}",
        records.len(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_invocation_reaches_help_path() {
        // No arguments parses cleanly to no subcommand
        let cli = Cli::try_parse_from(["sitekb"]).unwrap();
        assert!(cli.command.is_none());

        // and the help rendered on that path lists both subcommands
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("build"));
        assert!(help.contains("convert"));
    }
}
