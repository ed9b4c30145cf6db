use anyhow::{Context, Result};
use clap::Parser;
use jobscout_browser::{BrowserEngine, BrowserPage};
use jobscout_core::AppConfig;
use jobscout_scraper::{ChallengeResolver, DeclineOperator, ScrapeOrchestrator, ScrapeReport};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "jobscout", version, about = "Scrape job listings into a CSV file")]
struct Cli {
    /// Job title or keywords to search for
    position: Option<String>,
    /// Location filter
    location: Option<String>,
    /// Number of jobs to collect
    target_count: Option<usize>,

    /// Keep listing snippets instead of visiting detail pages
    #[arg(long)]
    no_descriptions: bool,
    /// Run the browser without a window
    #[arg(long)]
    headless: bool,
    /// Fail challenges that need a human instead of waiting for one
    #[arg(long)]
    non_interactive: bool,
    /// Directory for the CSV output
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Configuration file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the effective configuration to the default location and exit
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(position) = &self.position {
            config.search.position.clone_from(position);
        }
        if let Some(location) = &self.location {
            config.search.location.clone_from(location);
        }
        if let Some(count) = self.target_count {
            config.search.target_count = count;
        }
        if self.no_descriptions {
            config.search.enrich_descriptions = false;
        }
        if self.headless {
            config.browser.headless = true;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory.clone_from(dir);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,jobscout=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    info!("Starting jobscout v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        AppConfig::load_with_env(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if cli.save_config {
        config.save().context("Failed to save configuration")?;
        info!("Configuration written to {}", AppConfig::config_path()?.display());
        return Ok(());
    }

    let engine = BrowserEngine::launch(&config.browser)
        .await
        .context("Failed to launch browser")?;
    let result = scrape(&engine, &config, cli.non_interactive).await;

    if let Err(e) = engine.close().await {
        tracing::warn!("Failed to close browser cleanly: {}", e);
    }

    let report = result?;
    print_summary(&report);
    Ok(())
}

async fn scrape(
    engine: &BrowserEngine,
    config: &AppConfig,
    non_interactive: bool,
) -> Result<ScrapeReport> {
    let page = engine.new_page().await.context("Failed to open a page")?;

    let mut resolver = ChallengeResolver::<BrowserPage>::new(config.challenge.clone());
    if non_interactive {
        resolver = resolver.with_operator(Box::new(DeclineOperator));
    }

    let orchestrator =
        ScrapeOrchestrator::new(config, resolver).context("Failed to build search")?;
    Ok(orchestrator.run(&page).await)
}

fn print_summary(report: &ScrapeReport) {
    println!("Total jobs collected: {}", report.records.len());
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    match &report.output {
        Some(path) => println!("Saved to: {}", path.display()),
        None if report.records.is_empty() => println!("No jobs found, nothing saved"),
        None => println!("Output file could not be written, see the log for details"),
    }
}
