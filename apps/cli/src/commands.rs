//! CLI argument definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use contentprofiler_core::{
    PipelineSummary, ProfilerContext, ProgressReporter, parse_bulk_query, run_bulk, run_pipeline,
    write_ideas_and_pitches,
};
use contentprofiler_shared::AppConfig;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Content Profiler: build a content profile for a business from search,
/// maps, its own website and a language model.
#[derive(Parser)]
#[command(
    name = "content-profiler",
    version,
    about = "Build business content profiles from public web sources.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Business name or search query. With --bulk: "<zip>|<genre>".
    #[arg(long)]
    pub query: String,

    /// Output base directory.
    #[arg(long, default_value = "outputs")]
    pub out: PathBuf,

    /// Also generate ideas.md and pitches.md.
    #[arg(long)]
    pub ideas: bool,

    /// Bulk mode: profile businesses of one genre near a ZIP code.
    #[arg(long)]
    pub bulk: bool,

    /// Settings file (TOML). Defaults to ~/.contentprofiler/contentprofiler.toml.
    #[arg(long, env = "CONTENTPROFILER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contentprofiler=info",
        1 => "contentprofiler=debug",
        _ => "contentprofiler=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run single-query or bulk mode.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if cli.bulk {
        // Validate before touching the network or credentials.
        let bulk = parse_bulk_query(&cli.query)?;
        let ctx = load_context(&cli)?;
        return cmd_bulk(&ctx, &bulk.zip, &bulk.genre, &cli).await;
    }

    let ctx = load_context(&cli)?;
    cmd_profile(&ctx, &cli).await
}

fn load_context(cli: &Cli) -> Result<ProfilerContext> {
    let config = AppConfig::load(cli.config.as_deref())?;
    Ok(ProfilerContext::new(&config)?)
}

async fn cmd_profile(ctx: &ProfilerContext, cli: &Cli) -> Result<()> {
    info!(query = %cli.query, out = %cli.out.display(), "profiling");

    let reporter = CliProgress::new();
    let run = run_pipeline(ctx, &cli.query, &cli.out, &reporter).await?;
    reporter.spinner.finish_and_clear();

    println!("Wrote outputs to: {}", run.summary.out_dir.display());
    if let Some(url) = &run.summary.primary_url {
        println!("Primary URL: {url}");
    }
    println!("Pages scraped: {}", run.summary.pages_scraped);

    if cli.ideas {
        let reporter = CliProgress::new();
        match write_ideas_and_pitches(ctx, &run.sources, &run.summary.out_dir, &reporter).await {
            Ok(()) => println!("Ideas and pitches written."),
            Err(e) => warn!(error = %e, "ideas/pitches generation failed"),
        }
        reporter.spinner.finish_and_clear();
    }

    Ok(())
}

async fn cmd_bulk(ctx: &ProfilerContext, zip: &str, genre: &str, cli: &Cli) -> Result<()> {
    info!(zip, genre, out = %cli.out.display(), "bulk profiling");

    let reporter = CliProgress::new();
    let entries = run_bulk(ctx, zip, genre, &cli.out, &reporter).await?;
    reporter.spinner.finish_and_clear();

    println!("Bulk complete. Results:");
    for entry in &entries {
        println!("- {} -> {}", entry.query, entry.out_dir.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix}{msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_scraped(&self, url: &str, current: usize, max: usize) {
        self.spinner
            .set_message(format!("Scraping [{current}/{max}] {url}"));
    }

    fn done(&self, summary: &PipelineSummary) {
        self.spinner.set_message(format!(
            "Done: {} pages, {} Q&A pairs",
            summary.pages_scraped, summary.training_qa_pairs
        ));
    }

    fn business_started(&self, query: &str, index: usize, total: usize) {
        self.spinner.set_prefix(format!("[{index}/{total}] "));
        self.spinner.println(format!("[{index}/{total}] Profiling: {query}"));
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
