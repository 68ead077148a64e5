//! TSML Meetings — CLI entrypoint.
//! Fetches the meeting feed once, builds the static site, exits non-zero when
//! the feed cannot be loaded.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tsml_meetings::config::SiteConfig;
use tsml_meetings::ingest::providers::{JsonFileProvider, TsmlHttpProvider};
use tsml_meetings::ingest::types::FeedProvider;
use tsml_meetings::metrics::{BuildMetrics, METRICS_FILE};
use tsml_meetings::pipeline::{self, BuildOptions, BuildSummary};
use tsml_meetings::sink::{ArtifactSink, DirSink};

#[derive(Parser)]
#[command(name = "tsml-meetings", version, about = "Static meeting directory from a TSML feed")]
struct Cli {
    /// Site config (TOML or JSON). Defaults to $MEETINGS_CONFIG_PATH, then config/meetings.{toml,json}.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct FeedArgs {
    /// Read the feed from a local JSON file instead of HTTP.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Request the feed directly, bypassing the CORS proxy.
    #[arg(long)]
    no_proxy: bool,
    #[arg(long)]
    feed_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the rolling five-week site.
    Build {
        /// First day of the window (YYYY-MM-DD); today in the configured timezone by default.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Also render the month calendar page.
        #[arg(long)]
        calendar: bool,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        data: Option<PathBuf>,
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Render only the month calendar page.
    Calendar {
        /// YYYY-MM; the current month by default.
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Fetch and organize, print the statistics, write nothing.
    Stats {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        feed: FeedArgs,
    },
}

fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let (y, m) = s
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got {s:?}"))?;
    let year: i32 = y.parse().map_err(|_| format!("bad year in {s:?}"))?;
    let month: u32 = m.parse().map_err(|_| format!("bad month in {s:?}"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month out of range in {s:?}"));
    }
    Ok((year, month))
}

/// Compact logs to stderr; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tsml_meetings=info,warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(explicit: Option<&PathBuf>) -> Result<SiteConfig> {
    let cfg = match explicit {
        Some(p) => SiteConfig::load_from(p)?,
        None => SiteConfig::load_default()?,
    };
    Ok(cfg.with_env_overrides())
}

fn provider_for(cfg: &mut SiteConfig, feed: &FeedArgs) -> Result<Box<dyn FeedProvider>> {
    if let Some(url) = &feed.feed_url {
        cfg.feed_url = url.clone();
    }
    if feed.no_proxy {
        cfg.proxy_url = None;
    }
    let provider: Box<dyn FeedProvider> = match &feed.input {
        Some(path) => Box::new(JsonFileProvider::from_path(path)),
        None => Box::new(TsmlHttpProvider::new(
            cfg.feed_url.clone(),
            cfg.proxy_url.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )?),
    };
    Ok(provider)
}

async fn run(cli: Cli) -> Result<()> {
    let mut cfg = load_config(cli.config.as_ref())?;
    let now = cfg.now()?;

    let metrics = if cfg.metrics_snapshot {
        Some(BuildMetrics::install()?)
    } else {
        None
    };

    match cli.command {
        Command::Build {
            date,
            calendar,
            output,
            data,
            feed,
        } => {
            if let Some(o) = output {
                cfg.output_dir = o;
            }
            if let Some(d) = data {
                cfg.data_dir = d;
            }
            let provider = provider_for(&mut cfg, &feed)?;
            let opts = BuildOptions {
                reference_date: date.unwrap_or_else(|| now.date_naive()),
                with_calendar: calendar,
            };
            let site = DirSink::new(&cfg.output_dir);
            let data_sink = DirSink::new(&cfg.data_dir);

            let summary =
                pipeline::build_site(provider.as_ref(), &cfg, &opts, &site, &data_sink, &now)
                    .await?;

            if let Some(m) = &metrics {
                data_sink
                    .store(METRICS_FILE, m.render())
                    .await
                    .context("writing metrics snapshot")?;
            }
            print_build_summary(&summary, &site, &data_sink);
        }
        Command::Calendar {
            month,
            output,
            feed,
        } => {
            if let Some(o) = output {
                cfg.output_dir = o;
            }
            let provider = provider_for(&mut cfg, &feed)?;
            let (year, month) = month.unwrap_or((now.year(), now.month()));
            let site = DirSink::new(&cfg.output_dir);
            let s = pipeline::build_calendar(provider.as_ref(), &cfg, year, month, &site, &now)
                .await?;
            println!("Calendar built: {} {}", s.info.month, s.info.year);
            println!("  - Meetings from TSML source: {}", s.feed_total);
            println!("  - Days in month: {}", s.info.days_in_month);
            println!("  - Listings: {}", s.listings);
            println!("  - Page: {}", site.describe(tsml_meetings::render::CALENDAR_FILE));
        }
        Command::Stats { date, feed } => {
            let provider = provider_for(&mut cfg, &feed)?;
            let reference = date.unwrap_or_else(|| now.date_naive());
            let r = pipeline::collect_stats(provider.as_ref(), reference).await?;
            let s = &r.organized.stats;
            println!("Feed entries: {}", r.feed_total);
            println!("Fields ({}): {}", r.field_names.len(), r.field_names.join(", "));
            println!("Processed: {}", s.total_processed);
            println!("Included: {}", s.included());
            println!("Skipped (incomplete): {}", s.skipped_incomplete);
            println!(
                "Online: {}  In-person: {}  Hybrid: {}",
                s.online_count, s.in_person_count, s.hybrid_count
            );
            let cities: Vec<&str> = s.cities_found.iter().map(String::as_str).collect();
            println!("Cities ({}): {}", cities.len(), cities.join(", "));
            println!("Days with meetings: {}", r.organized.days_with_meetings());
        }
    }
    Ok(())
}

fn print_build_summary(s: &BuildSummary, site: &DirSink, data: &DirSink) {
    println!("Build completed");
    println!("Statistics:");
    println!("  - Total meetings from TSML source: {}", s.feed_total);
    println!("  - Meetings processed: {}", s.stats.total_processed);
    println!("  - Meetings included: {}", s.stats.included());
    println!("  - Meetings skipped (incomplete): {}", s.stats.skipped_incomplete);
    println!("  - Online meetings: {}", s.stats.online_count);
    println!("  - In-person meetings: {}", s.stats.in_person_count);
    println!("  - Hybrid meetings: {}", s.stats.hybrid_count);
    println!("  - Cities found: {}", s.stats.cities_found.len());
    println!("  - Days with meetings: {}", s.days_with_meetings);
    println!("  - Pages generated: {}", s.pages_generated);
    if let Some(n) = s.search_entries {
        println!("  - Search index entries: {n}");
    }
    println!("Output:");
    println!("  - Site: {}", site.root().display());
    println!("  - Data: {}", data.root().display());
    for w in &s.warnings {
        println!("Warning: {w}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "build failed");
            eprintln!("Build failed: {e:#}");
            eprintln!(
                "No fallback data is used. Check the feed URL, the CORS proxy, and network access."
            );
            ExitCode::FAILURE
        }
    }
}
