//! # Build Pipeline
//! The ordered steps of a site build: fetch → survey → organize → pages →
//! search data → sitemap. Fetching and page writes are fatal; auxiliary
//! artifacts only warn unless the config asks for strict builds.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use metrics::counter;
use std::fmt::Display;
use std::future::Future;
use tracing::{info, warn};

use crate::calendar::{organize_by_calendar_day, CalendarInfo};
use crate::config::SiteConfig;
use crate::export;
use crate::ingest::{self, types::FeedProvider};
use crate::organize::{organize, Organized, ProcessStats};
use crate::render::{self, PageContext};
use crate::sink::ArtifactSink;
use crate::sitemap::{self, SitemapEntry};

/// Per-run inputs that do not come from the config file.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// First date of the rolling window.
    pub reference_date: NaiveDate,
    /// Also render the month calendar for the reference date's month.
    pub with_calendar: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub feed_total: usize,
    pub field_names: Vec<String>,
    pub stats: ProcessStats,
    pub days_with_meetings: usize,
    pub pages_generated: usize,
    pub search_entries: Option<usize>,
    /// Auxiliary steps that failed without failing the build.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CalendarSummary {
    pub feed_total: usize,
    pub info: CalendarInfo,
    /// Sum over all days of meetings listed on that day.
    pub listings: usize,
}

/// Result of a dry run: nothing written.
#[derive(Debug, Clone)]
pub struct StatsReport {
    pub feed_total: usize,
    pub field_names: Vec<String>,
    pub organized: Organized,
}

fn page_context<Tz: TimeZone>(cfg: &SiteConfig, now: &DateTime<Tz>, feed_total: usize) -> PageContext
where
    Tz::Offset: Display,
{
    PageContext {
        site_title: cfg.site_title.clone(),
        generated_at: now.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        total_in_feed: feed_total,
    }
}

/// Full rolling-window build.
pub async fn build_site<Tz: TimeZone>(
    provider: &dyn FeedProvider,
    cfg: &SiteConfig,
    opts: &BuildOptions,
    site: &dyn ArtifactSink,
    data: &dyn ArtifactSink,
    now: &DateTime<Tz>,
) -> Result<BuildSummary>
where
    Tz::Offset: Display,
{
    info!(provider = provider.name(), "[1/6] fetching meetings");
    let feed = ingest::fetch_feed(provider).await?;

    info!("[2/6] analyzing data structure");
    let field_names = ingest::field_names(&feed.raw);
    info!(count = field_names.len(), fields = %field_names.join(", "), "feed fields");

    info!(reference = %opts.reference_date, "[3/6] organizing meetings");
    let organized = organize(&feed.records, opts.reference_date);
    let stats = &organized.stats;
    info!(
        processed = stats.total_processed,
        skipped = stats.skipped_incomplete,
        online = stats.online_count,
        in_person = stats.in_person_count,
        hybrid = stats.hybrid_count,
        cities = stats.cities_found.len(),
        "organized"
    );
    crate::metrics::record_stats(stats);

    let ctx = page_context(cfg, now, feed.len());
    let mut summary = BuildSummary {
        feed_total: feed.len(),
        field_names,
        stats: stats.clone(),
        days_with_meetings: organized.days_with_meetings(),
        ..Default::default()
    };
    let mut sitemap_entries = vec![SitemapEntry::index()];

    info!("[4/6] writing pages");
    site.store(render::STYLESHEET_FILE, render::STYLESHEET.to_string())
        .await
        .context("writing stylesheet")?;

    for bucket in organized.non_empty_buckets() {
        let path = render::daily_path(&bucket.key());
        site.store(&path, render::render_daily(bucket, &ctx))
            .await
            .with_context(|| format!("writing daily page {path}"))?;
        info!(
            date = %bucket.key(),
            total = bucket.total(),
            online = bucket.online.len(),
            in_person = bucket.in_person_total(),
            hybrid = bucket.hybrid_total(),
            "daily page"
        );
        summary.pages_generated += 1;
        sitemap_entries.push(SitemapEntry::page(path));
    }

    let calendar_href = if opts.with_calendar {
        let (year, month) = (opts.reference_date.year(), opts.reference_date.month());
        write_calendar(&feed.records, year, month, site, &ctx).await?;
        summary.pages_generated += 1;
        sitemap_entries.push(SitemapEntry::page(render::CALENDAR_FILE));
        Some(render::CALENDAR_FILE)
    } else {
        None
    };

    site.store(
        render::INDEX_FILE,
        render::render_index(&organized, &ctx, &summary.field_names, calendar_href),
    )
    .await
    .context("writing index page")?;
    summary.pages_generated += 1;
    counter!("build_pages_written_total").increment(summary.pages_generated as u64);

    info!("[5/6] writing search data");
    let generated_at = ctx.generated_at.clone();
    let search = auxiliary(cfg.strict, "search data", &mut summary.warnings, async {
        let (index, n) = export::search_index_json(&feed.records)?;
        data.store(export::SEARCH_INDEX_FILE, index).await?;
        data.store(
            export::OPTIMIZED_FILE,
            export::optimized_json(&organized, generated_at)?,
        )
        .await?;
        data.store(export::BACKUP_FILE, export::backup_json(&feed.raw)?)
            .await?;
        info!(entries = n, days = organized.buckets.len(), "search data written");
        Ok::<_, anyhow::Error>(n)
    })
    .await?;
    summary.search_entries = search;

    info!("[6/6] writing sitemap and robots.txt");
    let lastmod = now.to_rfc3339();
    auxiliary(cfg.strict, "sitemap", &mut summary.warnings, async {
        let xml = sitemap::sitemap_xml(&cfg.base_url, &sitemap_entries, &lastmod)?;
        site.store(sitemap::SITEMAP_FILE, xml).await?;
        site.store(sitemap::ROBOTS_FILE, sitemap::robots_txt(&cfg.base_url))
            .await?;
        Ok::<_, anyhow::Error>(())
    })
    .await?;

    Ok(summary)
}

/// Alternate flow: the month calendar page only.
pub async fn build_calendar<Tz: TimeZone>(
    provider: &dyn FeedProvider,
    cfg: &SiteConfig,
    year: i32,
    month: u32,
    site: &dyn ArtifactSink,
    now: &DateTime<Tz>,
) -> Result<CalendarSummary>
where
    Tz::Offset: Display,
{
    let feed = ingest::fetch_feed(provider).await?;
    let ctx = page_context(cfg, now, feed.len());
    site.store(render::STYLESHEET_FILE, render::STYLESHEET.to_string())
        .await
        .context("writing stylesheet")?;
    let (info, listings) = write_calendar(&feed.records, year, month, site, &ctx).await?;
    counter!("build_pages_written_total").increment(1);
    Ok(CalendarSummary {
        feed_total: feed.len(),
        info,
        listings,
    })
}

/// Fetch and organize without writing anything.
pub async fn collect_stats(provider: &dyn FeedProvider, reference: NaiveDate) -> Result<StatsReport> {
    let feed = ingest::fetch_feed(provider).await?;
    let organized = organize(&feed.records, reference);
    crate::metrics::record_stats(&organized.stats);
    Ok(StatsReport {
        feed_total: feed.len(),
        field_names: ingest::field_names(&feed.raw),
        organized,
    })
}

async fn write_calendar(
    records: &[crate::meeting::MeetingRecord],
    year: i32,
    month: u32,
    site: &dyn ArtifactSink,
    ctx: &PageContext,
) -> Result<(CalendarInfo, usize)> {
    let info = CalendarInfo::for_month(year, month)
        .with_context(|| format!("invalid calendar month {year}-{month:02}"))?;
    let by_day = organize_by_calendar_day(records, year, month);
    let listings = by_day.values().map(Vec::len).sum();
    site.store(
        render::CALENDAR_FILE,
        render::render_calendar(&info, &by_day, ctx),
    )
    .await
    .context("writing calendar page")?;
    info!(month = %info.month, year = info.year, listings, "calendar page");
    Ok((info, listings))
}

/// Run a step whose failure is a warning unless `strict`.
async fn auxiliary<T, F>(
    strict: bool,
    what: &str,
    warnings: &mut Vec<String>,
    step: F,
) -> Result<Option<T>>
where
    F: Future<Output = Result<T>>,
{
    match step.await {
        Ok(v) => Ok(Some(v)),
        Err(e) if strict => Err(e.context(format!("writing {what}"))),
        Err(e) => {
            warn!(error = %format!("{e:#}"), step = what, "auxiliary artifact failed");
            counter!("build_artifact_failures_total").increment(1);
            warnings.push(format!("{what}: {e:#}"));
            Ok(None)
        }
    }
}
