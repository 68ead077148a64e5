use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::organize::ProcessStats;

pub const METRICS_FILE: &str = "build-metrics.prom";

pub struct BuildMetrics {
    pub handle: PrometheusHandle,
}

impl BuildMetrics {
    /// Install the Prometheus recorder globally. Only one recorder can be
    /// installed per process.
    pub fn install() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        describe();
        Ok(Self { handle })
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

fn describe() {
    describe_counter!("build_pages_written_total", "HTML pages written.");
    describe_counter!(
        "build_artifact_failures_total",
        "Auxiliary artifacts (search data, sitemap) that failed to write."
    );
    describe_gauge!("organize_total_processed", "Records seen by the organizer.");
    describe_gauge!("organize_skipped_incomplete", "Records without address or URL.");
    describe_gauge!("organize_meetings", "Included records per attendance category.");
    describe_gauge!("organize_cities", "Distinct cities found.");
}

/// Publish one organizing pass as gauges.
pub fn record_stats(stats: &ProcessStats) {
    gauge!("organize_total_processed").set(stats.total_processed as f64);
    gauge!("organize_skipped_incomplete").set(stats.skipped_incomplete as f64);
    gauge!("organize_meetings", "category" => "online").set(stats.online_count as f64);
    gauge!("organize_meetings", "category" => "in_person").set(stats.in_person_count as f64);
    gauge!("organize_meetings", "category" => "hybrid").set(stats.hybrid_count as f64);
    gauge!("organize_cities").set(stats.cities_found.len() as f64);
}
