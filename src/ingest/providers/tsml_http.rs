// src/ingest/providers/tsml_http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

use crate::ingest::types::FeedProvider;

/// Fetches a TSML JSON cache over HTTP, optionally through a CORS proxy that
/// takes the real target as `?url=`.
pub struct TsmlHttpProvider {
    feed_url: String,
    proxy_url: Option<String>,
    client: reqwest::Client,
}

impl TsmlHttpProvider {
    pub fn new(feed_url: impl Into<String>, proxy_url: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tsml-meetings/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")?;
        Ok(Self {
            feed_url: feed_url.into(),
            proxy_url: proxy_url.filter(|p| !p.trim().is_empty()),
            client,
        })
    }

    /// The URL actually requested.
    pub fn request_url(&self) -> Result<Url> {
        match &self.proxy_url {
            Some(proxy) => Url::parse_with_params(proxy, &[("url", self.feed_url.as_str())])
                .with_context(|| format!("invalid proxy url {proxy}")),
            None => Url::parse(&self.feed_url)
                .with_context(|| format!("invalid feed url {}", self.feed_url)),
        }
    }
}

#[async_trait]
impl FeedProvider for TsmlHttpProvider {
    async fn fetch_raw(&self) -> Result<Vec<Value>> {
        let url = self.request_url()?;
        let t0 = std::time::Instant::now();
        tracing::debug!(%url, "requesting feed");

        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = ?e, provider = self.name(), "feed http error");
                counter!("feed_fetch_errors_total").increment(1);
                return Err(e).context("feed http get()");
            }
        };
        let status = resp.status();
        if !status.is_success() {
            counter!("feed_fetch_errors_total").increment(1);
            anyhow::bail!("feed request failed with status {status}");
        }
        let body = resp.text().await.context("feed http .text()")?;
        let items = super::parse_feed_body(&body)?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_fetch_ms").record(ms);
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "tsml-http"
    }
}
