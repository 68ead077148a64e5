// src/render/mod.rs
//! HTML pages. Plain string building with escaping at every interpolation.

pub mod calendar;
pub mod daily;
pub mod index;

pub use calendar::render_calendar;
pub use daily::render_daily;
pub use index::render_index;

use html_escape::{encode_double_quoted_attribute, encode_text};
use reqwest::Url;

use crate::ingest::normalize_text;
use crate::meeting::MeetingRecord;

pub const STYLESHEET: &str = include_str!("../../assets/styles.css");
pub const STYLESHEET_FILE: &str = "css/styles.css";
pub const INDEX_FILE: &str = "index.html";
pub const CALENDAR_FILE: &str = "calendar.html";

/// Daily page path for an ISO date key.
pub fn daily_path(date_key: &str) -> String {
    format!("daily/{date_key}.html")
}

/// Values shared by every page of one build.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub site_title: String,
    pub generated_at: String,
    /// Raw entries in the feed, before any filtering.
    pub total_in_feed: usize,
}

pub(crate) fn esc(s: &str) -> String {
    encode_text(s).to_string()
}

pub(crate) fn attr(s: &str) -> String {
    encode_double_quoted_attribute(s).to_string()
}

/// Full document around `body`. `root` is the relative path back to the site
/// root (`""` or `"../"`).
pub(crate) fn layout(ctx: &PageContext, title: &str, root: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="{root}{css}">
</head>
<body>
<div class="container">
{body}
<footer class="footer">
<p>Generated {generated} from the live TSML feed ({total} meetings).</p>
<p><a href="{root}{index}">{site}</a></p>
</footer>
</div>
</body>
</html>
"#,
        title = esc(title),
        root = attr(root),
        css = STYLESHEET_FILE,
        body = body,
        generated = esc(&ctx.generated_at),
        total = ctx.total_in_feed,
        index = INDEX_FILE,
        site = esc(&ctx.site_title),
    )
}

/// Map search link: coordinates when the feed has them, else the address text.
pub(crate) fn map_url(r: &MeetingRecord) -> Option<String> {
    let query = match (r.latitude, r.longitude) {
        (Some(lat), Some(lng)) => format!("{lat},{lng}"),
        _ => r.address()?.to_string(),
    };
    Url::parse_with_params(
        "https://www.google.com/maps/search/",
        &[("api", "1"), ("query", query.as_str())],
    )
    .ok()
    .map(String::from)
}

/// One meeting as a card.
pub(crate) fn meeting_card(r: &MeetingRecord) -> String {
    let mut out = String::from("<article class=\"meeting-card\">\n");
    let time = r.display_time();
    if !time.is_empty() {
        out.push_str(&format!("<div class=\"meeting-time\">{}</div>\n", esc(time)));
    }
    let name = esc(r.display_name());
    match r.url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => out.push_str(&format!(
            "<div class=\"meeting-name\"><a href=\"{}\">{name}</a></div>\n",
            attr(url)
        )),
        None => out.push_str(&format!("<div class=\"meeting-name\">{name}</div>\n")),
    }
    if !r.types.is_empty() {
        out.push_str(&format!(
            "<div class=\"meeting-types\">{}</div>\n",
            esc(&r.types.join(", "))
        ));
    }

    let mut links = String::new();
    if let Some(conf) = r.conference() {
        links.push_str(&format!(
            "<a class=\"zoom-link\" href=\"{}\">Join online</a>\n",
            attr(conf)
        ));
    }
    if let (Some(addr), Some(map)) = (r.address(), map_url(r)) {
        links.push_str(&format!(
            "<a class=\"address-link\" href=\"{}\">{}</a>\n",
            attr(&map),
            esc(addr)
        ));
    }
    if !links.is_empty() {
        out.push_str(&format!("<div class=\"meeting-links\">\n{links}</div>\n"));
    }

    for notes in [r.location_notes.as_deref(), r.notes.as_deref()]
        .into_iter()
        .flatten()
        .map(normalize_text)
        .filter(|n| !n.is_empty())
    {
        out.push_str(&format!("<p class=\"meeting-notes\">{}</p>\n", esc(&notes)));
    }
    if let Some(entity) = r.entity.as_deref().filter(|e| !e.is_empty()) {
        out.push_str(&format!(
            "<div class=\"meeting-entity\">{}</div>\n",
            esc(entity)
        ));
    }
    out.push_str("</article>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_escapes_feed_text() {
        let r = MeetingRecord {
            name: Some("<script>alert(1)</script>".into()),
            time: Some("19:00".into()),
            ..Default::default()
        };
        let html = meeting_card(&r);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn map_url_prefers_coordinates() {
        let mut r = MeetingRecord {
            formatted_address: Some("1 Main St, Seattle, WA".into()),
            ..Default::default()
        };
        let by_addr = map_url(&r).unwrap();
        assert!(by_addr.contains("query=1+Main+St%2C+Seattle%2C+WA"));
        r.latitude = Some(47.5);
        r.longitude = Some(-122.25);
        assert!(map_url(&r).unwrap().ends_with("query=47.5%2C-122.25"));
    }
}
