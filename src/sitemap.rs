// src/sitemap.rs
//! sitemap.xml and robots.txt for the generated site.

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Relative to the site root, `""` for the index.
    pub path: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

impl SitemapEntry {
    pub fn index() -> Self {
        Self {
            path: String::new(),
            changefreq: "daily",
            priority: "1.0",
        }
    }

    pub fn page(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            changefreq: "weekly",
            priority: "0.8",
        }
    }
}

/// Render the sitemap; `base_url` must end with `/`.
pub fn sitemap_xml(base_url: &str, entries: &[SitemapEntry], lastmod: &str) -> Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("sitemap decl")?;
    w.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
    ))
    .context("sitemap urlset")?;

    for e in entries {
        let loc = format!("{base_url}{}", e.path);
        w.write_event(Event::Start(BytesStart::new("url")))?;
        for (tag, value) in [
            ("loc", loc.as_str()),
            ("lastmod", lastmod),
            ("changefreq", e.changefreq),
            ("priority", e.priority),
        ] {
            w.write_event(Event::Start(BytesStart::new(tag)))?;
            w.write_event(Event::Text(BytesText::new(value)))?;
            w.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        w.write_event(Event::End(BytesEnd::new("url")))?;
    }

    w.write_event(Event::End(BytesEnd::new("urlset")))
        .context("sitemap close")?;
    let mut out = String::from_utf8(w.into_inner()).context("sitemap utf8")?;
    out.push('\n');
    Ok(out)
}

pub fn robots_txt(base_url: &str) -> String {
    format!(
        "User-agent: *\n\
         Allow: /\n\
         \n\
         Sitemap: {base_url}{SITEMAP_FILE}\n"
    )
}
