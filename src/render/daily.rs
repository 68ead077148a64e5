// src/render/daily.rs
use super::{esc, layout, meeting_card, PageContext};
use crate::organize::{CityGroups, ClassifiedMeeting, DateBucket};

/// Page for one date: online list, then in-person and hybrid grouped by city.
pub fn render_daily(bucket: &DateBucket, ctx: &PageContext) -> String {
    let heading = format!("{}, {}", bucket.day_name, bucket.formatted_date);
    let mut body = format!(
        "<header>\n<h1>{}</h1>\n<p>{} meetings: {} online, {} in person, {} hybrid</p>\n</header>\n",
        esc(&heading),
        bucket.total(),
        bucket.online.len(),
        bucket.in_person_total(),
        bucket.hybrid_total(),
    );

    body.push_str("<nav class=\"section-nav\">\n");
    body.push_str("<a href=\"../index.html\">All dates</a>\n");
    for (anchor, label, count) in [
        ("online", "Online", bucket.online.len()),
        ("in-person", "In-Person", bucket.in_person_total()),
        ("hybrid", "Hybrid", bucket.hybrid_total()),
    ] {
        if count > 0 {
            body.push_str(&format!("<a href=\"#{anchor}\">{label} ({count})</a>\n"));
        }
    }
    body.push_str("</nav>\n");

    body.push_str(&section("online", "Online Meetings", &flat(&bucket.online)));
    body.push_str(&section("in-person", "In-Person Meetings", &grouped(&bucket.in_person)));
    body.push_str(&section("hybrid", "Hybrid Meetings", &grouped(&bucket.hybrid)));

    layout(ctx, &format!("{heading} | {}", ctx.site_title), "../", &body)
}

fn section(anchor: &str, title: &str, inner: &str) -> String {
    let inner = if inner.is_empty() {
        "<p class=\"no-meetings\">No meetings scheduled.</p>\n".to_string()
    } else {
        inner.to_string()
    };
    format!("<section class=\"meeting-section\" id=\"{anchor}\">\n<h2>{title}</h2>\n{inner}</section>\n")
}

fn flat(list: &[ClassifiedMeeting]) -> String {
    list.iter().map(|m| meeting_card(&m.record)).collect()
}

fn grouped(groups: &CityGroups) -> String {
    groups
        .iter()
        .map(|(city, list)| {
            format!(
                "<div class=\"city-group\">\n<h3 class=\"city-header\">{} ({})</h3>\n{}</div>\n",
                esc(city),
                list.len(),
                flat(list)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::MeetingRecord;
    use crate::organize::organize;
    use chrono::NaiveDate;

    #[test]
    fn city_headers_follow_bucket_order() {
        let mk = |addr: &str, name: &str| MeetingRecord {
            name: Some(name.into()),
            day: Some(2),
            time: Some("19:00".into()),
            formatted_address: Some(addr.into()),
            ..Default::default()
        };
        let d = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let out = organize(
            &[mk("1 A St, Seattle, WA 98101", "S"), mk("2 B St, Bellevue, WA 98004", "B")],
            d,
        );
        let ctx = PageContext {
            site_title: "Test".into(),
            generated_at: "now".into(),
            total_in_feed: 2,
        };
        let html = render_daily(&out.buckets[&d], &ctx);
        let b = html.find("Bellevue (1)").unwrap();
        let s = html.find("Seattle (1)").unwrap();
        assert!(b < s);
        assert!(html.contains("<h1>Tuesday, October 20, 2026</h1>"));
        assert!(!html.contains("href=\"#online\""));
    }
}
