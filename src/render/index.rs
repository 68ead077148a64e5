// src/render/index.rs
use super::{attr, daily_path, esc, layout, PageContext};
use crate::organize::Organized;

/// Landing page: stats, one link per date that has meetings, feed field survey.
pub fn render_index(
    organized: &Organized,
    ctx: &PageContext,
    field_names: &[String],
    calendar_href: Option<&str>,
) -> String {
    let stats = &organized.stats;
    let mut body = format!("<header>\n<h1>{}</h1>\n</header>\n", esc(&ctx.site_title));

    if let Some(href) = calendar_href {
        body.push_str(&format!(
            "<nav class=\"nav\">\n<a href=\"{}\">Monthly calendar</a>\n</nav>\n",
            attr(href)
        ));
    }

    let cities: Vec<&str> = stats.cities_found.iter().map(String::as_str).collect();
    body.push_str(&format!(
        "<section class=\"stats\">\n\
         <p><strong>Meetings in feed:</strong> {}</p>\n\
         <p><strong>Processed:</strong> {} &middot; <strong>Included:</strong> {} &middot; <strong>Skipped (incomplete):</strong> {}</p>\n\
         <p><strong>Online:</strong> {} &middot; <strong>In person:</strong> {} &middot; <strong>Hybrid:</strong> {}</p>\n\
         <p><strong>Cities ({}):</strong> {}</p>\n\
         </section>\n",
        ctx.total_in_feed,
        stats.total_processed,
        stats.included(),
        stats.skipped_incomplete,
        stats.online_count,
        stats.in_person_count,
        stats.hybrid_count,
        cities.len(),
        esc(&cities.join(", ")),
    ));

    body.push_str("<h2>Upcoming days</h2>\n");
    let days: Vec<_> = organized.non_empty_buckets().collect();
    if days.is_empty() {
        body.push_str("<p class=\"no-meetings\">No meetings found in the next five weeks.</p>\n");
    } else {
        body.push_str("<ul class=\"day-nav\">\n");
        for b in days {
            body.push_str(&format!(
                "<li><a href=\"{}\"><span class=\"day-name\">{}, {}</span><span class=\"meeting-count\">{}</span></a></li>\n",
                attr(&daily_path(&b.key())),
                esc(&b.day_name),
                esc(&b.formatted_date),
                b.total()
            ));
        }
        body.push_str("</ul>\n");
    }

    if !field_names.is_empty() {
        body.push_str(&format!(
            "<section class=\"field-names\">\n<h3>Feed fields ({})</h3>\n<ul class=\"field-list\">\n",
            field_names.len()
        ));
        for f in field_names {
            body.push_str(&format!("<li>{}</li>\n", esc(f)));
        }
        body.push_str("</ul>\n</section>\n");
    }

    layout(ctx, &ctx.site_title, "", &body)
}
