// src/render/calendar.rs
use std::collections::BTreeMap;

use super::{esc, layout, PageContext};
use crate::calendar::CalendarInfo;
use crate::meeting::MeetingRecord;

/// Meetings listed per cell before collapsing into "+N more".
const CELL_LIMIT: usize = 6;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Month grid, Sunday first.
pub fn render_calendar(
    info: &CalendarInfo,
    by_day: &BTreeMap<u32, Vec<MeetingRecord>>,
    ctx: &PageContext,
) -> String {
    let title = format!("{} {}", info.month, info.year);
    let mut body = format!(
        "<header>\n<h1>{}</h1>\n<p>{}</p>\n</header>\n<nav class=\"nav\">\n<a href=\"index.html\">Upcoming days</a>\n</nav>\n",
        esc(&title),
        esc(&ctx.site_title)
    );

    body.push_str("<table class=\"calendar\">\n<thead>\n<tr>");
    for w in WEEKDAYS {
        body.push_str(&format!("<th>{w}</th>"));
    }
    body.push_str("</tr>\n</thead>\n<tbody>\n<tr>");

    let lead = u32::from(info.first_day_of_week);
    for _ in 0..lead {
        body.push_str("<td></td>");
    }
    for day in 1..=info.days_in_month {
        let col = (lead + day - 1) % 7;
        if col == 0 && day != 1 {
            body.push_str("</tr>\n<tr>");
        }
        body.push_str(&cell(day, by_day.get(&day).map(Vec::as_slice).unwrap_or(&[])));
    }
    let trailing = (7 - (lead + info.days_in_month) % 7) % 7;
    for _ in 0..trailing {
        body.push_str("<td></td>");
    }
    body.push_str("</tr>\n</tbody>\n</table>\n");

    layout(ctx, &format!("{title} | {}", ctx.site_title), "", &body)
}

fn cell(day: u32, meetings: &[MeetingRecord]) -> String {
    let mut out = format!("<td><div class=\"day-number\">{day}</div>");
    for m in meetings.iter().take(CELL_LIMIT) {
        let time = m.display_time();
        let label = if time.is_empty() {
            m.display_name().to_string()
        } else {
            format!("{time} {}", m.display_name())
        };
        out.push_str(&format!(
            "<div class=\"calendar-meeting\">{}</div>",
            esc(&label)
        ));
    }
    if meetings.len() > CELL_LIMIT {
        out.push_str(&format!(
            "<div class=\"calendar-more\">+{} more</div>",
            meetings.len() - CELL_LIMIT
        ));
    }
    out.push_str("</td>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::organize_by_calendar_day;

    #[test]
    fn grid_has_whole_weeks() {
        // October 2026 starts on a Thursday and has 31 days: 4 + 31 = 35 cells.
        let info = CalendarInfo::for_month(2026, 10).unwrap();
        let by_day = organize_by_calendar_day(&[], 2026, 10);
        let ctx = PageContext {
            site_title: "T".into(),
            generated_at: "now".into(),
            total_in_feed: 0,
        };
        let html = render_calendar(&info, &by_day, &ctx);
        assert_eq!(html.matches("<td").count(), 35);
        assert_eq!(html.matches("<tr>").count(), 6); // header + 5 weeks
        assert!(html.contains("<h1>October 2026</h1>"));
    }
}
