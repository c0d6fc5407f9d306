use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use standings_engine::StandingsRow;

use super::{fit_text, RenderedTable, TableRenderer, HIGHLIGHT_RANKS};
use crate::error::Result;

/// Width of the team column in characters
pub const TEAM_WIDTH: usize = 26;

/// Fixed-width plain text table
#[derive(Debug, Clone)]
pub struct TextTableRenderer {
    tz: Tz,
}

impl TextTableRenderer {
    /// `tz` is used for the "Updated" footer timestamp
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Render with an explicit timestamp
    pub fn render_at(&self, title: &str, rows: &[StandingsRow], now: DateTime<Utc>) -> String {
        let mut out = String::new();
        out.push_str(title);
        out.push_str("\n\n");

        let header = format!(
            "{:>4}  {:<width$}  {:>7}  {:>8}",
            "#",
            "Team",
            "Record",
            "Pts",
            width = TEAM_WIDTH
        );
        let divider = "-".repeat(header.chars().count());
        out.push_str(&header);
        out.push('\n');
        out.push_str(&divider);
        out.push('\n');

        for row in rows {
            let marker = if row.rank <= HIGHLIGHT_RANKS { '*' } else { ' ' };
            out.push_str(&format!(
                "{}{:>3}  {:<width$}  {:>7}  {:>8}\n",
                marker,
                row.rank,
                fit_text(&row.team, TEAM_WIDTH),
                row.record(),
                row.points.to_string(),
                width = TEAM_WIDTH
            ));
        }

        out.push('\n');
        out.push_str(&format!("Updated {}\n", updated_at(now, self.tz)));
        out
    }
}

impl TableRenderer for TextTableRenderer {
    fn render(&self, title: &str, rows: &[StandingsRow]) -> Result<RenderedTable> {
        Ok(RenderedTable {
            bytes: self.render_at(title, rows, Utc::now()).into_bytes(),
            extension: "txt",
            content_type: "text/plain; charset=utf-8",
        })
    }
}

/// Footer timestamp, e.g. "Oct 14, 2025 7:00 AM CDT"
pub(super) fn updated_at(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz)
        .format("%b %-d, %Y %-I:%M %p %Z")
        .to_string()
}
