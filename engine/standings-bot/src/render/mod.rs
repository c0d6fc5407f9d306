//! Standings table rendering
//!
//! A [`TableRenderer`] turns a title and ranked rows into an attachment. The
//! bot posts PNG images by default; the plain text table is kept for
//! terminals and channels that block images.

mod png;
mod text;

use standings_engine::StandingsRow;

use crate::error::Result;

pub use png::{image_height, PngTableRenderer, IMAGE_WIDTH, ROW_HEIGHT};
pub use text::{TextTableRenderer, TEAM_WIDTH};

/// Ranks flagged as the top of the table
pub(crate) const HIGHLIGHT_RANKS: u32 = 3;

/// Rendered table ready for attaching to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub content_type: &'static str,
}

/// Turns a title and ranked rows into an attachable document
pub trait TableRenderer: Send + Sync {
    fn render(&self, title: &str, rows: &[StandingsRow]) -> Result<RenderedTable>;
}

/// Truncate to `max_chars`, marking the cut with an ellipsis
pub(crate) fn fit_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
