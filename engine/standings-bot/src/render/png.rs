//! Standings card as a PNG image
//!
//! Layout: title, a header row with a divider, one 56px band per team with a
//! rank badge (green for the top three), and an "Updated" footer. Text is
//! drawn from an 8x8 bitmap font scaled up to the needed size.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use standings_engine::StandingsRow;

use super::text::updated_at;
use super::{fit_text, RenderedTable, TableRenderer, HIGHLIGHT_RANKS};
use crate::error::{BotError, Result};

pub const IMAGE_WIDTH: u32 = 900;
pub const ROW_HEIGHT: u32 = 56;
const MIN_HEIGHT: u32 = 260;
const CHROME_HEIGHT: u32 = 160;
const MAX_HEIGHT: u32 = 16_384;

const MARGIN: i32 = 36;
const CONTENT_WIDTH: u32 = IMAGE_WIDTH - 2 * MARGIN as u32;
const TITLE_BASELINE: i32 = 64;
const HEADER_BASELINE: i32 = 110;
const FIRST_ROW_BASELINE: i32 = HEADER_BASELINE + 44;
const FOOTER_OFFSET: i32 = 24;

const RANK_X: i32 = 48;
const TEAM_X: i32 = 98;
const RECORD_X: i32 = 560;
const POINTS_X: i32 = 720;
const BADGE_X: i32 = 60;
const BADGE_RADIUS: i32 = 12;

const GLYPH: i32 = 8;
const TEXT_SCALE: i32 = 2;
const TEAM_CHARS: usize = ((RECORD_X - TEAM_X - 16) / (GLYPH * TEXT_SCALE)) as usize;

const BACKGROUND: Rgb<u8> = Rgb([0x0f, 0x17, 0x2a]);
/// 4% white over the background
const STRIPE: Rgb<u8> = Rgb([0x19, 0x20, 0x32]);
const TITLE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const HEADER: Rgb<u8> = Rgb([0xe2, 0xe8, 0xf0]);
const DIVIDER: Rgb<u8> = Rgb([0x33, 0x41, 0x55]);
const TOP_BADGE: Rgb<u8> = Rgb([0x22, 0xc5, 0x5e]);
const BADGE: Rgb<u8> = Rgb([0x94, 0xa3, 0xb8]);
const TEAM: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const CELL: Rgb<u8> = Rgb([0xcb, 0xd5, 0xe1]);
const FOOTER: Rgb<u8> = Rgb([0x94, 0xa3, 0xb8]);

const ELLIPSIS: [u8; 8] = [0, 0, 0, 0, 0, 0, 0x92, 0];

/// Image height for `rows` teams, or `None` past the 16384px limit
pub fn image_height(rows: usize) -> Option<u32> {
    let rows = u32::try_from(rows).ok()?;
    let height = rows.checked_mul(ROW_HEIGHT)?.checked_add(CHROME_HEIGHT)?;
    (height <= MAX_HEIGHT).then_some(height.max(MIN_HEIGHT))
}

/// Dark standings card, 900px wide
#[derive(Debug, Clone)]
pub struct PngTableRenderer {
    tz: Tz,
}

impl PngTableRenderer {
    /// `tz` is used for the "Updated" footer timestamp
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Draw the card with an explicit timestamp
    pub fn draw_at(
        &self,
        title: &str,
        rows: &[StandingsRow],
        now: DateTime<Utc>,
    ) -> Result<RgbImage> {
        let height = image_height(rows.len()).ok_or_else(|| {
            BotError::Render(format!("{} rows do not fit in one image", rows.len()))
        })?;
        let mut image = RgbImage::from_pixel(IMAGE_WIDTH, height, BACKGROUND);

        draw_title(&mut image, title);

        let headers = [
            ("#", RANK_X),
            ("Team", TEAM_X),
            ("Record", RECORD_X),
            ("Pts", POINTS_X),
        ];
        for (label, x) in headers {
            draw_text(&mut image, label, x, HEADER_BASELINE, TEXT_SCALE, HEADER);
        }
        let divider = Rect::at(MARGIN, HEADER_BASELINE + 12).of_size(CONTENT_WIDTH, 2);
        draw_filled_rect_mut(&mut image, divider, DIVIDER);

        let mut baseline = FIRST_ROW_BASELINE;
        for (index, row) in rows.iter().enumerate() {
            draw_row(&mut image, index, row, baseline);
            baseline += ROW_HEIGHT as i32;
        }

        let footer = format!("Updated {}", updated_at(now, self.tz));
        let footer_baseline = height as i32 - FOOTER_OFFSET;
        draw_text(
            &mut image,
            &footer,
            MARGIN,
            footer_baseline,
            TEXT_SCALE,
            FOOTER,
        );

        Ok(image)
    }
}

impl TableRenderer for PngTableRenderer {
    fn render(&self, title: &str, rows: &[StandingsRow]) -> Result<RenderedTable> {
        let image = self.draw_at(title, rows, Utc::now())?;
        Ok(RenderedTable {
            bytes: encode_png(&image)?,
            extension: "png",
            content_type: "image/png",
        })
    }
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let (width, height) = image.dimensions();
    PngEncoder::new(&mut bytes)
        .write_image(image.as_raw(), width, height, ColorType::Rgb8)
        .map_err(|e| BotError::Render(format!("PNG encoding failed: {}", e)))?;
    Ok(bytes)
}

/// One line at the largest size that fits, else two lines at the smallest
fn title_lines(title: &str) -> (i32, Vec<String>) {
    let chars = title.chars().count();
    for scale in [4, 3, 2] {
        if chars <= max_chars(scale) {
            return (scale, vec![title.to_string()]);
        }
    }

    let limit = max_chars(2);
    let split = title
        .char_indices()
        .take(limit + 1)
        .filter(|(_, c)| *c == ' ')
        .map(|(i, _)| i)
        .last();
    match split {
        Some(at) => {
            let rest = fit_text(title[at..].trim(), limit);
            (2, vec![title[..at].to_string(), rest])
        }
        None => (2, vec![fit_text(title, limit)]),
    }
}

fn max_chars(scale: i32) -> usize {
    (CONTENT_WIDTH as i32 / (GLYPH * scale)) as usize
}

fn draw_title(image: &mut RgbImage, title: &str) {
    let (scale, lines) = title_lines(title);
    let line_height = GLYPH * scale + 6;
    let first_baseline = TITLE_BASELINE - line_height * (lines.len() as i32 - 1);
    for (i, line) in lines.iter().enumerate() {
        let baseline = first_baseline + line_height * i as i32;
        draw_text(image, line, MARGIN, baseline, scale, TITLE);
    }
}

fn draw_row(image: &mut RgbImage, index: usize, row: &StandingsRow, baseline: i32) {
    if index % 2 == 0 {
        let stripe = Rect::at(MARGIN, baseline - 24).of_size(CONTENT_WIDTH, 48);
        draw_filled_rect_mut(image, stripe, STRIPE);
    }

    let badge = if row.rank <= HIGHLIGHT_RANKS {
        TOP_BADGE
    } else {
        BADGE
    };
    let center_y = baseline - 8;
    draw_filled_circle_mut(image, (BADGE_X, center_y), BADGE_RADIUS, badge);

    let rank = row.rank.to_string();
    let scale = if rank.len() == 1 { 2 } else { 1 };
    let left = BADGE_X - text_width(&rank, scale) / 2;
    let top = center_y - GLYPH * scale / 2;
    draw_glyphs(image, &rank, left, top, scale, BACKGROUND);

    let team = fit_text(&row.team, TEAM_CHARS);
    draw_text(image, &team, TEAM_X, baseline, TEXT_SCALE, TEAM);
    draw_text(image, &row.record(), RECORD_X, baseline, TEXT_SCALE, CELL);
    let points = row.points.to_string();
    draw_text(image, &points, POINTS_X, baseline, TEXT_SCALE, CELL);
}

fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * GLYPH * scale
}

/// Draw text whose baseline sits at `baseline`
fn draw_text(
    image: &mut RgbImage,
    text: &str,
    x: i32,
    baseline: i32,
    scale: i32,
    color: Rgb<u8>,
) {
    draw_glyphs(image, text, x, baseline - 7 * scale, scale, color);
}

fn draw_glyphs(image: &mut RgbImage, text: &str, x: i32, top: i32, scale: i32, color: Rgb<u8>) {
    let size = scale as u32;
    for (column, c) in text.chars().enumerate() {
        let left = x + column as i32 * GLYPH * scale;
        for (dy, bits) in glyph(c).iter().enumerate() {
            let y = top + dy as i32 * scale;
            for dx in 0..GLYPH {
                if bits & (1 << dx) != 0 {
                    let cell = Rect::at(left + dx * scale, y).of_size(size, size);
                    draw_filled_rect_mut(image, cell, color);
                }
            }
        }
    }
}

fn glyph(c: char) -> [u8; 8] {
    let c = match c {
        '—' | '–' => '-',
        '‘' | '’' => '\'',
        '“' | '”' => '"',
        '…' => return ELLIPSIS,
        other => other,
    };
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}
