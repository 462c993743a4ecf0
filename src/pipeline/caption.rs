//! Caption text and overlay geometry.
//!
//! Everything here is pure arithmetic on strings and integers so it can be
//! unit-tested without touching pixels. Geometry scales with the page height:
//! a 4K screenshot gets a proportionally larger band than a 720p one.

use crate::pipeline::fonts::TextBox;
use image::Rgba;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static SCREENSHOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)screenshot").expect("static regex is valid"));

/// Filename stem with "screenshot" removed (any case) and `_- ` trimmed.
pub fn clean_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    SCREENSHOT_RE
        .replace_all(stem, "")
        .trim_matches(|c| matches!(c, '_' | '-' | ' '))
        .to_string()
}

/// `"<cleaned-name>   <index>/<total>"`, with `index` 1-based.
pub fn caption_text(filename: &str, index: usize, total: usize) -> String {
    format!("{}   {}/{}", clean_name(filename), index, total)
}

/// Visual parameters of the caption overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    /// Band height as a fraction of the page height.
    pub band_ratio: f32,
    /// Font size as a fraction of the band height.
    pub font_ratio: f32,
    /// Text top offset as a fraction of the band height.
    pub text_top_ratio: f32,
    pub padding_x: i64,
    pub padding_y: i64,
    pub corner_radius: i64,
    pub border_width: i64,
    pub fill: Rgba<u8>,
    pub border: Rgba<u8>,
    pub text: Rgba<u8>,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            band_ratio: 0.05,
            font_ratio: 0.5,
            text_top_ratio: 0.2,
            padding_x: 40,
            padding_y: 10,
            corner_radius: 12,
            border_width: 3,
            fill: Rgba([255, 255, 255, 230]),
            border: Rgba([255, 215, 0, 255]),
            text: Rgba([0, 0, 0, 255]),
        }
    }
}

impl CaptionStyle {
    /// Band height in pixels for a page of `page_height`.
    pub fn band_height(&self, page_height: u32) -> u32 {
        (page_height as f32 * self.band_ratio) as u32
    }

    /// Font size in pixels for a page of `page_height`, at least 1.
    pub fn font_px(&self, page_height: u32) -> u32 {
        ((self.band_height(page_height) as f32 * self.font_ratio) as u32).max(1)
    }
}

/// Inclusive pixel rectangle; may extend past the page edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

/// Where the caption text and its background go on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionLayout {
    pub text_x: i64,
    pub text_y: i64,
    pub font_px: u32,
    pub background: Bounds,
}

/// Lay out a caption of size `text` on a `page_width` × `page_height` page.
///
/// `text` must have been measured at `style.font_px(page_height)`.
pub fn layout(page_width: u32, page_height: u32, text: TextBox, style: &CaptionStyle) -> CaptionLayout {
    let band = style.band_height(page_height);
    let text_x = (page_width as i64 - text.width as i64).div_euclid(2);
    let text_y = (band as f32 * style.text_top_ratio) as i64;

    CaptionLayout {
        text_x,
        text_y,
        font_px: style.font_px(page_height),
        background: Bounds {
            x0: text_x - style.padding_x,
            y0: text_y - style.padding_y,
            x1: text_x + text.width as i64 + style.padding_x,
            y1: text_y + text.height as i64 + style.padding_y,
        },
    }
}
