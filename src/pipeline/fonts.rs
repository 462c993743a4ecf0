//! Caption font resolution, text measurement and text drawing.
//!
//! Candidates are tried in order and the first TrueType/OpenType font that
//! loads wins. Bare names (`arial.ttf`) are looked up in the working
//! directory and then in the platform font directories. If every candidate
//! fails, captions fall back to a fixed 8×8 bitmap font and the failures are
//! reported once as a warning.

use crate::error::FontLoadError;
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Candidates tried when the configuration does not override them.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "arial.ttf",
    "DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// Pixel size of one bitmap-font cell.
pub const BITMAP_GLYPH_PX: u32 = 8;

const MAX_SEARCH_DEPTH: usize = 8;

/// Outcome of [`first_success`]: the winner (if any) and every failure that
/// preceded it.
#[derive(Debug)]
pub struct FirstSuccess<C, T, E> {
    pub winner: Option<(C, T)>,
    pub failures: Vec<(C, E)>,
}

/// Try `attempt` on each candidate in order and stop at the first `Ok`.
pub fn first_success<C, T, E>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: impl FnMut(&C) -> Result<T, E>,
) -> FirstSuccess<C, T, E> {
    let mut failures = Vec::new();
    for candidate in candidates {
        match attempt(&candidate) {
            Ok(value) => {
                return FirstSuccess {
                    winner: Some((candidate, value)),
                    failures,
                }
            }
            Err(e) => failures.push((candidate, e)),
        }
    }
    FirstSuccess {
        winner: None,
        failures,
    }
}

/// The default candidate list as owned strings.
pub fn default_font_candidates() -> Vec<String> {
    DEFAULT_FONT_CANDIDATES.iter().map(|s| s.to_string()).collect()
}

/// Directories searched for bare font names, in priority order.
pub fn font_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let home = std::env::var_os("HOME").map(PathBuf::from);

    if cfg!(windows) {
        if let Some(windir) = std::env::var_os("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        }
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/Library/Fonts"));
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        if let Some(ref h) = home {
            dirs.push(h.join("Library/Fonts"));
        }
    } else {
        let data_home = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| home.as_ref().map(|h| h.join(".local/share")));
        if let Some(dh) = data_home {
            dirs.push(dh.join("fonts"));
        }
        let data_dirs = std::env::var("XDG_DATA_DIRS").unwrap_or_else(|_| "/usr/share".to_string());
        for d in data_dirs.split(':').filter(|d| !d.is_empty()) {
            dirs.push(PathBuf::from(d).join("fonts"));
        }
    }
    dirs
}

/// Find the file a candidate name refers to.
///
/// Paths with a directory part are used as-is. Bare names are tried in the
/// working directory first, then searched recursively under `search_dirs`.
pub fn locate_font(candidate: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let path = Path::new(candidate);
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if path.components().count() > 1 {
        return None;
    }
    search_dirs
        .iter()
        .find_map(|dir| find_file(dir, candidate, MAX_SEARCH_DEPTH))
}

fn find_file(dir: &Path, name: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if entry.file_name().to_str() == Some(name) {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs.sort();
    subdirs
        .iter()
        .find_map(|sub| find_file(sub, name, depth - 1))
}

/// Load one candidate as a scalable font.
pub fn load_scalable(candidate: &str, search_dirs: &[PathBuf]) -> Result<FontVec, FontLoadError> {
    let path = locate_font(candidate, search_dirs).ok_or_else(|| FontLoadError::NotFound {
        candidate: candidate.to_string(),
    })?;
    let bytes = std::fs::read(&path).map_err(|e| FontLoadError::Unreadable {
        candidate: candidate.to_string(),
        detail: e.to_string(),
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| FontLoadError::InvalidFont {
        candidate: candidate.to_string(),
    })
}

/// Measured extent of a caption string, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBox {
    pub width: u32,
    pub height: u32,
}

/// The font used to draw captions.
pub enum CaptionFont {
    /// A TrueType/OpenType font, rendered at the requested pixel size.
    Scalable { name: String, font: FontVec },
    /// Built-in 8×8 bitmap glyphs; ignores the requested size.
    Bitmap,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionFont::Scalable { name, .. } => f.debug_tuple("Scalable").field(name).finish(),
            CaptionFont::Bitmap => f.write_str("Bitmap"),
        }
    }
}

impl CaptionFont {
    /// Human-readable name for logs and stats.
    pub fn name(&self) -> &str {
        match self {
            CaptionFont::Scalable { name, .. } => name,
            CaptionFont::Bitmap => "built-in bitmap",
        }
    }

    pub fn is_scalable(&self) -> bool {
        matches!(self, CaptionFont::Scalable { .. })
    }

    /// Measure `text` at `px` pixels.
    ///
    /// Glyph ink bounds are used when they can be computed; otherwise the
    /// coarse advance-based size. Both feed the same layout.
    pub fn measure(&self, text: &str, px: u32) -> TextBox {
        match self {
            CaptionFont::Scalable { font, .. } => {
                let scale = PxScale::from(px.max(1) as f32);
                precise_bounds(font, scale, text).unwrap_or_else(|| {
                    let (width, height) = imageproc::drawing::text_size(scale, font, text);
                    TextBox { width, height }
                })
            }
            CaptionFont::Bitmap => TextBox {
                width: BITMAP_GLYPH_PX * text.chars().count() as u32,
                height: BITMAP_GLYPH_PX,
            },
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, x: i32, y: i32, px: u32, color: Rgba<u8>) {
        match self {
            CaptionFont::Scalable { font, .. } => {
                let scale = PxScale::from(px.max(1) as f32);
                imageproc::drawing::draw_text_mut(canvas, color, x, y, scale, font, text);
            }
            CaptionFont::Bitmap => draw_bitmap_text(canvas, text, x, y, color),
        }
    }
}

/// Union of the outlined glyph bounds, or `None` if nothing has ink.
fn precise_bounds(font: &FontVec, scale: PxScale, text: &str) -> Option<TextBox> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut last: Option<GlyphId> = None;
    let mut bounds: Option<(f32, f32, f32, f32)> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = last {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        last = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bb = outlined.px_bounds();
            bounds = Some(match bounds {
                None => (bb.min.x, bb.min.y, bb.max.x, bb.max.y),
                Some((x0, y0, x1, y1)) => (
                    x0.min(bb.min.x),
                    y0.min(bb.min.y),
                    x1.max(bb.max.x),
                    y1.max(bb.max.y),
                ),
            });
        }
    }

    bounds.map(|(x0, y0, x1, y1)| TextBox {
        width: (x1 - x0).round().max(0.0) as u32,
        height: (y1 - y0).round().max(0.0) as u32,
    })
}

fn bitmap_glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_bitmap_text(canvas: &mut RgbaImage, text: &str, x: i32, y: i32, color: Rgba<u8>) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    for (i, c) in text.chars().enumerate() {
        let origin_x = x as i64 + i as i64 * BITMAP_GLYPH_PX as i64;
        for (row, bits) in bitmap_glyph(c).iter().enumerate() {
            for col in 0..8 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = origin_x + col as i64;
                let py = y as i64 + row as i64;
                if (0..w).contains(&px) && (0..h).contains(&py) {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

/// The chosen caption font plus the candidates that failed before it.
#[derive(Debug)]
pub struct FontResolution {
    pub font: CaptionFont,
    pub failures: Vec<FontLoadError>,
}

impl FontResolution {
    /// Whether no scalable candidate loaded.
    pub fn used_fallback(&self) -> bool {
        !self.font.is_scalable()
    }

    /// The warning to show when captions fell back to the bitmap font.
    pub fn warning(&self) -> Option<String> {
        if !self.used_fallback() {
            return None;
        }
        let tried: Vec<&str> = self.failures.iter().map(|f| f.candidate()).collect();
        Some(format!(
            "No scalable TTF font found (tried: {}). Using default font, which may not scale properly.",
            tried.join(", ")
        ))
    }
}

/// Resolve the caption font from an ordered candidate list.
pub fn resolve_font(candidates: &[String]) -> FontResolution {
    resolve_font_in(candidates, &font_search_dirs())
}

/// [`resolve_font`] with explicit search directories.
pub fn resolve_font_in(candidates: &[String], search_dirs: &[PathBuf]) -> FontResolution {
    let attempt = first_success(candidates.iter().cloned(), |c| load_scalable(c, search_dirs));
    let failures: Vec<FontLoadError> = attempt.failures.into_iter().map(|(_, e)| e).collect();
    for f in &failures {
        debug!("Font candidate failed: {}", f);
    }

    let resolution = match attempt.winner {
        Some((name, font)) => {
            info!("Caption font: {}", name);
            FontResolution {
                font: CaptionFont::Scalable { name, font },
                failures,
            }
        }
        None => FontResolution {
            font: CaptionFont::Bitmap,
            failures,
        },
    };
    if let Some(msg) = resolution.warning() {
        warn!("{}", msg);
    }
    resolution
}
