//! Configuration types for image-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The source directory is an injected,
//! validated value: the builder trims it, substitutes `.` for blank input,
//! and refuses directories that do not exist.

use crate::error::Img2PdfError;
use crate::pipeline::caption::CaptionStyle;
use crate::pipeline::enumerate::{default_extensions, ImageFile};
use crate::pipeline::fonts::default_font_candidates;
use crate::pipeline::inspect::Dimensions;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Configuration for one directory-to-PDF conversion.
///
/// # Example
/// ```rust,no_run
/// use edgequake_img2pdf::{ConversionConfig, ResizeMode, SelectionRange};
///
/// let config = ConversionConfig::builder()
///     .input_dir("lectures/lec2")
///     .selection(SelectionRange::Range { start: 2, end: 4 })
///     .resize(ResizeMode::ToSuggested)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory holding the images. Default: `.`.
    pub input_dir: PathBuf,

    /// Output PDF path. `None` uses [`ConversionConfig::default_output_path`].
    pub output: Option<PathBuf>,

    /// Extension allowlist, matched case-insensitively.
    pub extensions: Vec<String>,

    /// Which of the sorted images become pages. Default: all.
    pub selection: SelectionRange,

    /// Whether and how pages are normalized to a common size. Default: never.
    pub resize: ResizeMode,

    /// Stamp each page with its caption. Default: true.
    pub caption: bool,

    /// Caption look; scales with each page's height.
    pub caption_style: CaptionStyle,

    /// Font candidates for captions, tried in order.
    pub font_candidates: Vec<String>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output: None,
            extensions: default_extensions(),
            selection: SelectionRange::default(),
            resize: ResizeMode::default(),
            caption: true,
            caption_style: CaptionStyle::default(),
            font_candidates: default_font_candidates(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("input_dir", &self.input_dir)
            .field("output", &self.output)
            .field("extensions", &self.extensions)
            .field("selection", &self.selection)
            .field("resize", &self.resize)
            .field("caption", &self.caption)
            .field("font_candidates", &self.font_candidates)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The output path: the configured one, or `<input-directory>.pdf` beside
    /// the directory.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input_dir))
    }

    /// Directory name used as the PDF title.
    pub fn document_title(&self) -> Option<String> {
        let dir = std::fs::canonicalize(&self.input_dir).unwrap_or_else(|_| self.input_dir.clone());
        dir.file_name().and_then(|n| n.to_str()).map(str::to_owned)
    }
}

/// `<dir>.pdf` next to `dir`. `.` and other nameless paths are resolved
/// first so the result never ends up as `..pdf`.
pub fn default_output_path(dir: &Path) -> PathBuf {
    let named = if dir.file_name().is_some() {
        dir.to_path_buf()
    } else {
        std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
    };
    match named.file_name().and_then(|n| n.to_str()) {
        Some(name) => named.with_file_name(format!("{name}.pdf")),
        None => PathBuf::from("images.pdf"),
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    /// Source directory; trimmed, blank means `.`.
    pub fn input_dir(mut self, dir: impl AsRef<str>) -> Self {
        let trimmed = dir.as_ref().trim();
        self.config.input_dir = PathBuf::from(if trimmed.is_empty() { "." } else { trimmed });
        self
    }

    /// Output path; blank means "use the default".
    pub fn output(mut self, path: impl AsRef<str>) -> Self {
        let trimmed = path.as_ref().trim();
        self.config.output = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
        self
    }

    /// Output path taken verbatim, without trimming or UTF-8 conversion.
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    pub fn extensions(mut self, exts: Vec<String>) -> Self {
        self.config.extensions = exts;
        self
    }

    pub fn selection(mut self, selection: SelectionRange) -> Self {
        self.config.selection = selection;
        self
    }

    pub fn resize(mut self, mode: ResizeMode) -> Self {
        self.config.resize = mode;
        self
    }

    pub fn caption(mut self, v: bool) -> Self {
        self.config.caption = v;
        self
    }

    pub fn caption_style(mut self, style: CaptionStyle) -> Self {
        self.config.caption_style = style;
        self
    }

    /// Replace the font candidate list.
    pub fn font_candidates(mut self, fonts: Vec<String>) -> Self {
        self.config.font_candidates = fonts;
        self
    }

    /// Try `fonts` before the current candidates.
    pub fn prepend_fonts(mut self, fonts: Vec<String>) -> Self {
        let mut merged = fonts;
        merged.append(&mut self.config.font_candidates);
        self.config.font_candidates = merged;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Img2PdfError> {
        let c = &self.config;
        if !c.input_dir.exists() {
            return Err(Img2PdfError::DirectoryNotFound {
                path: c.input_dir.clone(),
            });
        }
        if !c.input_dir.is_dir() {
            return Err(Img2PdfError::InvalidConfig(format!(
                "'{}' is not a directory",
                c.input_dir.display()
            )));
        }
        if c.extensions.is_empty() {
            return Err(Img2PdfError::InvalidConfig(
                "extension allowlist must not be empty".into(),
            ));
        }
        if let ResizeMode::To(d) = c.resize {
            if d.width == 0 || d.height == 0 {
                return Err(Img2PdfError::InvalidConfig(format!(
                    "resize target must be positive, got {}x{}",
                    d.width, d.height
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Whether pages are normalized to one size before captioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeMode {
    /// Keep every image at its native size. (default)
    #[default]
    Never,
    /// Resize to the most frequent size among the scanned images.
    ToSuggested,
    /// Resize to an explicit size.
    To(Dimensions),
}

impl ResizeMode {
    /// The concrete target, given the scan's suggested size.
    pub fn target(&self, suggested: Option<Dimensions>) -> Option<Dimensions> {
        match self {
            ResizeMode::Never => None,
            ResizeMode::ToSuggested => suggested,
            ResizeMode::To(d) => Some(*d),
        }
    }
}

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$").expect("static regex is valid"));

/// Which of the sorted, enumerated images to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionRange {
    /// Every image. (default)
    #[default]
    All,
    /// A contiguous 1-based inclusive slice.
    Range { start: usize, end: usize },
}

impl SelectionRange {
    /// Parse `""`, `"all"` or `"start-end"` against a list of `total` files.
    ///
    /// # Errors
    /// [`Img2PdfError::InvalidSelection`] for anything else, including
    /// reversed or out-of-range bounds.
    pub fn parse(input: &str, total: usize) -> Result<Self, Img2PdfError> {
        let s = input.trim().to_lowercase();
        if s.is_empty() || s == "all" {
            return Ok(SelectionRange::All);
        }

        let invalid = |reason: String| Img2PdfError::InvalidSelection {
            input: input.to_string(),
            reason,
        };
        let caps = RANGE_RE
            .captures(&s)
            .ok_or_else(|| invalid("expected 'start-end' or 'all'".into()))?;
        let start: usize = caps[1]
            .parse()
            .map_err(|_| invalid("start is not a number".into()))?;
        let end: usize = caps[2]
            .parse()
            .map_err(|_| invalid("end is not a number".into()))?;

        if start < 1 {
            return Err(invalid(format!("images are 1-indexed, minimum is 1 (got {start})")));
        }
        if start > end {
            return Err(invalid("start must be <= end".into()));
        }
        if end > total {
            return Err(invalid(format!("only {total} images available")));
        }
        Ok(SelectionRange::Range { start, end })
    }

    /// Like [`SelectionRange::parse`], but invalid input widens to `All`
    /// with a warning.
    pub fn parse_or_all(input: &str, total: usize) -> Self {
        Self::parse(input, total).unwrap_or_else(|e| {
            warn!("{}; using all images", e);
            SelectionRange::All
        })
    }

    /// Apply the selection to the sorted file list.
    ///
    /// A range that no longer fits `files` selects everything.
    pub fn apply<'a>(&self, files: &'a [ImageFile]) -> &'a [ImageFile] {
        match *self {
            SelectionRange::All => files,
            SelectionRange::Range { start, end } if start >= 1 && start <= end && end <= files.len() => {
                &files[start - 1..end]
            }
            SelectionRange::Range { start, end } => {
                warn!(
                    "Selection {}-{} does not fit {} images; using all images",
                    start,
                    end,
                    files.len()
                );
                files
            }
        }
    }
}

impl fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionRange::All => f.write_str("all"),
            SelectionRange::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}
