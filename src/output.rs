//! Result types returned by the conversion entry points.
//!
//! All of them serialize with `serde`, which is what `img2pdf --json` prints.

use crate::pipeline::assemble::OutputDocument;
use crate::pipeline::enumerate::ImageFile;
use crate::pipeline::inspect::{Dimensions, SizeReport};
use serde::Serialize;
use std::path::PathBuf;

/// What was found in the source directory, before any page is rendered.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub directory: PathBuf,
    /// Enumerated images, sorted by name.
    pub files: Vec<ImageFile>,
    pub sizes: SizeReport,
    /// Most frequent size; `None` only if `files` is empty.
    pub suggested_size: Option<Dimensions>,
}

impl ScanReport {
    /// Whether the images disagree on size.
    pub fn has_mixed_sizes(&self) -> bool {
        self.sizes.has_mixed_sizes()
    }
}

/// Counters for one conversion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    /// Images enumerated in the directory.
    pub images_found: usize,
    /// Pages written to the PDF.
    pub pages_written: usize,
    /// Pages that had to be resampled.
    pub pages_resized: usize,
    /// Size pages were normalized to, if resizing was elected.
    pub resize_target: Option<Dimensions>,
    /// Caption font actually used; `None` when captions are disabled.
    pub caption_font: Option<String>,
    /// True when no scalable font loaded and the bitmap font was used.
    pub caption_font_fallback: bool,
    /// Non-fatal problems worth showing the user, e.g. the font fallback.
    pub warnings: Vec<String>,
    pub total_duration_ms: u64,
}

/// The written document plus its stats.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    pub document: OutputDocument,
    pub stats: ConversionStats,
}
