//! Size inspection: read image dimensions from file headers.
//!
//! Only the header is parsed (`ImageReader::into_dimensions`), so measuring
//! a directory of 4K screenshots does not decode a single pixel. The reader
//! is consumed by the call, so no handle outlives its measurement.

use crate::error::Img2PdfError;
use crate::pipeline::enumerate::ImageFile;
use image::{ImageError, ImageReader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Pixel dimensions of an image, `(width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl FromStr for Dimensions {
    type Err = String;

    /// Parse `WxH` (e.g. `1920x1080`). Both sides must be positive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .to_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width: u32 = w.parse().map_err(|_| format!("invalid width '{w}'"))?;
        let height: u32 = h.parse().map_err(|_| format!("invalid height '{h}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("dimensions must be positive, got {width}x{height}"));
        }
        Ok(Self { width, height })
    }
}

/// Read the dimensions of one image without decoding it.
pub fn measure(path: &Path) -> Result<Dimensions, Img2PdfError> {
    let decode_err = |source: ImageError| Img2PdfError::ImageDecode {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(ImageError::IoError(e)))?;
    let dims: Dimensions = reader.into_dimensions().map_err(decode_err)?.into();
    debug!("{} → {}x{}", path.display(), dims.width, dims.height);
    Ok(dims)
}

/// Per-file dimensions, one entry per measured file in enumeration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SizeReport {
    entries: Vec<(ImageFile, Dimensions)>,
}

impl SizeReport {
    /// Measure every file. The first unreadable file aborts the whole pass.
    pub fn measure_all(files: &[ImageFile]) -> Result<Self, Img2PdfError> {
        let entries = files
            .iter()
            .map(|f| measure(&f.path).map(|d| (f.clone(), d)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<(ImageFile, Dimensions)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ImageFile, Dimensions)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensions of the file called `name`, if it was measured.
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<Dimensions> {
        self.entries
            .iter()
            .find(|(f, _)| f.name == name)
            .map(|(_, d)| *d)
    }

    /// Distinct sizes in first-seen order.
    pub fn distinct_sizes(&self) -> Vec<Dimensions> {
        let mut seen = Vec::new();
        for (_, d) in &self.entries {
            if !seen.contains(d) {
                seen.push(*d);
            }
        }
        seen
    }

    pub fn has_mixed_sizes(&self) -> bool {
        self.distinct_sizes().len() > 1
    }

    /// The most frequent size. See [`suggested_size`].
    pub fn suggested_size(&self) -> Option<Dimensions> {
        let sizes: Vec<Dimensions> = self.entries.iter().map(|(_, d)| *d).collect();
        suggested_size(&sizes)
    }
}

/// The most frequent value in `sizes`; ties go to the one seen first.
///
/// Returns `None` only for an empty slice.
pub fn suggested_size(sizes: &[Dimensions]) -> Option<Dimensions> {
    let mut counts: HashMap<Dimensions, usize> = HashMap::new();
    for d in sizes {
        *counts.entry(*d).or_default() += 1;
    }

    let mut best: Option<(Dimensions, usize)> = None;
    // Walk in input order so the first-seen candidate keeps a tie.
    for d in sizes {
        let n = counts[d];
        match best {
            Some((_, best_n)) if best_n >= n => {}
            _ => best = Some((*d, n)),
        }
    }
    best.map(|(d, _)| d)
}
