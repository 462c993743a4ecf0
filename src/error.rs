//! Error types for the edgequake-img2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Img2PdfError`]: **Fatal** (or run-ending): the conversion cannot
//!   proceed. Returned as `Err(Img2PdfError)` from the pipeline functions and
//!   the top-level `convert*` entry points.
//!
//! * [`FontLoadError`]: **Non-fatal**: one caption font candidate could not be
//!   loaded. Failures are collected into
//!   [`crate::pipeline::fonts::FontResolution`] and reported once as a
//!   warning; captions still render with the built-in bitmap font.
//!
//! A few fatal kinds merely mean "nothing to do" (missing directory, no
//! images). [`Img2PdfError::is_nothing_to_do`] lets the CLI print those and
//! exit cleanly instead of crashing.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-img2pdf library.
#[derive(Debug, Error)]
pub enum Img2PdfError {
    // ── Directory errors ──────────────────────────────────────────────────
    /// The source directory does not exist.
    #[error("Error: Directory '{}' not found.", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The source directory exists but could not be listed.
    #[error("Error reading directory '{}': {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Listing succeeded but no file matched the extension allowlist.
    #[error("No images found in '{}'.", path.display())]
    NoImagesFound { path: PathBuf },

    // ── Image errors ──────────────────────────────────────────────────────
    /// An image could not be opened, measured or decoded.
    #[error("Failed to read image '{}': {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── Selection errors ──────────────────────────────────────────────────
    /// The `start-end` selection string could not be applied.
    #[error("Invalid image sequence '{input}': {reason}")]
    InvalidSelection { input: String, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The assembler was handed zero pages.
    #[error("Cannot assemble a PDF with zero pages")]
    NoPages,

    /// lopdf failed to encode the document.
    #[error("Failed to build PDF: {detail}")]
    PdfBuild { detail: String },

    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Img2PdfError {
    /// Whether this error just means there is nothing to convert.
    ///
    /// The interactive tool reports these and exits normally.
    pub fn is_nothing_to_do(&self) -> bool {
        matches!(
            self,
            Img2PdfError::DirectoryNotFound { .. }
                | Img2PdfError::DirectoryUnreadable { .. }
                | Img2PdfError::NoImagesFound { .. }
        )
    }
}

impl From<lopdf::Error> for Img2PdfError {
    fn from(e: lopdf::Error) -> Self {
        Img2PdfError::PdfBuild {
            detail: e.to_string(),
        }
    }
}

/// A non-fatal failure to load one caption font candidate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FontLoadError {
    /// No file matching the candidate was found on disk.
    #[error("{candidate}: not found")]
    NotFound { candidate: String },

    /// The file was found but could not be read.
    #[error("{candidate}: {detail}")]
    Unreadable { candidate: String, detail: String },

    /// The file was read but is not a usable TrueType/OpenType font.
    #[error("{candidate}: not a valid font")]
    InvalidFont { candidate: String },
}

impl FontLoadError {
    /// The candidate name as it was configured.
    pub fn candidate(&self) -> &str {
        match self {
            FontLoadError::NotFound { candidate }
            | FontLoadError::Unreadable { candidate, .. }
            | FontLoadError::InvalidFont { candidate } => candidate,
        }
    }
}
