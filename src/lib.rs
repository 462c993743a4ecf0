//! # edgequake-img2pdf
//!
//! Turn a directory of screenshots into one PDF, one page per image.
//!
//! ## Why this crate?
//!
//! Lecture captures and bug-report screenshots pile up as dozens of loose
//! files with slightly different sizes. This crate collects them in name
//! order, optionally normalizes them to the size most of them share, stamps
//! each page with a readable caption (`"lecture 3   2/14"`) and writes a
//! single lossless PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory
//!  │
//!  ├─ 1. Enumerate  filter by extension, sort by name
//!  ├─ 2. Inspect    read sizes from headers, pick the majority size
//!  ├─ 3. Compose    decode → RGB → optional Lanczos3 resize → caption
//!  └─ 4. Assemble   one PDF page per image, MediaBox = pixel size
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_img2pdf::{convert, ConversionConfig, ResizeMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .input_dir("screenshots/lec2")
//!         .resize(ResizeMode::ToSuggested)
//!         .build()?;
//!     let output = convert(&config)?;
//!     println!("PDF saved as {}", output.document.path.display());
//!     eprintln!("{} pages, {} resized",
//!         output.stats.pages_written,
//!         output.stats.pages_resized);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-img2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{default_output_path, ConversionConfig, ConversionConfigBuilder, ResizeMode, SelectionRange};
pub use convert::{convert, convert_scanned, inspect, scan};
pub use error::{FontLoadError, Img2PdfError};
pub use output::{ConversionOutput, ConversionStats, ScanReport};
pub use pipeline::assemble::OutputDocument;
pub use pipeline::caption::{caption_text, clean_name, CaptionStyle};
pub use pipeline::enumerate::{list_images, ImageFile};
pub use pipeline::inspect::{suggested_size, Dimensions, SizeReport};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::page_stream;
