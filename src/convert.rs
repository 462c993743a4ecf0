//! Library entry points.
//!
//! A run is split in two so interactive callers can show the scan before
//! deciding on resize, selection and output:
//!
//! 1. [`scan`] / [`inspect`]: enumerate the directory and measure every image.
//! 2. [`convert_scanned`]: select, composite and write the PDF.
//!
//! [`convert`] does both with the choices already in the config.

use crate::config::ConversionConfig;
use crate::error::Img2PdfError;
use crate::output::{ConversionOutput, ConversionStats, ScanReport};
use crate::pipeline::assemble::{self, DocumentInfo};
use crate::pipeline::compose::{Compositor, RenderedPage};
use crate::pipeline::enumerate;
use crate::pipeline::fonts;
use crate::pipeline::inspect::SizeReport;
use crate::stream::page_stream;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Enumerate `dir` and measure every image in it.
///
/// # Errors
/// - [`Img2PdfError::DirectoryNotFound`] / [`Img2PdfError::DirectoryUnreadable`]
/// - [`Img2PdfError::NoImagesFound`] when nothing matches `extensions`
/// - [`Img2PdfError::ImageDecode`] when any header cannot be read
pub fn scan(dir: &Path, extensions: &[String]) -> Result<ScanReport, Img2PdfError> {
    let files = enumerate::try_list_images(dir, extensions)?;
    if files.is_empty() {
        return Err(Img2PdfError::NoImagesFound {
            path: dir.to_path_buf(),
        });
    }
    info!("Found {} images in {}", files.len(), dir.display());

    let sizes = SizeReport::measure_all(&files)?;
    let suggested_size = sizes.suggested_size();
    if sizes.has_mixed_sizes() {
        debug!(
            "{} distinct sizes, suggested {:?}",
            sizes.distinct_sizes().len(),
            suggested_size
        );
    }

    Ok(ScanReport {
        directory: dir.to_path_buf(),
        files,
        sizes,
        suggested_size,
    })
}

/// [`scan`] the configured directory.
pub fn inspect(config: &ConversionConfig) -> Result<ScanReport, Img2PdfError> {
    scan(&config.input_dir, &config.extensions)
}

/// Write the PDF for an existing scan.
///
/// The selection, resize mode, caption switch and output path are taken from
/// `config`. Pages are composited one at a time and written in selection
/// order.
pub fn convert_scanned(scan: &ScanReport, config: &ConversionConfig) -> Result<ConversionOutput, Img2PdfError> {
    let start = Instant::now();

    let selected = config.selection.apply(&scan.files);
    if selected.is_empty() {
        return Err(Img2PdfError::NoImagesFound {
            path: scan.directory.clone(),
        });
    }
    let target = config.resize.target(scan.suggested_size);
    debug!(
        "Selected {} of {} images ({}), resize target {:?}",
        selected.len(),
        scan.files.len(),
        config.selection,
        target
    );

    let compositor = if config.caption {
        Compositor::new(config.caption_style.clone(), fonts::resolve_font(&config.font_candidates))
    } else {
        Compositor::without_caption()
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(selected.len());
    }

    let pages: Vec<RenderedPage> =
        page_stream(&compositor, selected, target, config.progress_callback.clone())
            .collect::<Result<_, _>>()?;

    let output_path = config.output_path();
    let info = DocumentInfo {
        title: config.document_title(),
    };
    let document = assemble::write_pdf(&pages, &output_path, &info)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(document.page_count(), &document.path);
    }

    let stats = ConversionStats {
        images_found: scan.files.len(),
        pages_written: document.page_count(),
        pages_resized: pages.iter().filter(|p| p.resized).count(),
        resize_target: target,
        caption_font: compositor.font().map(|r| r.font.name().to_string()),
        caption_font_fallback: compositor.font().is_some_and(|r| r.used_fallback()),
        warnings: compositor.font().and_then(|r| r.warning()).into_iter().collect(),
        total_duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Conversion complete: {} pages, {} resized, {}ms",
        stats.pages_written, stats.pages_resized, stats.total_duration_ms
    );

    Ok(ConversionOutput { document, stats })
}

/// Scan the configured directory and write its PDF.
///
/// # Example
/// ```rust,no_run
/// use edgequake_img2pdf::{convert, ConversionConfig};
///
/// let config = ConversionConfig::builder().input_dir("shots").build()?;
/// let out = convert(&config)?;
/// println!("PDF saved as {}", out.document.path.display());
/// # Ok::<(), edgequake_img2pdf::Img2PdfError>(())
/// ```
pub fn convert(config: &ConversionConfig) -> Result<ConversionOutput, Img2PdfError> {
    let report = inspect(config)?;
    convert_scanned(&report, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResizeMode, SelectionRange};
    use crate::pipeline::inspect::Dimensions;
    use image::{Rgb, RgbImage};

    fn fixture(sizes: &[(&str, u32, u32)]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for (name, w, h) in sizes {
            RgbImage::from_pixel(*w, *h, Rgb([200, 200, 200]))
                .save(tmp.path().join(name))
                .unwrap();
        }
        tmp
    }

    #[test]
    fn scan_reports_sizes_and_suggestion() {
        let tmp = fixture(&[("b.png", 40, 30), ("a.png", 40, 30), ("c.png", 20, 10)]);
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        let report = scan(tmp.path(), &enumerate::default_extensions()).unwrap();
        let names: Vec<&str> = report.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        assert!(report.has_mixed_sizes());
        assert_eq!(report.suggested_size, Some(Dimensions::new(40, 30)));
        assert_eq!(report.sizes.get("c.png"), Some(Dimensions::new(20, 10)));
    }

    #[test]
    fn scan_empty_directory_is_nothing_to_do() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scan(tmp.path(), &enumerate::default_extensions()).unwrap_err();
        assert!(matches!(err, Img2PdfError::NoImagesFound { .. }));
        assert!(err.is_nothing_to_do());
    }

    #[test]
    fn scan_aborts_on_unreadable_image() {
        let tmp = fixture(&[("a.png", 4, 4)]);
        std::fs::write(tmp.path().join("b.png"), b"not a png").unwrap();
        let err = scan(tmp.path(), &enumerate::default_extensions()).unwrap_err();
        assert!(matches!(err, Img2PdfError::ImageDecode { .. }));
    }

    #[test]
    fn convert_selected_range_with_resize() {
        let tmp = fixture(&[
            ("1.png", 40, 30),
            ("2.png", 20, 10),
            ("3.png", 40, 30),
            ("4.png", 40, 30),
        ]);
        let out_path = tmp.path().join("out.pdf");
        let config = ConversionConfig::builder()
            .input_dir(tmp.path().to_str().unwrap())
            .output(out_path.to_str().unwrap())
            .selection(SelectionRange::Range { start: 2, end: 3 })
            .resize(ResizeMode::ToSuggested)
            .caption(false)
            .build()
            .unwrap();

        let out = convert(&config).unwrap();
        assert_eq!(out.document.path, out_path);
        assert_eq!(out.document.pages, vec![Dimensions::new(40, 30); 2]);
        assert_eq!(out.stats.images_found, 4);
        assert_eq!(out.stats.pages_written, 2);
        assert_eq!(out.stats.pages_resized, 1);
        assert_eq!(out.stats.caption_font, None);
        assert!(out_path.exists());
    }

    #[test]
    fn convert_with_caption_records_font() {
        let tmp = fixture(&[("shot.png", 120, 200)]);
        let config = ConversionConfig::builder()
            .input_dir(tmp.path().to_str().unwrap())
            .output(tmp.path().join("o.pdf").to_str().unwrap())
            .font_candidates(vec!["definitely-missing-font.ttf".into()])
            .build()
            .unwrap();

        let out = convert(&config).unwrap();
        assert_eq!(out.stats.pages_written, 1);
        assert!(out.stats.caption_font_fallback);
        assert!(out.stats.caption_font.is_some());
        assert_eq!(out.stats.warnings.len(), 1);
        assert!(out.stats.warnings[0].contains("definitely-missing-font.ttf"));
        assert_eq!(out.document.pages, vec![Dimensions::new(120, 200)]);
    }
}
