//! PDF assembly: one page per rendered image, in order.
//!
//! Each page's MediaBox equals the image's pixel size (1 px = 1 pt), and the
//! image is painted edge to edge as a DeviceRGB XObject. Streams are
//! Flate-compressed via [`Document::compress`], which keeps screenshots
//! lossless.

use crate::error::Img2PdfError;
use crate::pipeline::compose::RenderedPage;
use crate::pipeline::inspect::Dimensions;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The written PDF: where it went and the size of each page, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDocument {
    pub path: PathBuf,
    pub pages: Vec<Dimensions>,
}

impl OutputDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Optional document-level metadata written to the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
}

fn add_page(doc: &mut Document, pages_id: ObjectId, page: &RenderedPage) -> Result<ObjectId, Img2PdfError> {
    let (width, height) = page.image.dimensions();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        page.image.as_raw().clone(),
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                [width as i64, 0, 0, height as i64, 0, 0]
                    .into_iter()
                    .map(Object::Integer)
                    .collect(),
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let media_box: Vec<Object> = [0, 0, width as i64, height as i64]
        .into_iter()
        .map(Object::Integer)
        .collect();

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "Contents" => content_id,
    });
    debug!("Added page {} ({}x{})", page.index, width, height);
    Ok(page_id)
}

/// Build an in-memory PDF with exactly one page per entry of `pages`.
///
/// # Errors
/// [`Img2PdfError::NoPages`] for an empty slice.
pub fn build_document(pages: &[RenderedPage], info: &DocumentInfo) -> Result<Document, Img2PdfError> {
    if pages.is_empty() {
        return Err(Img2PdfError::NoPages);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids = pages
        .iter()
        .map(|p| add_page(&mut doc, pages_id, p).map(Object::Reference))
        .collect::<Result<Vec<_>, _>>()?;
    let count = kids.len() as i64;

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info_dict = dictionary! {
        "Producer" => Object::string_literal(concat!("edgequake-img2pdf ", env!("CARGO_PKG_VERSION"))),
    };
    if let Some(ref title) = info.title {
        info_dict.set("Title", Object::string_literal(title.as_str()));
    }
    let info_id = doc.add_object(info_dict);
    doc.trailer.set("Info", info_id);

    doc.compress();
    Ok(doc)
}

/// Write `pages` to `path` as one multi-page PDF.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// failed run never leaves a truncated PDF behind.
pub fn write_pdf(pages: &[RenderedPage], path: &Path, info: &DocumentInfo) -> Result<OutputDocument, Img2PdfError> {
    let mut doc = build_document(pages, info)?;

    let write_err = |source: std::io::Error| Img2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    doc.save_to(&mut tmp).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Wrote {} page(s) to {}", pages.len(), path.display());
    Ok(OutputDocument {
        path: path.to_path_buf(),
        pages: pages.iter().map(RenderedPage::dimensions).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn page(index: usize, w: u32, h: u32) -> RenderedPage {
        RenderedPage {
            index,
            source: format!("p{index}.png"),
            image: RgbImage::from_pixel(w, h, Rgb([index as u8 * 40, 0, 0])),
            resized: false,
        }
    }

    fn media_box(doc: &Document, id: ObjectId) -> Vec<i64> {
        doc.get_dictionary(id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_i64().unwrap())
            .collect()
    }

    #[test]
    fn zero_pages_rejected() {
        let err = build_document(&[], &DocumentInfo::default()).unwrap_err();
        assert!(matches!(err, Img2PdfError::NoPages));
    }

    #[test]
    fn pages_keep_order_and_size() {
        let pages = vec![page(1, 30, 20), page(2, 10, 40), page(3, 30, 20)];
        let doc = build_document(&pages, &DocumentInfo::default()).unwrap();
        let ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(media_box(&doc, ids[0]), vec![0, 0, 30, 20]);
        assert_eq!(media_box(&doc, ids[1]), vec![0, 0, 10, 40]);
        assert_eq!(media_box(&doc, ids[2]), vec![0, 0, 30, 20]);
    }

    #[test]
    fn write_single_page_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/out.pdf");
        let info = DocumentInfo {
            title: Some("lec2".into()),
        };
        let out = write_pdf(&[page(1, 12, 8)], &path, &info).unwrap();
        assert_eq!(out.page_count(), 1);
        assert_eq!(out.pages, vec![Dimensions::new(12, 8)]);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
