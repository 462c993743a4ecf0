//! Lazy page compositing: yield one [`RenderedPage`] at a time.
//!
//! Each image is decoded only when its page is pulled from the iterator and
//! the decoded buffer is dropped as soon as the page is composited. Callers
//! that encode pages incrementally therefore hold at most one decoded image.
//! [`crate::convert::convert_scanned`] simply collects the stream.
//!
//! The iterator fuses after the first error: a page that cannot be decoded
//! ends the run.

use crate::error::Img2PdfError;
use crate::pipeline::compose::{Compositor, PageSpec, RenderedPage};
use crate::pipeline::enumerate::ImageFile;
use crate::pipeline::inspect::Dimensions;
use crate::progress::ProgressCallback;
use std::iter::Enumerate;
use std::slice::Iter;

/// Iterator over composited pages. Created by [`page_stream`].
pub struct PageStream<'a> {
    compositor: &'a Compositor,
    files: Enumerate<Iter<'a, ImageFile>>,
    target: Option<Dimensions>,
    total: usize,
    progress: Option<ProgressCallback>,
    failed: bool,
}

/// Stream the selected files through `compositor`.
pub fn page_stream<'a>(
    compositor: &'a Compositor,
    selected: &'a [ImageFile],
    target: Option<Dimensions>,
    progress: Option<ProgressCallback>,
) -> PageStream<'a> {
    PageStream {
        compositor,
        files: selected.iter().enumerate(),
        target,
        total: selected.len(),
        progress,
        failed: false,
    }
}

impl Iterator for PageStream<'_> {
    type Item = Result<RenderedPage, Img2PdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (i, file) = self.files.next()?;
        let spec = PageSpec {
            file: file.clone(),
            target: self.target,
            index: i + 1,
            total: self.total,
        };

        if let Some(ref cb) = self.progress {
            cb.on_page_start(spec.index, spec.total, &spec.file.name);
        }
        let result = self.compositor.compose(&spec);
        match result {
            Ok(ref page) => {
                if let Some(ref cb) = self.progress {
                    cb.on_page_complete(page.index, spec.total, page.resized);
                }
            }
            Err(_) => self.failed = true,
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, self.files.size_hint().1)
        }
    }
}
