//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as each page is composited and when the PDF is written.
//!
//! # Example
//!
//! ```rust
//! use edgequake_img2pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, resized: bool) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("Page {}/{} done (resized: {}, {} so far)", page_num, total_pages, resized, done);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are processed sequentially, in order.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first page is composited.
    ///
    /// # Arguments
    /// * `total_pages`: number of selected pages
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is decoded.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number in the selection
    /// * `total_pages`: number of selected pages
    /// * `source`: filename of the image
    fn on_page_start(&self, page_num: usize, total_pages: usize, source: &str) {
        let _ = (page_num, total_pages, source);
    }

    /// Called when a page has been composited.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: number of selected pages
    /// * `resized`: whether the page was resampled
    fn on_page_complete(&self, page_num: usize, total_pages: usize, resized: bool) {
        let _ = (page_num, total_pages, resized);
    }

    /// Called once after the PDF is on disk.
    fn on_conversion_complete(&self, total_pages: usize, output: &Path) {
        let _ = (total_pages, output);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: Arc<AtomicUsize>,
        completes: Arc<AtomicUsize>,
        resized: Arc<AtomicUsize>,
        started_total: Arc<AtomicUsize>,
        finished_total: Arc<AtomicUsize>,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_pages: usize) {
            self.started_total.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_start(&self, _page_num: usize, _total_pages: usize, _source: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, resized: bool) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            if resized {
                self.resized.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn on_conversion_complete(&self, total_pages: usize, _output: &Path) {
            self.finished_total.store(total_pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5);
        cb.on_page_start(1, 5, "a.png");
        cb.on_page_complete(1, 5, false);
        cb.on_conversion_complete(5, Path::new("out.pdf"));
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: Arc::new(AtomicUsize::new(0)),
            completes: Arc::new(AtomicUsize::new(0)),
            resized: Arc::new(AtomicUsize::new(0)),
            started_total: Arc::new(AtomicUsize::new(0)),
            finished_total: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_conversion_start(3);
        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);

        tracker.on_page_start(1, 3, "a.png");
        tracker.on_page_complete(1, 3, false);
        tracker.on_page_start(2, 3, "b.png");
        tracker.on_page_complete(2, 3, true);
        tracker.on_page_start(3, 3, "c.png");
        tracker.on_page_complete(3, 3, false);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.resized.load(Ordering::SeqCst), 1);

        tracker.on_conversion_complete(3, Path::new("lec2.pdf"));
        assert_eq!(tracker.finished_total.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ConversionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(10);
        cb.on_page_start(1, 10, "x.png");
        cb.on_page_complete(1, 10, true);
    }
}
