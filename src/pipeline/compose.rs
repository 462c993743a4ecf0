//! Page compositing: decode → RGB → optional resize → caption overlay.
//!
//! Every page leaves this stage as RGB8 regardless of the source format. The
//! caption is drawn on a temporary RGBA8 copy so the translucent background
//! blends with the screenshot underneath, then demoted back to RGB8.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │        ╭──────────────────────╮          │  ← band: 5% of height
//! │        │  lecture1   1/3      │          │
//! │        ╰──────────────────────╯          │
//! │                                          │
//! │               screenshot                 │
//! └──────────────────────────────────────────┘
//! ```

use crate::error::Img2PdfError;
use crate::pipeline::caption::{self, Bounds, CaptionStyle};
use crate::pipeline::enumerate::ImageFile;
use crate::pipeline::fonts::FontResolution;
use crate::pipeline::inspect::Dimensions;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageReader, Pixel, Rgba, RgbImage, RgbaImage};
use std::path::Path;
use tracing::debug;

/// One page to composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub file: ImageFile,
    /// Size every page is normalized to, if resizing was elected.
    pub target: Option<Dimensions>,
    /// 1-based position in the selection.
    pub index: usize,
    pub total: usize,
}

/// A finished page, ready for the assembler.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub index: usize,
    pub source: String,
    pub image: RgbImage,
    /// Whether resampling ran for this page.
    pub resized: bool,
}

impl RenderedPage {
    pub fn dimensions(&self) -> Dimensions {
        self.image.dimensions().into()
    }
}

/// Decode an image file into RGB8.
pub fn decode_rgb(path: &Path) -> Result<RgbImage, Img2PdfError> {
    let decode_err = |source: ImageError| Img2PdfError::ImageDecode {
        path: path.to_path_buf(),
        source,
    };
    let img = ImageReader::open(path)
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)?;
    Ok(img.into_rgb8())
}

/// Resize to exactly `target` with Lanczos3. Already-matching images are
/// returned untouched. The flag reports whether resampling ran.
pub fn resize_to(img: RgbImage, target: Dimensions) -> (RgbImage, bool) {
    if Dimensions::from(img.dimensions()) == target {
        return (img, false);
    }
    let resized = imageops::resize(&img, target.width, target.height, FilterType::Lanczos3);
    (resized, true)
}

/// Turns [`PageSpec`]s into [`RenderedPage`]s.
#[derive(Debug)]
pub struct Compositor {
    style: CaptionStyle,
    /// `None` disables the caption overlay.
    font: Option<FontResolution>,
}

impl Compositor {
    pub fn new(style: CaptionStyle, font: FontResolution) -> Self {
        Self {
            style,
            font: Some(font),
        }
    }

    /// A compositor that only normalizes and resizes.
    pub fn without_caption() -> Self {
        Self {
            style: CaptionStyle::default(),
            font: None,
        }
    }

    pub fn font(&self) -> Option<&FontResolution> {
        self.font.as_ref()
    }

    /// Decode, normalize, resize and caption one page.
    ///
    /// # Errors
    /// [`Img2PdfError::ImageDecode`] if the source cannot be decoded.
    pub fn compose(&self, spec: &PageSpec) -> Result<RenderedPage, Img2PdfError> {
        let rgb = decode_rgb(&spec.file.path)?;
        let (rgb, resized) = match spec.target {
            Some(target) => resize_to(rgb, target),
            None => (rgb, false),
        };
        if resized {
            debug!("Resized {} to {}x{}", spec.file.name, rgb.width(), rgb.height());
        }

        let image = match self.font {
            Some(_) => {
                let text = caption::caption_text(&spec.file.name, spec.index, spec.total);
                self.overlay(rgb, &text)
            }
            None => rgb,
        };

        Ok(RenderedPage {
            index: spec.index,
            source: spec.file.name.clone(),
            image,
            resized,
        })
    }

    /// Draw `text` in its rounded box near the top of `img`.
    pub fn overlay(&self, img: RgbImage, text: &str) -> RgbImage {
        let Some(resolution) = &self.font else {
            return img;
        };
        let font = &resolution.font;
        let (width, height) = img.dimensions();
        let measured = font.measure(text, self.style.font_px(height));
        let layout = caption::layout(width, height, measured, &self.style);

        let mut canvas = DynamicImage::ImageRgb8(img).into_rgba8();
        draw_rounded_rect_mut(
            &mut canvas,
            layout.background,
            self.style.corner_radius,
            self.style.border_width,
            self.style.fill,
            self.style.border,
        );
        font.draw(
            &mut canvas,
            text,
            clamp_i32(layout.text_x),
            clamp_i32(layout.text_y),
            layout.font_px,
            self.style.text,
        );
        DynamicImage::ImageRgba8(canvas).into_rgb8()
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Whether the pixel centre `(cx, cy)` lies in the rounded rectangle with
/// edges `left..right`, `top..bottom` and corner radius `r`.
fn in_rounded_rect(cx: f32, cy: f32, left: f32, top: f32, right: f32, bottom: f32, r: f32) -> bool {
    if right <= left || bottom <= top {
        return false;
    }
    if cx < left || cx > right || cy < top || cy > bottom {
        return false;
    }
    let r = r.min((right - left) / 2.0).min((bottom - top) / 2.0).max(0.0);
    let qx = cx.clamp(left + r, right - r);
    let qy = cy.clamp(top + r, bottom - r);
    let (dx, dy) = (cx - qx, cy - qy);
    dx * dx + dy * dy <= r * r
}

/// Fill an inclusive rounded rectangle and stroke its outline inside the
/// edge, alpha-blending both onto `canvas`. Parts off the canvas are clipped.
pub fn draw_rounded_rect_mut(
    canvas: &mut RgbaImage,
    bounds: Bounds,
    radius: i64,
    border_width: i64,
    fill: Rgba<u8>,
    outline: Rgba<u8>,
) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let (x_start, x_end) = (bounds.x0.max(0), bounds.x1.min(w - 1));
    let (y_start, y_end) = (bounds.y0.max(0), bounds.y1.min(h - 1));
    if x_start > x_end || y_start > y_end {
        return;
    }

    let (left, top) = (bounds.x0 as f32, bounds.y0 as f32);
    let (right, bottom) = ((bounds.x1 + 1) as f32, (bounds.y1 + 1) as f32);
    let bw = border_width.max(0) as f32;
    let r = radius.max(0) as f32;

    for y in y_start..=y_end {
        for x in x_start..=x_end {
            let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
            if !in_rounded_rect(cx, cy, left, top, right, bottom, r) {
                continue;
            }
            let inner = in_rounded_rect(cx, cy, left + bw, top + bw, right - bw, bottom - bw, r - bw);
            let color = if inner { fill } else { outline };
            canvas.get_pixel_mut(x as u32, y as u32).blend(&color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fonts::CaptionFont;
    use image::Rgb;

    fn bitmap_compositor() -> Compositor {
        Compositor::new(
            CaptionStyle::default(),
            FontResolution {
                font: CaptionFont::Bitmap,
                failures: vec![],
            },
        )
    }

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 3]) -> ImageFile {
        RgbImage::from_pixel(w, h, Rgb(color))
            .save(dir.join(name))
            .unwrap();
        ImageFile::new(dir, name)
    }

    #[test]
    fn resize_is_noop_at_target() {
        let img = RgbImage::from_pixel(30, 20, Rgb([9, 8, 7]));
        let (out, resized) = resize_to(img.clone(), Dimensions::new(30, 20));
        assert!(!resized);
        assert_eq!(out, img);
    }

    #[test]
    fn resize_hits_exact_target() {
        let img = RgbImage::from_pixel(40, 20, Rgb([9, 8, 7]));
        let (out, resized) = resize_to(img, Dimensions::new(25, 33));
        assert!(resized);
        assert_eq!(out.dimensions(), (25, 33));
    }

    #[test]
    fn rounded_rect_corners_stay_clear() {
        let mut canvas = RgbaImage::from_pixel(100, 60, Rgba([0, 0, 255, 255]));
        let b = Bounds {
            x0: 10,
            y0: 10,
            x1: 89,
            y1: 49,
        };
        draw_rounded_rect_mut(&mut canvas, b, 12, 3, Rgba([255, 255, 255, 255]), Rgba([255, 0, 0, 255]));
        // Corner pixel is outside the rounded shape.
        assert_eq!(*canvas.get_pixel(10, 10), Rgba([0, 0, 255, 255]));
        // Edge midpoint is outline; centre is fill.
        assert_eq!(*canvas.get_pixel(50, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(50, 30), Rgba([255, 255, 255, 255]));
        // Outside the bounds is untouched.
        assert_eq!(*canvas.get_pixel(5, 30), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn rounded_rect_clips_off_canvas() {
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        let b = Bounds {
            x0: -30,
            y0: -4,
            x1: 50,
            y1: 8,
        };
        draw_rounded_rect_mut(&mut canvas, b, 12, 3, Rgba([255, 255, 255, 255]), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(10, 3), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(10, 15), Rgba([0, 0, 0, 255]));

        let off = Bounds {
            x0: 100,
            y0: 100,
            x1: 120,
            y1: 120,
        };
        draw_rounded_rect_mut(&mut canvas, off, 12, 3, Rgba([255, 255, 255, 255]), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn compose_draws_caption_band_only() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_png(tmp.path(), "lecture1.png", 800, 600, [0, 0, 255]);
        let spec = PageSpec {
            file,
            target: None,
            index: 1,
            total: 3,
        };

        let page = bitmap_compositor().compose(&spec).unwrap();
        assert_eq!(page.dimensions(), Dimensions::new(800, 600));
        assert!(!page.resized);
        assert_eq!(page.source, "lecture1.png");

        // "lecture1   1/3" is 14 bitmap cells → 112×8, box spans y -4..=24.
        let fill = page.image.get_pixel(400, 20);
        assert!(fill[0] > 200 && fill[1] > 200 && fill[2] > 200, "fill {fill:?}");
        let border = page.image.get_pixel(400, 23);
        assert!(border[0] > 240 && (200..=220).contains(&border[1]) && border[2] < 20, "border {border:?}");
        assert_eq!(*page.image.get_pixel(400, 300), Rgb([0, 0, 255]));
        assert_eq!(*page.image.get_pixel(10, 10), Rgb([0, 0, 255]));
        // Some text ink landed inside the band.
        let ink = (344..456)
            .flat_map(|x| (6..14).map(move |y| (x, y)))
            .any(|(x, y)| *page.image.get_pixel(x, y) == Rgb([0, 0, 0]));
        assert!(ink);
    }

    #[test]
    fn compose_resizes_before_caption() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_png(tmp.path(), "b.png", 640, 480, [10, 10, 10]);
        let spec = PageSpec {
            file,
            target: Some(Dimensions::new(800, 600)),
            index: 2,
            total: 2,
        };
        let page = bitmap_compositor().compose(&spec).unwrap();
        assert!(page.resized);
        assert_eq!(page.dimensions(), Dimensions::new(800, 600));
        assert_eq!(page.index, 2);
    }

    #[test]
    fn without_caption_leaves_pixels_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let file = write_png(tmp.path(), "c.png", 50, 40, [1, 2, 3]);
        let spec = PageSpec {
            file,
            target: Some(Dimensions::new(50, 40)),
            index: 1,
            total: 1,
        };
        let page = Compositor::without_caption().compose(&spec).unwrap();
        assert!(!page.resized);
        assert!(page.image.pixels().all(|p| *p == Rgb([1, 2, 3])));
    }

    #[test]
    fn rgba_sources_come_out_rgb() {
        let tmp = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 128]))
            .save(tmp.path().join("alpha.png"))
            .unwrap();
        let spec = PageSpec {
            file: ImageFile::new(tmp.path(), "alpha.png"),
            target: None,
            index: 1,
            total: 1,
        };
        let page = Compositor::without_caption().compose(&spec).unwrap();
        assert_eq!(page.image.dimensions(), (16, 16));
    }

    #[test]
    fn decode_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("broken.jpg"), b"\xff\xd8 nope").unwrap();
        let spec = PageSpec {
            file: ImageFile::new(tmp.path(), "broken.jpg"),
            target: None,
            index: 1,
            total: 1,
        };
        let err = bitmap_compositor().compose(&spec).unwrap_err();
        assert!(matches!(err, Img2PdfError::ImageDecode { .. }));
    }
}
