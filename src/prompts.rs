//! The interactive console dialogue.
//!
//! Every line the tool prints and every question it asks lives here, so the
//! wording has a single home and the whole dialogue can be driven from tests
//! with an in-memory reader and writer. [`Console`] is generic over
//! [`BufRead`] and [`Write`]; the binary wires it to stdin/stdout.
//!
//! End of input counts as an empty answer, which always picks the default.

use crate::config::{ResizeMode, SelectionRange};
use crate::output::ScanReport;
use crate::pipeline::enumerate::ImageFile;
use crate::pipeline::inspect::SizeReport;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub const RESIZE_PROMPT: &str = "Resize all images to this size? (y/n): ";

pub const SELECTION_PROMPT: &str = "Enter image sequence (e.g. 1-5) or \"all\" (default: all): ";

pub const INVALID_SELECTION: &str = "Invalid input. Using all images.";

/// Line-oriented dialogue over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// `Found N images:` followed by one `i: name` line per file.
    pub fn show_files(&mut self, files: &[ImageFile]) -> io::Result<()> {
        writeln!(self.output, "Found {} images:", files.len())?;
        for (i, f) in files.iter().enumerate() {
            writeln!(self.output, "{}: {}", i + 1, f.name)?;
        }
        Ok(())
    }

    /// `Image sizes:` followed by one `name: (w, h)` line per file.
    pub fn show_sizes(&mut self, sizes: &SizeReport) -> io::Result<()> {
        writeln!(self.output, "\nImage sizes:")?;
        for (f, d) in sizes.iter() {
            writeln!(self.output, "{}: {}", f.name, d)?;
        }
        Ok(())
    }

    pub fn show_scan(&mut self, scan: &ScanReport) -> io::Result<()> {
        self.show_files(&scan.files)?;
        self.show_sizes(&scan.sizes)
    }

    /// Offer the suggested size when the images disagree.
    ///
    /// Uniform sets are not asked and get [`ResizeMode::Never`]. Only `y`
    /// (any case) accepts.
    pub fn ask_resize(&mut self, scan: &ScanReport) -> io::Result<ResizeMode> {
        let Some(suggested) = scan.suggested_size.filter(|_| scan.has_mixed_sizes()) else {
            return Ok(ResizeMode::Never);
        };
        writeln!(self.output, "\nImages have different sizes.")?;
        writeln!(self.output, "Suggested standard size: {}", suggested)?;
        let answer = self.ask(RESIZE_PROMPT)?;
        Ok(if answer.eq_ignore_ascii_case("y") {
            ResizeMode::ToSuggested
        } else {
            ResizeMode::Never
        })
    }

    /// Ask which images to include. Unparseable answers select everything.
    pub fn ask_selection(&mut self, total: usize) -> io::Result<SelectionRange> {
        let answer = self.ask(SELECTION_PROMPT)?;
        self.select(&answer, total)
    }

    /// Parse a selection given up front (e.g. `--pages`). Like
    /// [`Console::ask_selection`], bad input prints the notice and selects
    /// everything.
    pub fn select(&mut self, input: &str, total: usize) -> io::Result<SelectionRange> {
        match SelectionRange::parse(input, total) {
            Ok(selection) => Ok(selection),
            Err(e) => {
                tracing::debug!("{}", e);
                writeln!(self.output, "{}", INVALID_SELECTION)?;
                Ok(SelectionRange::All)
            }
        }
    }

    /// Ask for the output filename; empty keeps `default`.
    pub fn ask_output(&mut self, default: &Path) -> io::Result<PathBuf> {
        let prompt = format!(
            "Enter output PDF filename (default: {}): ",
            default.display()
        );
        let answer = self.ask(&prompt)?;
        Ok(if answer.is_empty() {
            default.to_path_buf()
        } else {
            PathBuf::from(answer)
        })
    }

    pub fn saved(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.output, "PDF saved as {}", path.display())
    }

    /// Print a free-form line, e.g. a warning or an early-exit message.
    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::inspect::Dimensions;
    use std::io::Cursor;

    fn scan(sizes: &[(&str, u32, u32)]) -> ScanReport {
        let dir = Path::new("/shots");
        let entries: Vec<(ImageFile, Dimensions)> = sizes
            .iter()
            .map(|(n, w, h)| (ImageFile::new(dir, *n), Dimensions::new(*w, *h)))
            .collect();
        let sizes = SizeReport::from_entries(entries);
        ScanReport {
            directory: dir.to_path_buf(),
            files: sizes.iter().map(|(f, _)| f.clone()).collect(),
            suggested_size: sizes.suggested_size(),
            sizes,
        }
    }

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn printed(c: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(c.into_inner().1).unwrap()
    }

    #[test]
    fn scan_listing_format() {
        let report = scan(&[("a.png", 800, 600), ("b.png", 640, 480)]);
        let mut c = console("");
        c.show_scan(&report).unwrap();
        assert_eq!(
            printed(c),
            "Found 2 images:\n1: a.png\n2: b.png\n\nImage sizes:\na.png: (800, 600)\nb.png: (640, 480)\n"
        );
    }

    #[test]
    fn mixed_sizes_ask_and_accept_y() {
        let report = scan(&[("a.png", 800, 600), ("b.png", 800, 600), ("c.png", 640, 480)]);
        let mut c = console("Y\n");
        assert_eq!(c.ask_resize(&report).unwrap(), ResizeMode::ToSuggested);
        let out = printed(c);
        assert!(out.contains("Images have different sizes.\n"));
        assert!(out.contains("Suggested standard size: (800, 600)\n"));
        assert!(out.ends_with(RESIZE_PROMPT));
    }

    #[test]
    fn anything_but_y_declines_resize() {
        let report = scan(&[("a.png", 800, 600), ("c.png", 640, 480)]);
        for answer in ["n\n", "yes\n", "\n", ""] {
            let mut c = console(answer);
            assert_eq!(c.ask_resize(&report).unwrap(), ResizeMode::Never, "{answer:?}");
        }
    }

    #[test]
    fn uniform_sizes_are_not_asked() {
        let report = scan(&[("a.png", 800, 600), ("b.png", 800, 600)]);
        let mut c = console("y\n");
        assert_eq!(c.ask_resize(&report).unwrap(), ResizeMode::Never);
        assert!(printed(c).is_empty());
    }

    #[test]
    fn selection_answers() {
        let mut c = console("2-4\n");
        assert_eq!(
            c.ask_selection(6).unwrap(),
            SelectionRange::Range { start: 2, end: 4 }
        );

        let mut c = console("\n");
        assert_eq!(c.ask_selection(6).unwrap(), SelectionRange::All);

        let mut c = console("9-2\n");
        assert_eq!(c.ask_selection(6).unwrap(), SelectionRange::All);
        assert!(printed(c).ends_with("Invalid input. Using all images.\n"));
    }

    #[test]
    fn preset_selection_reports_fallback() {
        let mut c = console("");
        assert_eq!(
            c.select("1-3", 6).unwrap(),
            SelectionRange::Range { start: 1, end: 3 }
        );
        assert!(printed(c).is_empty());

        let mut c = console("");
        assert_eq!(c.select("1-7", 6).unwrap(), SelectionRange::All);
        assert_eq!(printed(c), "Invalid input. Using all images.\n");
    }

    #[test]
    fn output_defaults_when_blank() {
        let default = Path::new("/shots.pdf");
        let mut c = console("  \n");
        assert_eq!(c.ask_output(default).unwrap(), PathBuf::from("/shots.pdf"));
        assert_eq!(
            printed(c),
            "Enter output PDF filename (default: /shots.pdf): "
        );

        let mut c = console("notes.pdf\n");
        assert_eq!(c.ask_output(default).unwrap(), PathBuf::from("notes.pdf"));
    }

    #[test]
    fn saved_line() {
        let mut c = console("");
        c.saved(Path::new("lec2.pdf")).unwrap();
        assert_eq!(printed(c), "PDF saved as lec2.pdf\n");
    }
}
