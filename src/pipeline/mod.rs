//! Pipeline stages for directory-to-PDF conversion.
//!
//! Each submodule implements one transformation step and is tested on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! enumerate ──▶ inspect ──▶ compose ──▶ assemble
//! (dir scan)   (headers)   (resize +    (lopdf)
//!                           caption)
//! ```
//!
//! 1. [`enumerate`] lists image files by extension, sorted by name
//! 2. [`inspect`] reads each header for its size and picks the majority size
//! 3. [`compose`] decodes, resizes and captions one page; the caption text
//!    and geometry come from [`caption`], the typeface from [`fonts`]
//! 4. [`assemble`] writes the pages into one PDF, one page per image

pub mod assemble;
pub mod caption;
pub mod compose;
pub mod enumerate;
pub mod fonts;
pub mod inspect;
