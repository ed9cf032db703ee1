//! Document block model
//!
//! The report is an ordered list of block elements handed to a renderer,
//! mirroring the "story" model of paginated layout engines.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Document title
    Title(String),
    /// Section heading
    Heading(String),
    /// Body text; embedded newlines are preserved as separate lines
    Paragraph(String),
    /// Externally produced image, referenced by path
    Image { alt: String, path: PathBuf },
    /// Vertical gap between sections
    Spacer,
}
