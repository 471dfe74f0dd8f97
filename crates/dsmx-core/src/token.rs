//! Positioned text tokens as delivered by a word source.

use crate::geometry::BBox;

/// A word-level text token with its bounding box on the page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// The token text.
    pub text: String,
    /// Bounding box in top-left origin coordinates.
    pub bbox: BBox,
}

impl Token {
    /// Create a token from its text and edges.
    pub fn new(text: impl Into<String>, x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            text: text.into(),
            bbox: BBox::new(x0, top, x1, bottom),
        }
    }

    /// Whether the token is a single alphabetic character.
    pub fn is_single_letter(&self) -> bool {
        let mut chars = self.text.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
    }
}
