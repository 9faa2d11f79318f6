//! Text styles

use serde::{Deserialize, Serialize};

use super::metrics::Font;

/// Font, size and line advance for a run of text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    /// Vertical advance after one line, in points
    pub line_height: f32,
}

impl TextStyle {
    pub fn new(font: Font, size: f32, line_height: f32) -> Self {
        Self {
            font,
            size,
            line_height,
        }
    }

    pub fn regular(size: f32, line_height_factor: f32) -> Self {
        Self::new(Font::Regular, size, size * line_height_factor)
    }

    pub fn bold(size: f32, line_height_factor: f32) -> Self {
        Self::new(Font::Bold, size, size * line_height_factor)
    }

    /// Same size and advance in bold
    pub fn emphasized(&self) -> Self {
        Self {
            font: Font::Bold,
            ..*self
        }
    }
}

/// The styles a report uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    pub title: TextStyle,
    pub heading: TextStyle,
    pub body: TextStyle,
    pub small: TextStyle,
}

impl Typography {
    pub fn from_sizes(title: f32, heading: f32, body: f32, small: f32, line_height_factor: f32) -> Self {
        Self {
            title: TextStyle::bold(title, line_height_factor),
            heading: TextStyle::bold(heading, line_height_factor),
            body: TextStyle::regular(body, line_height_factor),
            small: TextStyle::regular(small, line_height_factor),
        }
    }
}

impl Default for Typography {
    fn default() -> Self {
        Self::from_sizes(16.0, 12.0, 9.0, 7.5, 1.4)
    }
}
