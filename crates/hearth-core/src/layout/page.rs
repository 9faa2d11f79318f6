//! Page geometry, the document cursor, and the drawable page surface
//!
//! Coordinates are points with the origin at the bottom-left corner of the
//! page, so the cursor's `y` decreases as content flows down the page.

use serde::{Deserialize, Serialize};

use super::metrics::Font;

/// A4 portrait, in points
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 40.0,
            bottom: 50.0,
            left: 40.0,
        }
    }
}

/// Page size plus margins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margins: Margins::default(),
        }
    }
}

impl PageGeometry {
    /// Baseline of the first line on a fresh page
    pub fn top(&self) -> f32 {
        self.height - self.margins.top
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    /// Vertical space between the top and bottom margins
    pub fn content_height(&self) -> f32 {
        self.top() - self.margins.bottom
    }
}

/// Write position inside the current page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocumentCursor {
    pub page_index: usize,
    pub x: f32,
    pub y: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
}

impl DocumentCursor {
    /// Cursor at the top-left content corner of page `page_index`
    pub fn at_top(geometry: &PageGeometry, page_index: usize) -> Self {
        Self {
            page_index,
            x: geometry.margins.left,
            y: geometry.top(),
            page_width: geometry.width,
            page_height: geometry.height,
            margins: geometry.margins,
        }
    }

    /// Height left before the bottom margin
    pub fn remaining(&self) -> f32 {
        self.y - self.margins.bottom
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margins.left - self.margins.right
    }

    pub fn right_edge(&self) -> f32 {
        self.page_width - self.margins.right
    }

    pub fn is_at_top(&self) -> bool {
        self.y >= self.page_height - self.margins.top
    }
}

/// One drawing instruction on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Text with its baseline starting at (x, y)
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
    },
    /// Horizontal or vertical line segment
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
    },
    /// Stroked rectangle; (x, y) is the bottom-left corner
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(index: usize, geometry: &PageGeometry) -> Self {
        Self {
            index,
            width: geometry.width,
            height: geometry.height,
            ops: vec![],
        }
    }

    /// Text runs on this page, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A finished, paginated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether any text run on any page contains `needle`
    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages
            .iter()
            .flat_map(|page| page.texts())
            .any(|text| text.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_starts_below_top_margin() {
        let geometry = PageGeometry {
            width: 300.0,
            height: 200.0,
            margins: Margins {
                top: 40.0,
                right: 20.0,
                bottom: 60.0,
                left: 30.0,
            },
        };
        let cursor = DocumentCursor::at_top(&geometry, 2);
        assert_eq!(cursor.page_index, 2);
        assert_eq!(cursor.x, 30.0);
        assert_eq!(cursor.y, 160.0);
        assert_eq!(cursor.remaining(), 100.0);
        assert_eq!(cursor.content_width(), 250.0);
        assert!(cursor.is_at_top());
        assert_eq!(geometry.content_height(), 100.0);
    }

    #[test]
    fn test_draw_op_json_shape() {
        let op = DrawOp::Text {
            x: 1.0,
            y: 2.0,
            text: "Total".into(),
            font: Font::Bold,
            size: 10.0,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "text");
        assert_eq!(json["font"], "bold");
    }
}
