//! Cursor-based page writer
//!
//! [`DocumentWriter`] owns the cursor and the page list for one document.
//! Every primitive checks the space it needs against the bottom margin before
//! drawing; when the space is missing the writer moves to
//! [`WriterState::PageBreakPending`], opens a new page, resets the cursor to
//! the top margin and only then draws. The pending state never outlives the
//! primitive that entered it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::blocks::{BlockKind, SpacePolicy};
use super::metrics::TextMeasure;
use super::page::{Document, DocumentCursor, DrawOp, Page, PageGeometry};
use super::style::{TextStyle, Typography};
use super::text::{truncate_to_width, wrap_text};

const RULE_THICKNESS: f32 = 0.5;
const BOX_PADDING: f32 = 6.0;
pub const DEFAULT_GUTTER: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    WritingCurrentPage,
    PageBreakPending,
}

/// Horizontal alignment of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub width: f32,
    pub align: Align,
}

impl ColumnSpec {
    pub fn left(width: f32) -> Self {
        Self {
            width,
            align: Align::Left,
        }
    }

    pub fn right(width: f32) -> Self {
        Self {
            width,
            align: Align::Right,
        }
    }
}

/// A table cell: single line truncated to the column, or word-wrapped
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Wrapped(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn wrapped(value: impl Into<String>) -> Self {
        Self::Wrapped(value.into())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Single-owner page writer for one document
pub struct DocumentWriter<M: TextMeasure> {
    title: String,
    geometry: PageGeometry,
    typography: Typography,
    policy: SpacePolicy,
    measure: M,
    gutter: f32,
    cursor: DocumentCursor,
    pages: Vec<Page>,
    state: WriterState,
}

impl<M: TextMeasure> DocumentWriter<M> {
    pub fn new(
        title: impl Into<String>,
        geometry: PageGeometry,
        typography: Typography,
        policy: SpacePolicy,
        measure: M,
    ) -> Self {
        Self {
            title: title.into(),
            cursor: DocumentCursor::at_top(&geometry, 0),
            pages: vec![Page::new(0, &geometry)],
            geometry,
            typography,
            policy,
            measure,
            gutter: DEFAULT_GUTTER,
            state: WriterState::WritingCurrentPage,
        }
    }

    /// Space between table columns
    pub fn with_gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter.max(0.0);
        self
    }

    pub fn cursor(&self) -> &DocumentCursor {
        &self.cursor
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    pub fn content_width(&self) -> f32 {
        self.geometry.content_width()
    }

    pub fn required_height(&self, kind: BlockKind) -> f32 {
        self.policy.required_height(kind)
    }

    /// Split the content width into columns by relative weight
    pub fn fit_columns(&self, weights: &[(f32, Align)]) -> Vec<ColumnSpec> {
        if weights.is_empty() {
            return vec![];
        }
        let gutters = self.gutter * (weights.len() - 1) as f32;
        let available = (self.content_width() - gutters).max(0.0);
        let total: f32 = weights.iter().map(|(w, _)| w.max(0.0)).sum();
        weights
            .iter()
            .map(|(weight, align)| ColumnSpec {
                width: if total > 0.0 {
                    available * weight.max(0.0) / total
                } else {
                    available / weights.len() as f32
                },
                align: *align,
            })
            .collect()
    }

    fn fits(&self, height: f32) -> bool {
        height <= self.cursor.remaining()
    }

    /// Break the page first when `height` would cross the bottom margin
    fn reserve(&mut self, height: f32) {
        if !self.fits(height) {
            self.state = WriterState::PageBreakPending;
            self.page_break();
        }
    }

    /// Open a new page and move the cursor to its top margin
    pub fn page_break(&mut self) {
        let index = self.pages.len();
        self.pages.push(Page::new(index, &self.geometry));
        self.cursor = DocumentCursor::at_top(&self.geometry, index);
        self.state = WriterState::WritingCurrentPage;
        debug!(page = index + 1, "Page break");
    }

    fn push(&mut self, op: DrawOp) {
        let index = self.cursor.page_index;
        self.pages[index].ops.push(op);
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font: style.font,
            size: style.size,
        });
    }

    fn draw_rule(&mut self, x1: f32, x2: f32, y: f32) {
        self.push(DrawOp::Rule {
            x1,
            y1: y,
            x2,
            y2: y,
            thickness: RULE_THICKNESS,
        });
    }

    /// Draw one line at the cursor, then advance by the style's line height
    pub fn write_line(&mut self, text: &str, style: &TextStyle) {
        self.reserve(style.line_height);
        let (x, y) = (self.cursor.x, self.cursor.y);
        self.draw_text(x, y, text, style);
        self.cursor.y -= style.line_height;
    }

    /// One line with `left` at the margin and `right` flush to the right margin
    pub fn write_line_pair(&mut self, left: &str, right: &str, style: &TextStyle) {
        self.reserve(style.line_height);
        let (x, y) = (self.cursor.x, self.cursor.y);
        self.draw_text(x, y, left, style);
        let right_x = self.cursor.right_edge() - self.measure.width(right, style.font, style.size);
        self.draw_text(right_x, y, right, style);
        self.cursor.y -= style.line_height;
    }

    /// Greedy word-wrap into `width`; returns the number of lines written
    pub fn write_wrapped_text(&mut self, text: &str, width: f32, style: &TextStyle) -> usize {
        let lines = wrap_text(&self.measure, text, width, style.font, style.size);
        for line in &lines {
            self.write_line(line, style);
        }
        lines.len()
    }

    /// Break the page when fewer than `required` points remain
    ///
    /// A fresh page is never broken again, so a block taller than a whole page
    /// starts at the top and flows on. Returns whether a break happened.
    pub fn ensure_space(&mut self, required: f32) -> bool {
        if self.fits(required) || self.cursor.is_at_top() {
            return false;
        }
        self.state = WriterState::PageBreakPending;
        self.page_break();
        true
    }

    /// [`ensure_space`](Self::ensure_space) with the height configured for `kind`
    pub fn ensure_block(&mut self, kind: BlockKind) -> bool {
        self.ensure_space(self.policy.required_height(kind))
    }

    /// Vertical gap; stops at the bottom margin instead of breaking
    pub fn write_spacer(&mut self, height: f32) {
        self.cursor.y -= height.min(self.cursor.remaining().max(0.0));
    }

    /// Full-width separator between the previous line and the next
    pub fn write_rule(&mut self) {
        let gap = self.typography.body.line_height * 0.25;
        self.reserve(gap);
        let y = self.cursor.y + self.typography.body.line_height * 0.6;
        let (x1, x2) = (self.cursor.x, self.cursor.right_edge());
        self.draw_rule(x1, x2, y);
        self.cursor.y -= gap;
    }

    /// Label/value pairs in a box, kept together on one page
    ///
    /// Pairs that cannot fit even on an empty page are written as plain lines.
    pub fn write_key_values(&mut self, pairs: &[(String, String)]) {
        if pairs.is_empty() {
            return;
        }
        let style = self.typography.body;
        let label_style = style.emphasized();
        let height = pairs.len() as f32 * style.line_height + 2.0 * BOX_PADDING;

        if height > self.geometry.content_height() {
            for (label, value) in pairs {
                self.write_line_pair(label, value, &style);
            }
            return;
        }

        self.ensure_space(height.max(self.policy.required_height(BlockKind::Summary)));
        self.reserve(height);

        let top = self.cursor.y;
        let left = self.cursor.x;
        let right = self.cursor.right_edge();
        self.push(DrawOp::Rect {
            x: left,
            y: top - height,
            width: right - left,
            height,
            thickness: RULE_THICKNESS,
        });

        let mut baseline = top - BOX_PADDING - style.size;
        for (label, value) in pairs {
            self.draw_text(left + BOX_PADDING, baseline, label, &label_style);
            let value_x =
                right - BOX_PADDING - self.measure.width(value, style.font, style.size);
            self.draw_text(value_x, baseline, value, &style);
            baseline -= style.line_height;
        }
        self.cursor.y = top - height;
    }

    fn column_x(&self, columns: &[ColumnSpec], col: usize) -> f32 {
        let preceding: f32 = columns[..col].iter().map(|c| c.width).sum();
        self.geometry.margins.left + preceding + self.gutter * col as f32
    }

    fn table_width(&self, columns: &[ColumnSpec]) -> f32 {
        let widths: f32 = columns.iter().map(|c| c.width).sum();
        widths + self.gutter * columns.len().saturating_sub(1) as f32
    }

    fn draw_cell_line(&mut self, columns: &[ColumnSpec], col: usize, text: &str, style: &TextStyle) {
        let spec = columns[col];
        let mut x = self.column_x(columns, col);
        if spec.align == Align::Right {
            x += spec.width - self.measure.width(text, style.font, style.size);
        }
        let y = self.cursor.y;
        self.draw_text(x, y, text, style);
    }

    fn write_table_header(&mut self, headers: &[&str], columns: &[ColumnSpec], style: &TextStyle) {
        let gap = style.line_height * 0.25;
        self.reserve(style.line_height + gap);
        for (col, header) in headers.iter().enumerate().take(columns.len()) {
            let text = truncate_to_width(&self.measure, header, columns[col].width, style.font, style.size);
            self.draw_cell_line(columns, col, &text, style);
        }
        self.cursor.y -= style.line_height;

        let y = self.cursor.y + style.line_height * 0.6;
        let x1 = self.geometry.margins.left;
        let x2 = x1 + self.table_width(columns);
        self.draw_rule(x1, x2, y);
        self.cursor.y -= gap;
    }

    /// Dry run: the lines each cell of `row` occupies
    fn layout_row(&self, row: &[Cell], columns: &[ColumnSpec], style: &TextStyle) -> Vec<Vec<String>> {
        columns
            .iter()
            .enumerate()
            .map(|(col, spec)| match row.get(col) {
                None => vec![],
                Some(Cell::Text(text)) => {
                    vec![truncate_to_width(&self.measure, text, spec.width, style.font, style.size)]
                }
                Some(Cell::Wrapped(text)) => {
                    wrap_text(&self.measure, text, spec.width, style.font, style.size)
                        .into_iter()
                        .map(|line| {
                            truncate_to_width(&self.measure, &line, spec.width, style.font, style.size)
                        })
                        .collect()
                }
            })
            .collect()
    }

    /// Bold header row, separator rule, then data rows
    ///
    /// Each row's height is the largest line count among its cells. A row
    /// that does not fit moves to the next page, where the header is drawn
    /// again.
    pub fn write_table(&mut self, headers: &[&str], rows: &[Vec<Cell>], columns: &[ColumnSpec]) {
        let body = self.typography.body;
        let header_style = body.emphasized();

        self.ensure_block(BlockKind::TableHeader);
        self.write_table_header(headers, columns, &header_style);

        for row in rows {
            let cells = self.layout_row(row, columns, &body);
            let line_count = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
            let height = line_count as f32 * body.line_height;

            if !self.fits(height) {
                self.state = WriterState::PageBreakPending;
                self.page_break();
                self.write_table_header(headers, columns, &header_style);
            }

            for i in 0..line_count {
                // Rows taller than a page continue on the next one
                if !self.fits(body.line_height) {
                    self.state = WriterState::PageBreakPending;
                    self.page_break();
                    self.write_table_header(headers, columns, &header_style);
                }
                for (col, lines) in cells.iter().enumerate() {
                    if let Some(text) = lines.get(i) {
                        self.draw_cell_line(columns, col, text, &body);
                    }
                }
                self.cursor.y -= body.line_height;
            }
        }
    }

    /// Stamp "Page i of N" in the bottom margin of every page
    pub fn stamp_footers(&mut self, style: &TextStyle) {
        let total = self.pages.len();
        let y = self.geometry.margins.bottom / 2.0;
        let right = self.geometry.width - self.geometry.margins.right;
        for page in self.pages.iter_mut() {
            let text = format!("Page {} of {}", page.index + 1, total);
            let x = right - self.measure.width(&text, style.font, style.size);
            page.ops.push(DrawOp::Text {
                x,
                y,
                text,
                font: style.font,
                size: style.size,
            });
        }
    }

    pub fn finish(self) -> Document {
        debug!(title = %self.title, pages = self.pages.len(), "Document finished");
        Document {
            title: self.title,
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}
