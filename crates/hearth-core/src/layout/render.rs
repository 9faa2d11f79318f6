//! Renderers: finished [`Document`] to bytes

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::page::{Document, DrawOp};
use crate::error::{Error, Result};

/// Serializes a finished document
pub trait Renderer {
    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    /// File extension (without the dot) for suggested filenames
    fn extension(&self) -> &'static str;

    fn render(&self, document: &Document) -> Result<Vec<u8>>;
}

/// JSON page description: page geometry plus every draw operation
#[derive(Debug, Clone, Copy, Default)]
pub struct PageDescriptionRenderer {
    pub pretty: bool,
}

impl Renderer for PageDescriptionRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, document: &Document) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        };
        bytes.map_err(|e| Error::Render(format!("page description: {}", e)))
    }
}

/// Plain-text approximation of each page, for terminals and quick checks
#[derive(Debug, Clone, Copy)]
pub struct TextPreviewRenderer {
    /// Points per character column
    pub column_width: f32,
    /// Characters used for rules
    pub rule_width: usize,
}

impl Default for TextPreviewRenderer {
    fn default() -> Self {
        Self {
            column_width: 4.5,
            rule_width: 100,
        }
    }
}

/// Everything drawn on one baseline. A rule shares its baseline with text
/// when it underlines it, so both are kept.
#[derive(Default)]
struct PreviewRow<'a> {
    texts: Vec<(f32, &'a str)>,
    rule: bool,
}

impl TextPreviewRenderer {
    fn render_texts(&self, runs: &[(f32, &str)], left: f32) -> String {
        let mut runs = runs.to_vec();
        runs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let mut line = String::new();
        for (x, text) in runs {
            let column = ((x - left).max(0.0) / self.column_width) as usize;
            let used = line.chars().count();
            if column > used {
                line.push_str(&" ".repeat(column - used));
            } else if used > 0 {
                line.push(' ');
            }
            line.push_str(text);
        }
        line.trim_end().to_string()
    }

    fn render_page(&self, document: &Document, index: usize, out: &mut String) {
        let Some(page) = document.pages.get(index) else {
            return;
        };
        let left = document.geometry.margins.left;

        // Group by baseline, top of page first
        let mut rows: BTreeMap<i64, PreviewRow<'_>> = BTreeMap::new();
        for op in &page.ops {
            match op {
                DrawOp::Text { x, y, text, .. } => {
                    let key = -(y.round() as i64);
                    rows.entry(key).or_default().texts.push((*x, text.as_str()));
                }
                DrawOp::Rule { y1, .. } => {
                    rows.entry(-(y1.round() as i64)).or_default().rule = true;
                }
                DrawOp::Rect { .. } => {}
            }
        }

        out.push_str(&format!("--- Page {} of {} ---\n", index + 1, document.pages.len()));
        for row in rows.values() {
            if !row.texts.is_empty() {
                out.push_str(&self.render_texts(&row.texts, left));
                out.push('\n');
            }
            if row.rule {
                out.push_str(&"-".repeat(self.rule_width));
                out.push('\n');
            }
        }
    }
}

impl Renderer for TextPreviewRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &Document) -> Result<Vec<u8>> {
        let mut out = format!("{}\n\n", document.title);
        for index in 0..document.pages.len() {
            if index > 0 {
                out.push('\n');
            }
            self.render_page(document, index, &mut out);
        }
        Ok(out.into_bytes())
    }
}

/// Output format selectable from the CLI and the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Json,
    Text,
}

impl RenderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }

    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self {
            Self::Json => Box::new(PageDescriptionRenderer::default()),
            Self::Text => Box::new(TextPreviewRenderer::default()),
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Unknown format: {} (expected json or text)", s)),
        }
    }
}
