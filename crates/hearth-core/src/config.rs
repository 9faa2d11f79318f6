//! Report layout configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override in the data dir
//!    (~/.local/share/hearth/config/reports.toml)
//! 2. The embedded defaults compiled into the binary
//!
//! Every key is optional; anything missing keeps its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::insights::DEFAULT_OUTLIER_MULTIPLIER;
use crate::layout::{BlockKind, PageGeometry, SpacePolicy, Typography};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/reports.toml");

/// Settings for text sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextConfig {
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub small_size: f32,
    pub line_height_factor: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            title_size: 16.0,
            heading_size: 12.0,
            body_size: 9.0,
            small_size: 7.5,
            line_height_factor: 1.4,
        }
    }
}

impl TextConfig {
    pub fn typography(&self) -> Typography {
        Typography::from_sizes(
            self.title_size,
            self.heading_size,
            self.body_size,
            self.small_size,
            self.line_height_factor,
        )
    }
}

/// Everything a report composition reads from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub page: PageGeometry,
    pub text: TextConfig,
    pub blocks: SpacePolicy,
    /// Entries per top/bottom ranking
    pub ranking_size: usize,
    pub outlier_multiplier: f64,
    pub currency_symbol: String,
    pub table_gutter: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            text: TextConfig::default(),
            blocks: SpacePolicy::default(),
            ranking_size: 5,
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
            currency_symbol: "$".to_string(),
            table_gutter: 6.0,
        }
    }
}

impl ReportConfig {
    /// Load from `path`, the data-dir override, or the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => {
                    debug!(path = %default_path.display(), "Using report config override");
                    fs::read_to_string(&default_path)
                        .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };
        parse_config(&content)
    }

    pub fn typography(&self) -> Typography {
        self.text.typography()
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("hearth").join("config").join("reports.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    page: Option<RawPage>,
    text: Option<RawText>,
    blocks: Option<toml::Table>,
    report: Option<RawReport>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    width: Option<f32>,
    height: Option<f32>,
    margin_top: Option<f32>,
    margin_right: Option<f32>,
    margin_bottom: Option<f32>,
    margin_left: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawText {
    title_size: Option<f32>,
    heading_size: Option<f32>,
    body_size: Option<f32>,
    small_size: Option<f32>,
    line_height_factor: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    ranking_size: Option<usize>,
    outlier_multiplier: Option<f64>,
    currency_symbol: Option<String>,
    table_gutter: Option<f32>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<ReportConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ReportConfig::default();

    if let Some(page) = raw.page {
        let m = &mut config.page.margins;
        m.top = page.margin_top.unwrap_or(m.top);
        m.right = page.margin_right.unwrap_or(m.right);
        m.bottom = page.margin_bottom.unwrap_or(m.bottom);
        m.left = page.margin_left.unwrap_or(m.left);
        config.page.width = page.width.unwrap_or(config.page.width);
        config.page.height = page.height.unwrap_or(config.page.height);
    }
    validate_page(&config.page)?;

    if let Some(text) = raw.text {
        let t = &mut config.text;
        t.title_size = text.title_size.unwrap_or(t.title_size);
        t.heading_size = text.heading_size.unwrap_or(t.heading_size);
        t.body_size = text.body_size.unwrap_or(t.body_size);
        t.small_size = text.small_size.unwrap_or(t.small_size);
        t.line_height_factor = text.line_height_factor.unwrap_or(t.line_height_factor);
    }
    if config.text.body_size <= 0.0 || config.text.line_height_factor <= 0.0 {
        return Err(Error::Config(
            "text sizes and line_height_factor must be positive".into(),
        ));
    }

    if let Some(blocks) = raw.blocks {
        for (name, value) in blocks {
            let Ok(kind) = name.parse::<BlockKind>() else {
                continue; // Skip unknown block kinds
            };
            let height = match value {
                toml::Value::Float(f) => f as f32,
                toml::Value::Integer(i) => i as f32,
                other => {
                    return Err(Error::Config(format!(
                        "blocks.{} must be a number, got {}",
                        name,
                        other.type_str()
                    )))
                }
            };
            config.blocks.set(kind, height.max(0.0));
        }
    }

    if let Some(report) = raw.report {
        if let Some(size) = report.ranking_size {
            config.ranking_size = size;
        }
        if let Some(multiplier) = report.outlier_multiplier {
            if multiplier <= 0.0 {
                return Err(Error::Config("outlier_multiplier must be positive".into()));
            }
            config.outlier_multiplier = multiplier;
        }
        if let Some(symbol) = report.currency_symbol {
            config.currency_symbol = symbol;
        }
        if let Some(gutter) = report.table_gutter {
            config.table_gutter = gutter.max(0.0);
        }
    }

    Ok(config)
}

fn validate_page(page: &PageGeometry) -> Result<()> {
    let margins = &page.margins;
    if page.content_width() <= 0.0 || page.content_height() <= 0.0 {
        return Err(Error::Config(format!(
            "margins ({}, {}, {}, {}) leave no room on a {}x{} page",
            margins.top, margins.right, margins.bottom, margins.left, page.width, page.height
        )));
    }
    Ok(())
}
