//! Paginated document layout
//!
//! A generic page writer that every report reuses: text measurement, greedy
//! word-wrap, ellipsis truncation, tables with repeated headers, and
//! look-ahead page breaks driven by a single [`SpacePolicy`] table.
//!
//! ```rust,ignore
//! use hearth_core::layout::{DocumentWriter, PageGeometry, SpacePolicy, StandardMetrics, Typography};
//!
//! let mut writer = DocumentWriter::new(
//!     "Report",
//!     PageGeometry::default(),
//!     Typography::default(),
//!     SpacePolicy::default(),
//!     StandardMetrics,
//! );
//! let body = writer.typography().body;
//! writer.write_line("Hello", &body);
//! let document = writer.finish();
//! ```

pub mod blocks;
pub mod metrics;
pub mod page;
pub mod render;
pub mod style;
pub mod text;
pub mod writer;

pub use blocks::{BlockKind, SpacePolicy};
pub use metrics::{Font, StandardMetrics, TextMeasure};
pub use page::{Document, DocumentCursor, DrawOp, Margins, Page, PageGeometry};
pub use render::{PageDescriptionRenderer, RenderFormat, Renderer, TextPreviewRenderer};
pub use style::{TextStyle, Typography};
pub use text::{strip_diacritics, truncate_to_width, wrap_text, ELLIPSIS};
pub use writer::{Align, Cell, ColumnSpec, DocumentWriter, WriterState};
