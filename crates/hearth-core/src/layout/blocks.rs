//! Look-ahead space requirements for atomic blocks
//!
//! Before starting a block that must not be split across pages, the writer
//! checks the block's required height here and breaks the page first when the
//! remaining space is smaller.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of content that start with a look-ahead page-break check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    SectionHeading,
    Summary,
    TableHeader,
    Ranking,
    Insight,
    GroupHeader,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SectionHeading => "section_heading",
            Self::Summary => "summary",
            Self::TableHeader => "table_header",
            Self::Ranking => "ranking",
            Self::Insight => "insight",
            Self::GroupHeader => "group_header",
        }
    }

    pub fn all() -> &'static [BlockKind] {
        &[
            Self::SectionHeading,
            Self::Summary,
            Self::TableHeader,
            Self::Ranking,
            Self::Insight,
            Self::GroupHeader,
        ]
    }

    /// Height reserved when no override is configured
    pub fn default_height(&self) -> f32 {
        match self {
            Self::SectionHeading => 60.0,
            Self::Summary => 120.0,
            Self::TableHeader => 60.0,
            Self::Ranking => 120.0,
            Self::Insight => 40.0,
            Self::GroupHeader => 60.0,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown block kind: {}", s))
    }
}

/// The `{BlockKind -> required height}` table
#[derive(Debug, Clone, PartialEq)]
pub struct SpacePolicy {
    heights: HashMap<BlockKind, f32>,
}

impl Default for SpacePolicy {
    fn default() -> Self {
        Self {
            heights: BlockKind::all()
                .iter()
                .map(|kind| (*kind, kind.default_height()))
                .collect(),
        }
    }
}

impl SpacePolicy {
    pub fn with_height(mut self, kind: BlockKind, height: f32) -> Self {
        self.heights.insert(kind, height);
        self
    }

    pub fn set(&mut self, kind: BlockKind, height: f32) {
        self.heights.insert(kind, height);
    }

    pub fn required_height(&self, kind: BlockKind) -> f32 {
        self.heights
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults_and_overrides() {
        let policy = SpacePolicy::default().with_height(BlockKind::Insight, 55.0);
        assert_eq!(policy.required_height(BlockKind::Insight), 55.0);
        assert_eq!(policy.required_height(BlockKind::Summary), 120.0);
    }

    #[test]
    fn test_block_kind_parse() {
        assert_eq!("table_header".parse::<BlockKind>().unwrap(), BlockKind::TableHeader);
        assert!("footer".parse::<BlockKind>().is_err());
        for kind in BlockKind::all() {
            assert_eq!(kind.as_str().parse::<BlockKind>().unwrap(), *kind);
        }
    }
}
