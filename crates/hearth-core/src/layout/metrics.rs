//! Text measurement
//!
//! Widths are in points. [`StandardMetrics`] uses the advance widths of the
//! standard Helvetica faces (units per 1000 em); `regular` and `bold` in the
//! page description name Helvetica and Helvetica-Bold.

use serde::{Deserialize, Serialize};

use super::text::fold_diacritic;

/// Font face used for a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Regular,
    Bold,
}

/// Measures rendered text width
pub trait TextMeasure {
    /// Width of `text` set in `font` at `size` points
    fn width(&self, text: &str, font: Font, size: f32) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn width(&self, text: &str, font: Font, size: f32) -> f32 {
        (**self).width(text, font, size)
    }
}

/// Helvetica / Helvetica-Bold advance widths
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMetrics;

/// Width used for characters outside the tables
const FALLBACK_WIDTH: u16 = 556;

// ASCII 32..=126
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

impl StandardMetrics {
    fn advance(c: char, font: Font) -> u16 {
        let table = match font {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        };
        // Accented Latin letters take their base letter's width
        let c = fold_diacritic(c).unwrap_or(c);
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }
}

impl TextMeasure for StandardMetrics {
    fn width(&self, text: &str, font: Font, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| Self::advance(c, font) as u32)
            .sum();
        units as f32 * size / 1000.0
    }
}
