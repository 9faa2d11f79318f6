//! Width-aware text helpers: greedy word wrap and ellipsis truncation

use super::metrics::{Font, TextMeasure};

/// Suffix appended to truncated cell text
pub const ELLIPSIS: &str = "...";

/// Greedy word wrap against a measured width
///
/// Words accumulate on a line while `measure(line + " " + word) <= width`;
/// the overflowing word starts the next line. A single word wider than
/// `width` is kept whole on its own line. Explicit newlines start a new
/// paragraph; blank paragraphs produce an empty line.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    width: f32,
    font: Font,
    size: f32,
) -> Vec<String> {
    let mut lines = vec![];
    for paragraph in text.trim_end().split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if measure.width(&candidate, font, size) <= width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() || !lines.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Shorten `text` until `text + "..."` fits in `width`
///
/// Text that already fits is returned unchanged. When even the bare ellipsis
/// is wider than the column the cell is left empty, so the result never
/// exceeds `width`.
pub fn truncate_to_width<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    width: f32,
    font: Font,
    size: f32,
) -> String {
    if measure.width(text, font, size) <= width {
        return text.to_string();
    }
    let mut kept: Vec<char> = text.chars().collect();
    while !kept.is_empty() {
        kept.pop();
        let head: String = kept.iter().collect();
        let candidate = format!("{}{}", head.trim_end(), ELLIPSIS);
        if measure.width(&candidate, font, size) <= width {
            return candidate;
        }
    }
    String::new()
}

/// ASCII base letter for common accented Latin characters
pub fn fold_diacritic(c: char) -> Option<char> {
    let base = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' | 'Ā' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ę' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' | 'Ē' | 'Ę' => 'E',
        'í' | 'ì' | 'î' | 'ï' | 'ī' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' | 'Ī' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ø' | 'Ō' => 'O',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ū' => 'U',
        'ñ' | 'ń' => 'n',
        'Ñ' | 'Ń' => 'N',
        'ç' | 'ć' | 'č' => 'c',
        'Ç' | 'Ć' | 'Č' => 'C',
        'ý' | 'ÿ' => 'y',
        'Ý' | 'Ÿ' => 'Y',
        'š' | 'ś' => 's',
        'Š' | 'Ś' => 'S',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        'ł' => 'l',
        'Ł' => 'L',
        _ => return None,
    };
    Some(base)
}

/// Replace accented Latin letters with their ASCII base letter
pub fn strip_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| fold_diacritic(c).unwrap_or(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::StandardMetrics;
    use crate::test_utils::FixedWidthMeasure;

    #[test]
    fn test_wrap_never_exceeds_width() {
        let m = StandardMetrics;
        let text = "The quick brown fox jumps";
        for width in [40.0_f32, 60.0, 80.0, 120.0, 200.0] {
            let lines = wrap_text(&m, text, width, Font::Regular, 12.0);
            for line in &lines {
                assert!(
                    m.width(line, Font::Regular, 12.0) <= width,
                    "line {:?} exceeds {}",
                    line,
                    width
                );
            }
            assert_eq!(lines.join(" "), text);
        }
    }

    #[test]
    fn test_wrap_greedy_breaks() {
        // 1pt per char: "The quick" = 9 fits in 10, "The quick brown" = 15 does not
        let m = FixedWidthMeasure::new(1.0);
        let lines = wrap_text(&m, "The quick brown fox jumps", 10.0, Font::Regular, 10.0);
        assert_eq!(lines, vec!["The quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_keeps_oversized_word_whole() {
        let m = FixedWidthMeasure::new(1.0);
        let lines = wrap_text(&m, "a extraordinarily b", 5.0, Font::Regular, 10.0);
        assert_eq!(lines, vec!["a", "extraordinarily", "b"]);
    }

    #[test]
    fn test_wrap_empty_and_paragraphs() {
        let m = FixedWidthMeasure::new(1.0);
        assert!(wrap_text(&m, "", 10.0, Font::Regular, 10.0).is_empty());
        assert!(wrap_text(&m, "   ", 10.0, Font::Regular, 10.0).is_empty());
        let lines = wrap_text(&m, "one\n\ntwo", 10.0, Font::Regular, 10.0);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_truncate_fits_with_ellipsis() {
        let m = StandardMetrics;
        let text = "Mantenimiento preventivo de ascensores";
        let width = 80.0;
        let out = truncate_to_width(&m, text, width, Font::Regular, 10.0);
        assert!(out.ends_with(ELLIPSIS));
        assert!(m.width(&out, Font::Regular, 10.0) <= width);
    }

    #[test]
    fn test_truncate_leaves_fitting_text() {
        let m = FixedWidthMeasure::new(1.0);
        assert_eq!(truncate_to_width(&m, "short", 10.0, Font::Regular, 10.0), "short");
        assert_eq!(
            truncate_to_width(&m, "abcdefghijkl", 10.0, Font::Regular, 10.0),
            "abcdefg..."
        );
    }

    #[test]
    fn test_truncate_column_narrower_than_ellipsis_is_empty() {
        let m = FixedWidthMeasure::new(1.0);
        let out = truncate_to_width(&m, "abcdef", 2.0, Font::Regular, 10.0);
        assert_eq!(out, "");
        assert!(m.width(&out, Font::Regular, 10.0) <= 2.0);
        // Exactly the ellipsis width still shows it
        assert_eq!(truncate_to_width(&m, "abcdef", 3.0, Font::Regular, 10.0), "...");
    }

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("Pérdidas y Ganancias"), "Perdidas y Ganancias");
        assert_eq!(strip_diacritics("Año Señor"), "Ano Senor");
    }
}
