//! Width and case normalization
//!
//! Users mix full-width digits (`１０月１日`), ideographic spaces and
//! assorted dashes. Everything downstream matches against the half-width form.

use unicode_segmentation::UnicodeSegmentation;

/// Convert full-width ASCII variants (U+FF01..U+FF5E) and the ideographic
/// space to their half-width equivalents
pub fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Normalize a user message before rule matching
///
/// Half-width conversion plus dash and tilde folding, so `2000—3000` and
/// `10月1日〜5日` read like their ASCII spellings. Case is preserved.
pub fn normalize_message(text: &str) -> String {
    to_half_width(text)
        .chars()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            '\u{301C}' | '\u{223C}' => '~',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Normalize a city name for table lookup
///
/// Trim, half-width, lowercase, drop all whitespace, then strip a trailing
/// `市` when something remains before it.
pub fn normalize_city_name(name: &str) -> String {
    let folded: String = to_half_width(name.trim())
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    match folded.strip_suffix('市') {
        Some(stem) if stem.graphemes(true).count() > 0 => stem.to_string(),
        _ => folded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_width_digits() {
        assert_eq!(to_half_width("１０月５日"), "10月5日");
        assert_eq!(to_half_width("Ｔｏｋｙｏ"), "Tokyo");
        assert_eq!(to_half_width("a\u{3000}b"), "a b");
    }

    #[test]
    fn test_message_dash_folding() {
        assert_eq!(normalize_message("预算2000—3000元"), "预算2000-3000元");
        assert_eq!(normalize_message(" 10月1日〜5日 "), "10月1日~5日");
    }

    #[test]
    fn test_city_name_normalization() {
        assert_eq!(normalize_city_name("  New York "), "newyork");
        assert_eq!(normalize_city_name("ＴＯＫＹＯ"), "tokyo");
        assert_eq!(normalize_city_name("上海市"), "上海");
        assert_eq!(normalize_city_name("市"), "市");
    }
}
