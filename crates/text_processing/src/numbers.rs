//! Number parsing for Arabic digits, Chinese numerals and small English number words

/// Regex fragment matching one number token, digits or Chinese numerals
pub const NUMBER_PATTERN: &str = r"(?:\d+|[零〇一二两三四五六七八九十百千]+)";

/// Regex fragment matching digits or an English number word up to ten
pub const EN_NUMBER_PATTERN: &str = r"(?:\d+|one|two|three|four|five|six|seven|eight|nine|ten)";

/// Parse a token matched by [`NUMBER_PATTERN`] or [`EN_NUMBER_PATTERN`]
pub fn parse_number(token: &str) -> Option<i64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok();
    }
    parse_en_number(token).or_else(|| parse_cn_number(token))
}

/// English number words one through ten
pub fn parse_en_number(word: &str) -> Option<i64> {
    let value = match word.trim().to_ascii_lowercase().as_str() {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        _ => return None,
    };
    Some(value)
}

fn cn_digit(c: char) -> Option<i64> {
    match c {
        '零' | '〇' => Some(0),
        '一' => Some(1),
        '二' | '两' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

fn cn_unit(c: char) -> Option<i64> {
    match c {
        '十' => Some(10),
        '百' => Some(100),
        '千' => Some(1_000),
        '万' => Some(10_000),
        _ => None,
    }
}

/// Parse a Chinese numeral such as `两`, `十二`, `二十一`, `三千五百`, `一万`
///
/// A leading `十` means ten (`十五` = 15). Returns `None` for anything that is
/// not made only of numeral characters.
pub fn parse_cn_number(text: &str) -> Option<i64> {
    let mut total: i64 = 0;
    let mut section: i64 = 0;
    let mut digit: Option<i64> = None;
    let mut seen = false;

    for c in text.chars() {
        seen = true;
        if let Some(d) = cn_digit(c) {
            digit = Some(d);
        } else if let Some(unit) = cn_unit(c) {
            if unit == 10_000 {
                section += digit.take().unwrap_or(0);
                total += section.max(1) * unit;
                section = 0;
            } else {
                section += digit.take().unwrap_or(1) * unit;
            }
        } else {
            return None;
        }
    }

    if !seen {
        return None;
    }
    Some(total + section + digit.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_digits() {
        assert_eq!(parse_cn_number("两"), Some(2));
        assert_eq!(parse_cn_number("五"), Some(5));
        assert_eq!(parse_cn_number("零"), Some(0));
    }

    #[test]
    fn test_compound_numerals() {
        assert_eq!(parse_cn_number("十"), Some(10));
        assert_eq!(parse_cn_number("十二"), Some(12));
        assert_eq!(parse_cn_number("二十"), Some(20));
        assert_eq!(parse_cn_number("三十一"), Some(31));
        assert_eq!(parse_cn_number("两千"), Some(2000));
        assert_eq!(parse_cn_number("三千五百"), Some(3500));
        assert_eq!(parse_cn_number("一万"), Some(10_000));
    }

    #[test]
    fn test_rejects_other_text() {
        assert_eq!(parse_cn_number(""), None);
        assert_eq!(parse_cn_number("五星"), None);
    }

    #[test]
    fn test_parse_number_mixed() {
        assert_eq!(parse_number("12"), Some(12));
        assert_eq!(parse_number("两"), Some(2));
        assert_eq!(parse_number("Two"), Some(2));
        assert_eq!(parse_number(""), None);
    }
}
