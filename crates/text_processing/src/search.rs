//! Term search over normalized text

/// Byte offset of the first occurrence of `term` in `haystack`
///
/// ASCII terms only match on ASCII word boundaries, so "hk" is not found
/// inside "hiking" and "pet" not inside "carpet". Other terms match anywhere.
pub fn find_term(haystack: &str, term: &str) -> Option<usize> {
    if term.is_empty() {
        return None;
    }
    if !term.is_ascii() {
        return haystack.find(term);
    }
    haystack.match_indices(term).map(|(start, _)| start).find(|&start| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        is_boundary(before) && is_boundary(after)
    })
}

fn is_boundary(c: Option<char>) -> bool {
    c.map(|c| !c.is_ascii_alphanumeric()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_terms_need_word_boundaries() {
        assert_eq!(find_term("we like hiking", "hk"), None);
        assert_eq!(find_term("carpet cleaning", "pet"), None);
        assert_eq!(find_term("a pet, please", "pet"), Some(2));
        assert_eq!(find_term("去hk玩", "hk"), Some(3));
    }

    #[test]
    fn test_non_ascii_terms_match_anywhere() {
        assert_eq!(find_term("从北京去京都", "京都"), Some(12));
        assert_eq!(find_term("东京", "京都"), None);
    }

    #[test]
    fn test_empty_term() {
        assert_eq!(find_term("anything", ""), None);
    }
}
