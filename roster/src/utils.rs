use regex::Regex;

/// Strict Ethereum address check: 0x-prefixed, exactly 40 hex characters.
/// Returns the lowercase form so every stored or compared address has one
/// spelling.
pub fn normalize_address(input: &str) -> Option<String> {
    let pattern = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
    let trimmed = input.trim();

    if !pattern.is_match(trimmed) {
        return None;
    }

    Some(trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::normalize_address;

    #[test]
    fn test_valid_lowercase() {
        assert_eq!(
            normalize_address("0x1111111111111111111111111111111111111111"),
            Some("0x1111111111111111111111111111111111111111".to_string())
        );
    }

    #[test]
    fn test_uppercase_is_folded() {
        assert_eq!(
            normalize_address("0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD"),
            Some("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd".to_string())
        );
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(
            normalize_address("  0x2222222222222222222222222222222222222222\t"),
            Some("0x2222222222222222222222222222222222222222".to_string())
        );
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(normalize_address("0xDEADBEEF"), None);
        assert_eq!(
            normalize_address("0x11111111111111111111111111111111111111111"),
            None
        );
    }

    #[test]
    fn test_missing_prefix() {
        assert_eq!(
            normalize_address("1111111111111111111111111111111111111111"),
            None
        );
    }

    #[test]
    fn test_non_hex() {
        assert_eq!(
            normalize_address("0xzzzz111111111111111111111111111111111111"),
            None
        );
        assert_eq!(normalize_address(""), None);
    }
}
