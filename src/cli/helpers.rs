//! Shared helper functions for CLI commands

/// Placeholder shown where a referenced entity cannot be found
pub const MISSING: &str = "MISSING";

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// The resolved name, or the missing placeholder
pub fn name_or_missing(name: Option<&str>) -> &str {
    name.unwrap_or(MISSING)
}

/// Escape a cell for markdown tables
pub fn escape_md(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Fräsen und Bohren", 9), "Fräsen...");
    }

    #[test]
    fn test_name_or_missing() {
        assert_eq!(name_or_missing(Some("Saw")), "Saw");
        assert_eq!(name_or_missing(None), "MISSING");
    }

    #[test]
    fn test_escape_md() {
        assert_eq!(escape_md("a|b"), "a\\|b");
        assert_eq!(escape_md("line\nbreak"), "line break");
    }
}
