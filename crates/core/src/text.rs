//! Small text helpers shared by prompt construction and state rendering.

/// Suffix appended by [`clip`] when text was cut.
pub const TRUNCATION_MARKER: &str = "\n...[truncated]";

/// Keep at most `max_chars` characters of `s`, appending a truncation marker
/// when anything was dropped.
pub fn clip(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &s[..idx], TRUNCATION_MARKER),
        None => s.to_string(),
    }
}

/// The first `max_chars` characters of `s`, without any marker.
pub fn prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_short_text_untouched() {
        assert_eq!(clip("hello", 10), "hello");
        assert_eq!(clip("hello", 5), "hello");
    }

    #[test]
    fn clip_long_text_marked() {
        assert_eq!(clip("hello world", 5), "hello\n...[truncated]");
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        assert_eq!(prefix("héllo", 2), "hé");
        assert_eq!(prefix("ab", 100), "ab");
    }
}
