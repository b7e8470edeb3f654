//! Utility functions for IRC protocol handling.

/// Maximum length for an IRC line body, excluding the CRLF terminator.
pub const MAX_MESSAGE_BODY: usize = 510;

/// Truncates a string to at most `max_bytes` bytes without breaking
/// a multi-byte UTF-8 codepoint at the end.
///
/// # Examples
///
/// ```
/// use slirc_client::util::truncate_utf8_safe;
///
/// assert_eq!(truncate_utf8_safe("hello world", 5), "hello");
///
/// let emoji = "Hello 👋 World";
/// assert_eq!(truncate_utf8_safe(emoji, 8), "Hello ");
///
/// assert_eq!(truncate_utf8_safe("hi", 10), "hi");
/// ```
#[inline]
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_at_boundary() {
        let s = "é".repeat(300);
        let cut = truncate_utf8_safe(&s, MAX_MESSAGE_BODY);
        assert_eq!(cut.len(), MAX_MESSAGE_BODY);
        assert!(cut.chars().all(|c| c == 'é'));

        let cut = truncate_utf8_safe(&s, 5);
        assert_eq!(cut, "éé");
    }
}
