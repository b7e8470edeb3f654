//! Helpers for IRC message prefixes (sources) and targets.

/// Nick reported for lines that carry no prefix.
pub const SYSTEM_NICK: &str = "system";

/// Extract the nickname from a `nick!user@host` prefix.
///
/// A prefix without `!` (a server name, or a bare nick) is returned whole;
/// a missing prefix yields [`SYSTEM_NICK`].
///
/// ```
/// use slirc_client::prefix::nick_from_prefix;
///
/// assert_eq!(nick_from_prefix(Some("nick!user@host")), "nick");
/// assert_eq!(nick_from_prefix(Some("irc.example.com")), "irc.example.com");
/// assert_eq!(nick_from_prefix(None), "system");
/// ```
#[must_use]
pub fn nick_from_prefix(prefix: Option<&str>) -> &str {
    match prefix {
        Some(p) => p.split_once('!').map_or(p, |(nick, _)| nick),
        None => SYSTEM_NICK,
    }
}

/// Whether `target` names a channel (leading `#` or `&`) rather than a user.
#[must_use]
pub fn is_channel_name(target: &str) -> bool {
    target.starts_with(['#', '&'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nick_from_prefix() {
        assert_eq!(nick_from_prefix(Some("alice!~a@example.org")), "alice");
        assert_eq!(nick_from_prefix(Some("alice")), "alice");
        assert_eq!(nick_from_prefix(Some("!odd@host")), "");
        assert_eq!(nick_from_prefix(None), SYSTEM_NICK);
    }

    #[test]
    fn test_is_channel_name() {
        assert!(is_channel_name("#rust"));
        assert!(is_channel_name("&local"));
        assert!(!is_channel_name("alice"));
        assert!(!is_channel_name(""));
    }
}
