//! In-memory channel and user state for one connection.
//!
//! [`SessionState`] is owned by the [`Dispatcher`](crate::dispatch::Dispatcher).
//! Everything outside the dispatcher sees it through cloned
//! [`Snapshot`]s.

use std::collections::{BTreeMap, BTreeSet};

use crate::casemap::CaseMapping;
use crate::state::ConnectionState;

/// A user as seen in one channel's roster.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Nickname as last reported by the server.
    pub nick: String,
    /// Channel modes such as `"op"` or `"voice"`.
    pub modes: BTreeSet<String>,
}

impl User {
    /// A user with no channel modes.
    pub fn new(nick: impl Into<String>) -> Self {
        User {
            nick: nick.into(),
            modes: BTreeSet::new(),
        }
    }

    /// Add a mode, builder style.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.modes.insert(mode.into());
        self
    }

    /// Whether the user holds `mode` in this channel.
    #[must_use]
    pub fn has_mode(&self, mode: &str) -> bool {
        self.modes.contains(mode)
    }
}

/// A channel and its roster.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    /// Channel name as first seen.
    pub name: String,
    /// Current topic, if known.
    pub topic: Option<String>,
    case_mapping: CaseMapping,
    /// Keyed by folded nick.
    users: BTreeMap<String, User>,
}

impl Channel {
    fn new(name: &str, case_mapping: CaseMapping) -> Self {
        Channel {
            name: name.to_owned(),
            topic: None,
            case_mapping,
            users: BTreeMap::new(),
        }
    }

    /// Users in the roster, ordered by folded nick.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Look up a user by nick.
    #[must_use]
    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(self.case_mapping.fold(nick).as_ref())
    }

    /// Whether `nick` is in the roster.
    #[must_use]
    pub fn contains(&self, nick: &str) -> bool {
        self.user(nick).is_some()
    }

    /// Number of users in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Insert or overwrite a user.
    pub fn insert(&mut self, user: User) {
        let key = self.case_mapping.fold(&user.nick).into_owned();
        self.users.insert(key, user);
    }

    /// Remove a user, returning the record if it was present.
    pub fn remove(&mut self, nick: &str) -> Option<User> {
        let key = self.case_mapping.fold(nick);
        self.users.remove(key.as_ref())
    }

    /// Move `old` to `new`, keeping its modes. Returns whether `old` was present.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        match self.remove(old) {
            Some(mut user) => {
                user.nick = new.to_owned();
                self.insert(user);
                true
            }
            None => false,
        }
    }

    /// Owned copy of the roster, in roster order.
    #[must_use]
    pub fn roster(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }
}

/// All channels known in the current connection plus the local nick.
#[derive(Clone, Debug)]
pub struct SessionState {
    case_mapping: CaseMapping,
    nick: String,
    /// Keyed by folded channel name.
    channels: BTreeMap<String, Channel>,
}

impl SessionState {
    /// Empty session for the given local nick.
    pub fn new(nick: impl Into<String>, case_mapping: CaseMapping) -> Self {
        SessionState {
            case_mapping,
            nick: nick.into(),
            channels: BTreeMap::new(),
        }
    }

    /// The case mapping used for keys.
    #[must_use]
    pub fn case_mapping(&self) -> CaseMapping {
        self.case_mapping
    }

    /// The local user's current nick.
    #[must_use]
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Replace the local nick.
    pub fn set_nick(&mut self, nick: impl Into<String>) {
        self.nick = nick.into();
    }

    /// Whether `nick` refers to the local user.
    #[must_use]
    pub fn is_me(&self, nick: &str) -> bool {
        self.case_mapping.equals(&self.nick, nick)
    }

    /// Drop every channel and adopt `nick`, as at the start of a connection.
    pub fn reset(&mut self, nick: impl Into<String>) {
        self.nick = nick.into();
        self.channels.clear();
    }

    /// Look up a channel.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(self.case_mapping.fold(name).as_ref())
    }

    /// Look up a channel mutably.
    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        let key = self.case_mapping.fold(name);
        self.channels.get_mut(key.as_ref())
    }

    /// Get a channel, creating it if this is the first reference.
    pub fn ensure_channel(&mut self, name: &str) -> &mut Channel {
        let case_mapping = self.case_mapping;
        self.channels
            .entry(case_mapping.fold(name).into_owned())
            .or_insert_with(|| Channel::new(name, case_mapping))
    }

    /// Forget a channel entirely.
    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let key = self.case_mapping.fold(name);
        self.channels.remove(key.as_ref())
    }

    /// Channels in key order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Remove `nick` from every roster, returning the names of the channels
    /// it was removed from.
    pub fn remove_user_everywhere(&mut self, nick: &str) -> Vec<String> {
        self.channels
            .values_mut()
            .filter_map(|channel| channel.remove(nick).map(|_| channel.name.clone()))
            .collect()
    }

    /// Rename `old` to `new` in every roster that contains it.
    pub fn rename_user_everywhere(&mut self, old: &str, new: &str) {
        for channel in self.channels.values_mut() {
            channel.rename(old, new);
        }
    }

    /// Read-only copy for the UI.
    #[must_use]
    pub fn snapshot(&self, connection: ConnectionState) -> Snapshot {
        Snapshot {
            connection,
            nick: self.nick.clone(),
            channels: self.channels.values().cloned().collect(),
        }
    }
}

/// Point-in-time view of the client published to the UI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Connection state at the time of the snapshot.
    pub connection: ConnectionState,
    /// Local nick.
    pub nick: String,
    /// Known channels in key order.
    pub channels: Vec<Channel>,
}

impl Snapshot {
    /// Find a channel by name, using the channel's own case mapping.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|c| c.case_mapping.equals(&c.name, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_channel_is_case_insensitive() {
        let mut session = SessionState::new("me", CaseMapping::Rfc1459);
        session.ensure_channel("#Rust").insert(User::new("alice"));
        session.ensure_channel("#rust").insert(User::new("bob"));

        assert_eq!(session.channels().count(), 1);
        let channel = session.channel("#RUST").unwrap();
        assert_eq!(channel.name, "#Rust");
        assert_eq!(channel.len(), 2);
    }

    #[test]
    fn test_strict_mapping_keeps_spellings_apart() {
        let mut session = SessionState::new("me", CaseMapping::Strict);
        session.ensure_channel("#Rust");
        session.ensure_channel("#rust");
        assert_eq!(session.channels().count(), 2);
        assert!(!session.is_me("Me"));
    }

    #[test]
    fn test_rename_preserves_modes() {
        let mut session = SessionState::new("me", CaseMapping::Rfc1459);
        session
            .ensure_channel("#x")
            .insert(User::new("alice").with_mode("op"));

        session.rename_user_everywhere("ALICE", "alice2");

        let channel = session.channel("#x").unwrap();
        assert!(!channel.contains("alice"));
        let user = channel.user("alice2").unwrap();
        assert_eq!(user.nick, "alice2");
        assert!(user.has_mode("op"));
    }

    #[test]
    fn test_remove_user_everywhere_reports_channels() {
        let mut session = SessionState::new("me", CaseMapping::Rfc1459);
        session.ensure_channel("#a").insert(User::new("n"));
        session.ensure_channel("#b");
        session.ensure_channel("#c").insert(User::new("n"));

        let affected = session.remove_user_everywhere("n");
        assert_eq!(affected, vec!["#a".to_string(), "#c".to_string()]);
        assert!(session.channels().all(|c| !c.contains("n")));
        // Channels stay even when their roster empties.
        assert_eq!(session.channels().count(), 3);
    }

    #[test]
    fn test_snapshot_lookup() {
        let mut session = SessionState::new("me", CaseMapping::Rfc1459);
        session.ensure_channel("#Rust").topic = Some("hi".to_string());

        let snapshot = session.snapshot(ConnectionState::Connected);
        assert_eq!(snapshot.nick, "me");
        assert_eq!(snapshot.connection, ConnectionState::Connected);
        assert_eq!(
            snapshot.channel("#rust").and_then(|c| c.topic.as_deref()),
            Some("hi")
        );
    }
}
