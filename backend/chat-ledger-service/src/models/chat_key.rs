use serde::{Deserialize, Serialize};
use std::fmt;

/// Joins the two participant ids. Participant ids are expected not to contain it.
pub const CHAT_KEY_SEPARATOR: char = '-';

/// Canonical, order-independent identifier of a two-party conversation.
///
/// `ChatKey::derive("Bob", "Alice")` and `ChatKey::derive("Alice", "Bob")` both
/// yield `"Alice-Bob"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatKey(String);

impl ChatKey {
    /// Sort the ids by byte order and join them with [`CHAT_KEY_SEPARATOR`].
    pub fn derive(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };

        let mut key = String::with_capacity(first.len() + second.len() + 1);
        key.push_str(first);
        key.push(CHAT_KEY_SEPARATOR);
        key.push_str(second);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChatKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for ChatKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
