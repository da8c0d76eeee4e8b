//! Process-lifetime user registry.
//!
//! Users are identified by a random 15-digit session id handed out at sign-up.
//! Credentials are handled elsewhere; the ledger only needs ids and display names.

use crate::models::User;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;

const SESSION_ID_MIN: u64 = 100_000_000_000_000;
const SESSION_ID_MAX: u64 = 999_999_999_999_999;

#[derive(Debug, Default)]
pub struct UserRegistry {
    users: DashMap<String, User>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a display name under a freshly generated, unused session id.
    pub fn sign_up(&self, display_name: &str) -> User {
        loop {
            match self.users.entry(generate_session_id()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let user = User {
                        session_id: slot.key().clone(),
                        display_name: display_name.to_string(),
                    };
                    slot.insert(user.clone());
                    tracing::info!(session_id = %user.session_id, "user signed up");
                    return user;
                }
            }
        }
    }

    pub fn find(&self, session_id: &str) -> Option<User> {
        self.users.get(session_id).map(|user| user.value().clone())
    }

    pub fn delete(&self, session_id: &str) -> bool {
        self.users.remove(session_id).is_some()
    }

    /// Everyone except `session_id`, ordered by display name.
    pub fn contacts_except(&self, session_id: &str) -> Vec<User> {
        let mut contacts: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.key() != session_id)
            .map(|entry| entry.value().clone())
            .collect();

        contacts.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        contacts
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .gen_range(SESSION_ID_MIN..=SESSION_ID_MAX)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_fifteen_digits() {
        for _ in 0..100 {
            let id = generate_session_id();
            assert_eq!(id.len(), 15);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_sign_up_find_delete() {
        let registry = UserRegistry::new();
        let user = registry.sign_up("Alice");

        assert_eq!(registry.find(&user.session_id), Some(user.clone()));
        assert!(registry.delete(&user.session_id));
        assert!(!registry.delete(&user.session_id));
        assert!(registry.find(&user.session_id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sign_up_generates_unique_ids() {
        let registry = UserRegistry::new();
        for _ in 0..200 {
            registry.sign_up("same name");
        }
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn test_contacts_exclude_caller_and_are_sorted() {
        let registry = UserRegistry::new();
        let carol = registry.sign_up("Carol");
        let alice = registry.sign_up("Alice");
        let bob = registry.sign_up("Bob");

        let names: Vec<_> = registry
            .contacts_except(&bob.session_id)
            .into_iter()
            .map(|u| u.display_name)
            .collect();

        assert_eq!(names, vec!["Alice", "Carol"]);
        assert_eq!(registry.contacts_except("unknown").len(), 3);
        assert!(registry.find(&alice.session_id).is_some());
        assert!(registry.find(&carol.session_id).is_some());
    }
}
