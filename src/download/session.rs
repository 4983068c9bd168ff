//! Per-user pending link store
//!
//! One slot per user. A new link replaces an unconsumed one, but once a mode
//! has been picked the slot is locked until the job reaches a terminal state
//! and removes it. `DashMap` shards the locking, so a handler only ever holds
//! the lock for its own user's entry and never across an `.await`.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use teloxide::types::UserId;
use thiserror::Error;

#[derive(Debug, Clone)]
struct Session {
    url: String,
    in_flight: bool,
}

/// Why a job could not be started for a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Mode selected with no link on record
    #[error("no pending link for user")]
    MissingSession,
    /// A job for this user's link is already running
    #[error("a download is already in progress for user")]
    JobInFlight,
}

/// Result of storing a submitted link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// First pending link for the user
    Stored,
    /// An unconsumed link was overwritten
    Replaced,
    /// Rejected: a job for the previous link is still running
    Busy,
}

/// Process-wide mapping from user to their most recent pending link.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `url` for `user`, last write wins until a job starts.
    pub fn put(&self, user: UserId, url: String) -> PutOutcome {
        match self.sessions.entry(user) {
            Entry::Occupied(mut entry) => {
                if entry.get().in_flight {
                    return PutOutcome::Busy;
                }
                entry.get_mut().url = url;
                PutOutcome::Replaced
            }
            Entry::Vacant(entry) => {
                entry.insert(Session { url, in_flight: false });
                PutOutcome::Stored
            }
        }
    }

    /// Reads the pending link and marks a job as running for `user`.
    ///
    /// The entry stays in the store until [`SessionStore::remove`] is called
    /// at job end.
    pub fn begin(&self, user: UserId) -> Result<String, SessionError> {
        let mut session = self.sessions.get_mut(&user).ok_or(SessionError::MissingSession)?;
        if session.in_flight {
            return Err(SessionError::JobInFlight);
        }
        session.in_flight = true;
        Ok(session.url.clone())
    }

    /// Removes the entry for `user`. Removing an absent entry is a no-op.
    pub fn remove(&self, user: UserId) -> Option<String> {
        self.sessions.remove(&user).map(|(_, session)| session.url)
    }

    pub fn get(&self, user: UserId) -> Option<String> {
        self.sessions.get(&user).map(|session| session.url.clone())
    }

    pub fn is_in_flight(&self, user: UserId) -> bool {
        self.sessions.get(&user).map(|session| session.in_flight).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_put_then_begin() {
        let store = SessionStore::new();
        assert_eq!(store.put(UserId(1), "https://a".into()), PutOutcome::Stored);
        assert_eq!(store.begin(UserId(1)).unwrap(), "https://a");
        // entry lives until the job removes it
        assert_eq!(store.get(UserId(1)).as_deref(), Some("https://a"));
        assert!(store.is_in_flight(UserId(1)));
    }

    #[test]
    fn test_last_write_wins_before_job_starts() {
        let store = SessionStore::new();
        store.put(UserId(1), "https://first".into());
        assert_eq!(store.put(UserId(1), "https://second".into()), PutOutcome::Replaced);
        assert_eq!(store.begin(UserId(1)).unwrap(), "https://second");
    }

    #[test]
    fn test_begin_without_link_is_missing_session() {
        let store = SessionStore::new();
        assert_eq!(store.begin(UserId(9)), Err(SessionError::MissingSession));
    }

    #[test]
    fn test_put_rejected_while_job_in_flight() {
        let store = SessionStore::new();
        store.put(UserId(1), "https://first".into());
        store.begin(UserId(1)).unwrap();

        assert_eq!(store.put(UserId(1), "https://second".into()), PutOutcome::Busy);
        assert_eq!(store.get(UserId(1)).as_deref(), Some("https://first"));
        assert_eq!(store.begin(UserId(1)), Err(SessionError::JobInFlight));
    }

    #[test]
    fn test_remove_is_idempotent_and_unlocks() {
        let store = SessionStore::new();
        store.put(UserId(1), "https://a".into());
        store.begin(UserId(1)).unwrap();

        assert_eq!(store.remove(UserId(1)).as_deref(), Some("https://a"));
        assert_eq!(store.remove(UserId(1)), None);
        assert!(store.is_empty());
        assert_eq!(store.put(UserId(1), "https://b".into()), PutOutcome::Stored);
    }

    #[test]
    fn test_users_are_independent() {
        let store = SessionStore::new();
        store.put(UserId(1), "https://a".into());
        store.put(UserId(2), "https://b".into());
        store.begin(UserId(1)).unwrap();

        assert!(!store.is_in_flight(UserId(2)));
        assert_eq!(store.begin(UserId(2)).unwrap(), "https://b");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_concurrent_begin_admits_one_job() {
        let store = Arc::new(SessionStore::new());
        store.put(UserId(1), "https://a".into());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.begin(UserId(1)).is_ok())
            })
            .collect();
        let started = handles.into_iter().filter_map(|h| h.join().ok()).filter(|ok| *ok).count();
        assert_eq!(started, 1);
    }
}
