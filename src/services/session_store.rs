//! In-memory booking sessions keyed by a per-tab uuid.
//!
//! Async work started for a session (the extras fetch) keeps only a weak
//! handle and the revision it saw. Its result is applied only when the
//! session still exists and no newer load has started since.
//!
//! Sessions idle for longer than the store's ttl are treated as closed.

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::errors::BookingError;
use crate::services::booking_wizard::BookingWizard;

#[derive(Debug)]
pub struct BookingSession {
    pub wizard: BookingWizard,
    /// Bumped whenever a new extras load starts.
    pub revision: u64,
    pub extras_loading: bool,
}

impl BookingSession {
    pub fn new(wizard: BookingWizard) -> Self {
        Self {
            wizard,
            revision: 0,
            extras_loading: false,
        }
    }

    /// Start a new extras load. Results of any load started earlier become
    /// stale, so only the latest one is applied.
    pub fn begin_extras_load(&mut self) -> u64 {
        self.revision += 1;
        self.extras_loading = true;
        self.revision
    }
}

pub type SessionHandle = Arc<Mutex<BookingSession>>;

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

impl SessionEntry {
    fn expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() > ttl
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Expired sessions are swept here, so abandoned tabs do not pile up.
    pub async fn insert(&self, wizard: BookingWizard) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(BookingSession::new(wizard)));
        let mut sessions = self.sessions.write().await;
        let swept = Self::sweep_locked(&mut sessions, self.ttl);
        if swept > 0 {
            debug!("Expired {} idle booking sessions", swept);
        }
        sessions.insert(
            id,
            SessionEntry {
                handle: handle.clone(),
                last_seen: Instant::now(),
            },
        );
        debug!("Opened booking session {}", id);
        (id, handle)
    }

    /// Look up a session and mark it as used. An expired session is dropped
    /// and reported as not found.
    pub async fn get(&self, id: &Uuid) -> Result<SessionHandle, BookingError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id).ok_or(BookingError::SessionNotFound)?;
        if entry.expired(self.ttl) {
            sessions.remove(id);
            debug!("Booking session {} expired", id);
            return Err(BookingError::SessionNotFound);
        }
        entry.last_seen = Instant::now();
        Ok(entry.handle.clone())
    }

    fn sweep_locked(sessions: &mut HashMap<Uuid, SessionEntry>, ttl: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.expired(ttl));
        before - sessions.len()
    }

    pub async fn remove(&self, id: &Uuid) -> Result<(), BookingError> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                debug!("Closed booking session {}", id);
                Ok(())
            }
            None => Err(BookingError::SessionNotFound),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Run `apply` on the session only if it is still alive and still at
/// `revision`. Returns whether the result was applied.
pub async fn apply_if_current<F>(session: &Weak<Mutex<BookingSession>>, revision: u64, apply: F) -> bool
where
    F: FnOnce(&mut BookingSession),
{
    let Some(handle) = session.upgrade() else {
        debug!("Dropping async result for a closed session");
        return false;
    };
    let mut session = handle.lock().await;
    if session.revision != revision {
        debug!(
            "Dropping stale async result (revision {} != {})",
            revision, session.revision
        );
        return false;
    }
    apply(&mut session);
    true
}
