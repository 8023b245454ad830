//! Per-session transcripts.
//!
//! The outer map lock is held only long enough to find or create an entry;
//! appends and snapshots then go through the entry's own lock, so traffic on
//! one session never waits on another.

use crate::domain::{SessionId, Turn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, info};

struct SessionLog {
    turns: Vec<Turn>,
    last_active: Instant,
}

struct SessionEntry {
    log: Mutex<SessionLog>,
    run_lock: Arc<Mutex<()>>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            log: Mutex::new(SessionLog {
                turns: Vec::new(),
                last_active: Instant::now(),
            }),
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Held for the duration of one orchestration on a session.
pub struct SessionGuard {
    _guard: OwnedMutexGuard<()>,
}

#[derive(Default)]
pub struct ConversationStore {
    sessions: Mutex<HashMap<SessionId, Arc<SessionEntry>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, session: &SessionId) -> Arc<SessionEntry> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(
            sessions
                .entry(session.clone())
                .or_insert_with(|| Arc::new(SessionEntry::new())),
        )
    }

    async fn existing(&self, session: &SessionId) -> Option<Arc<SessionEntry>> {
        self.sessions.lock().await.get(session).cloned()
    }

    /// Appends one turn, creating the session on first use.
    pub async fn append(&self, session: &SessionId, turn: Turn) {
        let entry = self.entry(session).await;
        let mut log = entry.log.lock().await;
        debug!(
            session_id = %session,
            role = turn.role.as_str(),
            position = log.turns.len(),
            "Appending turn"
        );
        log.turns.push(turn);
        log.last_active = Instant::now();
    }

    /// Snapshot copy; empty for unknown sessions.
    pub async fn transcript(&self, session: &SessionId) -> Vec<Turn> {
        match self.existing(session).await {
            Some(entry) => entry.log.lock().await.turns.clone(),
            None => Vec::new(),
        }
    }

    pub async fn contains(&self, session: &SessionId) -> bool {
        self.sessions.lock().await.contains_key(session)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Waits until no other orchestration runs on `session`.
    pub async fn lock_session(&self, session: &SessionId) -> SessionGuard {
        let entry = self.entry(session).await;
        self.lock_entry(session, entry).await
    }

    /// Locks `entry`, retrying on the live entry if eviction replaced it while
    /// this caller was waiting. A held run lock keeps the entry in the map.
    async fn lock_entry(&self, session: &SessionId, mut entry: Arc<SessionEntry>) -> SessionGuard {
        loop {
            let guard = Arc::clone(&entry.run_lock).lock_owned().await;
            let live = self.entry(session).await;
            if Arc::ptr_eq(&entry, &live) {
                return SessionGuard { _guard: guard };
            }
            debug!(session_id = %session, "Session evicted before its run lock was taken; retrying");
            entry = live;
        }
    }

    /// Drops sessions idle for longer than `ttl`. Sessions with a running
    /// orchestration are kept. Returns the number removed.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let mut expired = Vec::new();
        for (id, entry) in sessions.iter() {
            if entry.run_lock.try_lock().is_err() {
                continue;
            }
            let Ok(log) = entry.log.try_lock() else {
                continue;
            };
            if now.duration_since(log.last_active) > ttl {
                expired.push(id.clone());
            }
        }
        for id in &expired {
            sessions.remove(id);
        }
        if !expired.is_empty() {
            info!(
                evicted = expired.len(),
                remaining = sessions.len(),
                "Evicted idle sessions"
            );
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TurnRole;

    fn sid(raw: &str) -> SessionId {
        SessionId::parse(raw).expect("valid session id")
    }

    #[tokio::test]
    async fn interleaved_appends_keep_per_session_order() {
        let store = ConversationStore::new();
        let sessions = [sid("alpha"), sid("beta"), sid("gamma")];
        for n in 0..20 {
            for session in &sessions {
                store
                    .append(session, Turn::user(format!("{session}-{n}")))
                    .await;
            }
        }
        for session in &sessions {
            let transcript = store.transcript(session).await;
            assert_eq!(transcript.len(), 20);
            for (n, turn) in transcript.iter().enumerate() {
                assert_eq!(turn.text, format!("{session}-{n}"));
                assert_eq!(turn.role, TurnRole::User);
            }
        }
        assert_eq!(store.session_count().await, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_isolated_and_ordered() {
        let store = Arc::new(ConversationStore::new());
        let mut handles = Vec::new();
        for s in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let session = sid(&format!("session-{s}"));
                for n in 0..50 {
                    store.append(&session, Turn::assistant(n.to_string())).await;
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.expect("append task");
        }
        for s in 0..8 {
            let transcript = store.transcript(&sid(&format!("session-{s}"))).await;
            let texts: Vec<String> = transcript.into_iter().map(|turn| turn.text).collect();
            let expected: Vec<String> = (0..50).map(|n: i32| n.to_string()).collect();
            assert_eq!(texts, expected);
        }
    }

    #[tokio::test]
    async fn transcripts_are_snapshots() {
        let store = ConversationStore::new();
        let session = sid("snap");
        store.append(&session, Turn::user("first")).await;
        let snapshot = store.transcript(&session).await;
        store.append(&session, Turn::assistant("second")).await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.transcript(&session).await.len(), 2);
        assert!(store.transcript(&sid("unknown")).await.is_empty());
        assert!(!store.contains(&sid("unknown")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_evicted_whole() {
        let store = ConversationStore::new();
        let stale = sid("stale");
        let fresh = sid("fresh");
        store.append(&stale, Turn::user("old")).await;
        tokio::time::advance(Duration::from_secs(120)).await;
        store.append(&fresh, Turn::user("new")).await;

        let removed = store.evict_idle(Duration::from_secs(60)).await;
        assert_eq!(removed, 1);
        assert!(!store.contains(&stale).await);
        assert_eq!(store.transcript(&fresh).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn running_sessions_survive_eviction() {
        let store = ConversationStore::new();
        let busy = sid("busy");
        store.append(&busy, Turn::user("hello")).await;
        let guard = store.lock_session(&busy).await;
        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(store.evict_idle(Duration::from_secs(60)).await, 0);
        drop(guard);
        assert_eq!(store.evict_idle(Duration::from_secs(60)).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lock_taken_after_eviction_binds_the_live_entry() {
        let store = ConversationStore::new();
        let session = sid("raced");
        store.append(&session, Turn::user("hello")).await;
        let stale = store.entry(&session).await;
        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(store.evict_idle(Duration::from_secs(60)).await, 1);

        let _guard = store.lock_entry(&session, stale).await;
        assert!(store.contains(&session).await);
        let second =
            tokio::time::timeout(Duration::from_millis(50), store.lock_session(&session)).await;
        assert!(second.is_err(), "second run on the same session was not serialized");
        assert_eq!(store.evict_idle(Duration::from_secs(0)).await, 0);
    }

    #[tokio::test]
    async fn session_lock_serializes_holders() {
        let store = Arc::new(ConversationStore::new());
        let session = sid("serial");
        let first = store.lock_session(&session).await;

        let waiter = {
            let store = Arc::clone(&store);
            let session = session.clone();
            tokio::spawn(async move {
                let _second = store.lock_session(&session).await;
                store.append(&session, Turn::user("second")).await;
            })
        };
        tokio::task::yield_now().await;
        store.append(&session, Turn::user("first")).await;
        drop(first);
        waiter.await.expect("waiter");

        let texts: Vec<String> = store
            .transcript(&session)
            .await
            .into_iter()
            .map(|turn| turn.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
