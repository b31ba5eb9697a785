// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-browser session context: selected territory and chat transcript.

use crate::models::{ChatTurn, TerritoryKind};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Bytes of randomness in a session id (hex-encoded to 32 chars).
const SESSION_ID_BYTES: usize = 16;

/// Generate a new random session id.
pub fn new_session_id() -> anyhow::Result<String> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| anyhow::anyhow!("System RNG failure"))?;
    Ok(hex::encode(bytes))
}

/// Whether a cookie value looks like an id we issued.
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == SESSION_ID_BYTES * 2 && id.chars().all(|c| c.is_ascii_hexdigit())
}

/// The territory currently selected in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub kind: TerritoryKind,
    pub code: String,
    pub title: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub selected: Option<Selection>,
    pub transcript: Vec<ChatTurn>,
}

impl SessionContext {
    /// Select a territory. Switching to a different territory clears the chat.
    ///
    /// Returns `true` if the selection changed.
    pub fn select(&mut self, selection: Selection) -> bool {
        let changed = self
            .selected
            .as_ref()
            .map_or(true, |s| s.kind != selection.kind || s.code != selection.code);
        if changed {
            self.transcript.clear();
        }
        self.selected = Some(selection);
        changed
    }
}

/// All live sessions, bounded with oldest-first eviction.
pub struct SessionStore {
    sessions: DashMap<String, SessionContext>,
    order: Mutex<VecDeque<String>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    fn ensure(&self, id: &str) {
        if self.sessions.contains_key(id) {
            return;
        }
        let mut order = self.order.lock().unwrap_or_else(|e| e.into_inner());
        let mut created = false;
        self.sessions.entry(id.to_string()).or_insert_with(|| {
            created = true;
            SessionContext::default()
        });
        if !created {
            return;
        }
        order.push_back(id.to_string());
        while self.sessions.len() > self.max_sessions {
            match order.pop_front() {
                Some(oldest) => {
                    tracing::debug!("Evicting oldest session");
                    self.sessions.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Record the selected territory; clears the transcript on change.
    pub fn select(&self, id: &str, selection: Selection) -> bool {
        self.ensure(id);
        self.sessions
            .get_mut(id)
            .map(|mut ctx| ctx.select(selection))
            .unwrap_or(false)
    }

    pub fn selection(&self, id: &str) -> Option<Selection> {
        self.sessions.get(id).and_then(|ctx| ctx.selected.clone())
    }

    pub fn transcript(&self, id: &str) -> Vec<ChatTurn> {
        self.sessions
            .get(id)
            .map(|ctx| ctx.transcript.clone())
            .unwrap_or_default()
    }

    /// Append turns, but only if `expected` is still the selected territory.
    ///
    /// A chat answer that arrives after the user switched territory is
    /// dropped instead of leaking into the new conversation.
    pub fn append_turns(&self, id: &str, expected: &Selection, turns: Vec<ChatTurn>) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut ctx) if ctx.selected.as_ref() == Some(expected) => {
                ctx.transcript.extend(turns);
                true
            }
            _ => false,
        }
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

    fn selection(code: &str, title: &str) -> Selection {
        Selection {
            kind: TerritoryKind::Commune,
            code: code.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_switching_territory_resets_transcript() {
        let store = SessionStore::new(10);
        let a = selection("27701", "Vernon");
        let b = selection("27229", "Évreux");

        store.select("s1", a.clone());
        assert!(store.append_turns(
            "s1",
            &a,
            vec![ChatTurn::user("q1"), ChatTurn::assistant("r1")]
        ));
        assert!(store.append_turns(
            "s1",
            &a,
            vec![ChatTurn::user("q2"), ChatTurn::assistant("r2")]
        ));
        assert_eq!(store.transcript("s1").len(), 4);

        assert!(store.select("s1", b));
        assert!(store.transcript("s1").is_empty());
    }

    #[test]
    fn test_reselecting_same_territory_keeps_transcript() {
        let store = SessionStore::new(10);
        let a = selection("27701", "Vernon");

        store.select("s1", a.clone());
        store.append_turns("s1", &a, vec![ChatTurn::user("q")]);
        assert!(!store.select("s1", a));
        assert_eq!(store.transcript("s1").len(), 1);
    }

    #[test]
    fn test_stale_answer_is_dropped() {
        let store = SessionStore::new(10);
        let a = selection("27701", "Vernon");
        let b = selection("27229", "Évreux");

        store.select("s1", a.clone());
        store.select("s1", b);
        assert!(!store.append_turns("s1", &a, vec![ChatTurn::user("late")]));
        assert!(store.transcript("s1").is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new(10);
        let a = selection("27701", "Vernon");
        store.select("s1", a.clone());
        store.select("s2", a.clone());
        store.append_turns("s1", &a, vec![ChatTurn::user("q")]);

        assert_eq!(store.transcript("s1").len(), 1);
        assert!(store.transcript("s2").is_empty());
    }

    #[test]
    fn test_oldest_session_evicted() {
        let store = SessionStore::new(2);
        store.select("s1", selection("1", "a"));
        store.select("s2", selection("2", "b"));
        store.select("s3", selection("3", "c"));

        assert_eq!(store.len(), 2);
        assert!(store.selection("s1").is_none());
        assert!(store.selection("s3").is_some());
    }

    #[test]
    fn test_concurrent_first_requests_share_one_context() {
        let store = std::sync::Arc::new(SessionStore::new(10));
        let a = selection("27701", "Vernon");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let a = a.clone();
                std::thread::spawn(move || {
                    store.select("s1", a.clone());
                    assert!(store.append_turns("s1", &a, vec![ChatTurn::user(format!("q{}", i))]));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.transcript("s1").len(), 8);
        assert_eq!(store.order.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_session_ids() {
        let id = new_session_id().unwrap();
        assert!(is_valid_session_id(&id));
        assert_ne!(id, new_session_id().unwrap());
        assert!(!is_valid_session_id("not-a-session"));
    }
}
