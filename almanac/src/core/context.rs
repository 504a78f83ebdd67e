//! Per-user message buffer with idle expiry.
//!
//! Time is always passed in, so the store stays deterministic; callers decide
//! when to [`ContextStore::sweep`].

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

/// Header placed before buffered messages in [`ContextStore::history`].
pub const HISTORY_HEADER: &str = "Here are the previous message:\n";

#[derive(Debug, Clone, PartialEq, Eq)]
struct UserContext {
    messages: Vec<String>,
    last_touched: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ContextStore {
    expiry: TimeDelta,
    users: BTreeMap<String, UserContext>,
}

impl ContextStore {
    pub fn new(expiry: TimeDelta) -> Self {
        Self {
            expiry,
            users: BTreeMap::new(),
        }
    }

    /// Buffer `text` for `user_id` and mark the user active at `now`.
    ///
    /// Empty text and `/commands` are ignored; returns whether the message was stored.
    pub fn record(&mut self, user_id: &str, text: &str, now: DateTime<Utc>) -> bool {
        if text.is_empty() || text.starts_with('/') {
            return false;
        }
        let entry = self
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| UserContext {
                messages: Vec::new(),
                last_touched: now,
            });
        entry.messages.push(format!("User: {text}"));
        entry.last_touched = now;
        true
    }

    /// Buffered messages for `user_id`, prefixed by [`HISTORY_HEADER`].
    pub fn history(&self, user_id: &str) -> Option<String> {
        let context = self.users.get(user_id)?;
        Some(format!("{HISTORY_HEADER}{}", context.messages.join("\n")))
    }

    /// Remove users idle for longer than the expiry; returns their ids in order.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let expired: Vec<String> = self
            .users
            .iter()
            .filter(|(_, context)| now - context.last_touched > self.expiry)
            .map(|(user_id, _)| user_id.clone())
            .collect();
        for user_id in &expired {
            self.users.remove(user_id);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
