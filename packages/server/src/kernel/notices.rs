//! Timed notices with cancellable auto-dismiss.
//!
//! Every posted notice owns a timer task that removes it once its TTL runs
//! out. Dismissing a notice aborts its timer, and dropping the last handle to
//! the board aborts every timer still pending, so no timer ever acts on a
//! board that is gone.
//!
//! Notices are scoped to the user they were posted for.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::AbortHandle;

use crate::common::{NoticeId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: NoticeId,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

struct NoticeEntry {
    notice: Notice,
    timer: AbortHandle,
}

#[derive(Default)]
struct BoardState {
    by_user: HashMap<UserId, Vec<NoticeEntry>>,
}

impl BoardState {
    fn remove(&mut self, user_id: UserId, notice_id: NoticeId) -> Option<NoticeEntry> {
        let entries = self.by_user.get_mut(&user_id)?;
        let position = entries.iter().position(|e| e.notice.id == notice_id)?;
        let entry = entries.remove(position);
        if entries.is_empty() {
            self.by_user.remove(&user_id);
        }
        Some(entry)
    }
}

impl Drop for BoardState {
    fn drop(&mut self) {
        for entry in self.by_user.values().flatten() {
            entry.timer.abort();
        }
    }
}

/// Cloneable handle to the shared board.
#[derive(Clone)]
pub struct NoticeBoard {
    state: Arc<RwLock<BoardState>>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(BoardState::default())),
            ttl,
        }
    }

    /// Post a notice that dismisses itself after the board's TTL.
    pub async fn post(&self, user_id: UserId, level: NoticeLevel, message: impl Into<String>) -> Notice {
        let now = Utc::now();
        let notice = Notice {
            id: NoticeId::new(),
            level,
            message: message.into(),
            created_at: now,
            expires_at: now + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero()),
        };

        // Held across spawn + insert so the timer cannot run before the entry exists.
        let mut state = self.state.write().await;
        let timer = tokio::spawn(expire(
            Arc::downgrade(&self.state),
            user_id,
            notice.id,
            self.ttl,
        ))
        .abort_handle();

        state.by_user.entry(user_id).or_default().push(NoticeEntry {
            notice: notice.clone(),
            timer,
        });

        tracing::debug!(user_id = %user_id, notice_id = %notice.id, "Notice posted");
        notice
    }

    /// Current notices for a user, oldest first.
    pub async fn list(&self, user_id: UserId) -> Vec<Notice> {
        let state = self.state.read().await;
        state
            .by_user
            .get(&user_id)
            .map(|entries| entries.iter().map(|e| e.notice.clone()).collect())
            .unwrap_or_default()
    }

    /// Explicit dismiss. Cancels the timer. Returns false if already gone.
    pub async fn dismiss(&self, user_id: UserId, notice_id: NoticeId) -> bool {
        let mut state = self.state.write().await;
        match state.remove(user_id, notice_id) {
            Some(entry) => {
                entry.timer.abort();
                true
            }
            None => false,
        }
    }

    /// Drop every notice for a user (sign-out).
    pub async fn clear(&self, user_id: UserId) {
        let mut state = self.state.write().await;
        if let Some(entries) = state.by_user.remove(&user_id) {
            for entry in entries {
                entry.timer.abort();
            }
        }
    }
}

async fn expire(state: Weak<RwLock<BoardState>>, user_id: UserId, notice_id: NoticeId, ttl: Duration) {
    tokio::time::sleep(ttl).await;

    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.write().await;
    if state.remove(user_id, notice_id).is_some() {
        tracing::debug!(user_id = %user_id, notice_id = %notice_id, "Notice expired");
    }
}
