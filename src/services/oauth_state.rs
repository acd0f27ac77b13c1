//! Pending OAuth2 `state` tokens.
//!
//! A state is issued when an authorization URL is handed out and must come
//! back, unexpired, on the validation callback. Each state is bound to the
//! provider it was issued for and can be consumed exactly once.
//!
//! Issuing is unauthenticated, so the number of pending states is capped: once
//! full, the oldest pending state is dropped to make room.

use std::{collections::HashMap, time::Duration};
use tokio::{sync::Mutex, time::Instant};
use uuid::Uuid;

struct PendingState {
    provider: String,
    issued_at: Instant,
}

pub const DEFAULT_MAX_PENDING: usize = 10_000;

pub struct OAuthStateStore {
    ttl: Duration,
    max_pending: usize,
    pending: Mutex<HashMap<String, PendingState>>,
}

impl OAuthStateStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_limit(ttl, DEFAULT_MAX_PENDING)
    }

    pub fn with_limit(ttl: Duration, max_pending: usize) -> Self {
        Self {
            ttl,
            max_pending: max_pending.max(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh state bound to `provider`. Expired entries are pruned.
    pub async fn issue(&self, provider: &str) -> String {
        let state = Uuid::new_v4().simple().to_string();
        let now = Instant::now();

        let mut pending = self.pending.lock().await;
        pending.retain(|_, entry| now.duration_since(entry.issued_at) < self.ttl);
        while pending.len() >= self.max_pending {
            let Some(oldest) = pending
                .iter()
                .min_by_key(|(_, entry)| entry.issued_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            tracing::warn!("pending oauth states at limit {}, dropping oldest", self.max_pending);
            pending.remove(&oldest);
        }
        pending.insert(
            state.clone(),
            PendingState {
                provider: provider.to_string(),
                issued_at: now,
            },
        );
        state
    }

    /// Consume `state`, returning the provider it was issued for.
    ///
    /// Returns `None` for unknown, already consumed or expired states.
    pub async fn consume(&self, state: &str) -> Option<String> {
        let entry = self.pending.lock().await.remove(state)?;
        if entry.issued_at.elapsed() >= self.ttl {
            tracing::debug!("oauth state for `{}` expired", entry.provider);
            return None;
        }
        Some(entry.provider)
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }
}
