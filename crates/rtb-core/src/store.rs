//! Subscription persistence port, plus an in-memory implementation.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, FeedId, Subscription},
    Result,
};

/// Port over subscription persistence.
///
/// The dispatcher assumes `delete` and `migrate` are idempotent and that the
/// store serializes conflicting mutations; two deliveries racing to recover
/// the same destination must not corrupt state.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Ordered snapshot of a feed's subscribers.
    async fn subscribers_of(&self, feed_id: FeedId) -> Result<Vec<Subscription>>;

    /// Remove every subscription owned by `chat_id`.
    async fn delete_subscriptions(&self, chat_id: ChatId) -> Result<()>;

    /// Rewrite every subscription owned by `from` to `to`.
    async fn migrate_subscriptions(&self, from: ChatId, to: ChatId) -> Result<()>;

    /// Whether any subscription is keyed on `chat_id`.
    async fn has_subscriptions(&self, chat_id: ChatId) -> Result<bool>;
}

/// In-memory store, used by tests and one-shot broadcasts.
#[derive(Default)]
pub struct MemoryStore {
    subs: Mutex<Vec<Subscription>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, feed_id: FeedId, chat_id: ChatId) {
        let mut subs = self.subs.lock().await;
        let sub = Subscription { feed_id, chat_id };
        if !subs.contains(&sub) {
            subs.push(sub);
        }
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn subscribers_of(&self, feed_id: FeedId) -> Result<Vec<Subscription>> {
        let subs = self.subs.lock().await;
        Ok(subs.iter().filter(|s| s.feed_id == feed_id).copied().collect())
    }

    async fn delete_subscriptions(&self, chat_id: ChatId) -> Result<()> {
        self.subs.lock().await.retain(|s| s.chat_id != chat_id);
        Ok(())
    }

    async fn migrate_subscriptions(&self, from: ChatId, to: ChatId) -> Result<()> {
        for sub in self.subs.lock().await.iter_mut() {
            if sub.chat_id == from {
                sub.chat_id = to;
            }
        }
        Ok(())
    }

    async fn has_subscriptions(&self, chat_id: ChatId) -> Result<bool> {
        let subs = self.subs.lock().await;
        Ok(subs.iter().any(|s| s.chat_id == chat_id))
    }
}
