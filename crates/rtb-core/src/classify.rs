//! Rejection classification: maps a structured gateway rejection to the
//! recovery action that keeps subscription state healthy.

use std::sync::Arc;

use crate::{
    domain::ChatId,
    gateway::types::{Rejection, RejectionCode},
    store::SubscriberStore,
    Result,
};

/// What the dispatcher should do about one failed send.
///
/// Group-chat upgrades change the external chat id; the migrate/dedupe split
/// keeps exactly one live subscription record per logical chat, never
/// duplicating or orphaning it. Actions are derived per failure and never
/// persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Log only; no state change, no resend.
    None,
    /// The recipient is gone; drop all of its subscriptions.
    DeleteSubscriptions(ChatId),
    /// Rewrite subscriptions from the old chat id to the new one and resend
    /// the in-flight payload there.
    MigrateAndResend { from: ChatId, to: ChatId },
    /// The migration target is already tracked; drop the stale old record
    /// instead of creating duplicates.
    DeleteStaleDuplicate(ChatId),
}

pub struct Classifier {
    store: Arc<dyn SubscriberStore>,
    delete_on_unreachable: bool,
}

impl Classifier {
    pub fn new(store: Arc<dyn SubscriberStore>, delete_on_unreachable: bool) -> Self {
        Self {
            store,
            delete_on_unreachable,
        }
    }

    /// Classify one rejection for the destination that produced it.
    ///
    /// Read-only: the single `has_subscriptions` lookup decides
    /// migrate-vs-dedupe. Applying the action (deletes, migration, resend)
    /// is the dispatcher's job, so classification stays idempotent for a
    /// fixed store state.
    pub async fn classify(&self, rejection: &Rejection, failed: ChatId) -> Result<RecoveryAction> {
        match rejection.code {
            RejectionCode::ChatNotFound | RejectionCode::BotBlocked | RejectionCode::BotKicked => {
                if self.delete_on_unreachable {
                    Ok(RecoveryAction::DeleteSubscriptions(failed))
                } else {
                    Ok(RecoveryAction::None)
                }
            }
            // Migration handling is unconditional: skipping it would orphan
            // the subscription on a chat id that no longer accepts sends.
            RejectionCode::ChatMigrated { to } => {
                if self.store.has_subscriptions(to).await? {
                    Ok(RecoveryAction::DeleteStaleDuplicate(failed))
                } else {
                    Ok(RecoveryAction::MigrateAndResend { from: failed, to })
                }
            }
            RejectionCode::Unclassified => Ok(RecoveryAction::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::FeedId, store::MemoryStore};

    fn blocked() -> Rejection {
        Rejection::new(RejectionCode::BotBlocked, "Forbidden: bot was blocked by the user")
    }

    fn migrated(to: i64) -> Rejection {
        Rejection::new(
            RejectionCode::ChatMigrated { to: ChatId(to) },
            "Bad Request: group chat was upgraded to a supergroup chat",
        )
    }

    #[tokio::test]
    async fn unreachable_recipient_deletes_when_cleanup_enabled() {
        let store = Arc::new(MemoryStore::new());
        let classifier = Classifier::new(store, true);

        for code in [
            RejectionCode::ChatNotFound,
            RejectionCode::BotBlocked,
            RejectionCode::BotKicked,
        ] {
            let action = classifier
                .classify(&Rejection::new(code, "gone"), ChatId(10))
                .await
                .unwrap();
            assert_eq!(action, RecoveryAction::DeleteSubscriptions(ChatId(10)));
        }
    }

    #[tokio::test]
    async fn cleanup_toggle_suppresses_deletion() {
        let store = Arc::new(MemoryStore::new());
        let classifier = Classifier::new(store, false);

        let action = classifier.classify(&blocked(), ChatId(10)).await.unwrap();
        assert_eq!(action, RecoveryAction::None);
    }

    #[tokio::test]
    async fn migration_to_untracked_chat_migrates_and_resends() {
        let store = Arc::new(MemoryStore::new());
        store.subscribe(FeedId(1), ChatId(100)).await;
        let classifier = Classifier::new(store, true);

        let action = classifier.classify(&migrated(200), ChatId(100)).await.unwrap();
        assert_eq!(
            action,
            RecoveryAction::MigrateAndResend {
                from: ChatId(100),
                to: ChatId(200),
            }
        );
    }

    #[tokio::test]
    async fn migration_to_tracked_chat_drops_the_stale_record() {
        let store = Arc::new(MemoryStore::new());
        store.subscribe(FeedId(1), ChatId(100)).await;
        store.subscribe(FeedId(2), ChatId(200)).await;
        let classifier = Classifier::new(store, true);

        let action = classifier.classify(&migrated(200), ChatId(100)).await.unwrap();
        assert_eq!(action, RecoveryAction::DeleteStaleDuplicate(ChatId(100)));
    }

    #[tokio::test]
    async fn migration_branch_ignores_the_cleanup_toggle() {
        let store = Arc::new(MemoryStore::new());
        let classifier = Classifier::new(store, false);

        let action = classifier.classify(&migrated(200), ChatId(100)).await.unwrap();
        assert_eq!(
            action,
            RecoveryAction::MigrateAndResend {
                from: ChatId(100),
                to: ChatId(200),
            }
        );
    }

    #[tokio::test]
    async fn unclassified_rejections_are_log_only() {
        let store = Arc::new(MemoryStore::new());
        let classifier = Classifier::new(store, true);

        let action = classifier
            .classify(&Rejection::unclassified("send timed out"), ChatId(10))
            .await
            .unwrap();
        assert_eq!(action, RecoveryAction::None);
    }

    #[tokio::test]
    async fn classification_is_idempotent_for_a_fixed_store_state() {
        let store = Arc::new(MemoryStore::new());
        store.subscribe(FeedId(2), ChatId(200)).await;
        let classifier = Classifier::new(store, true);

        let first = classifier.classify(&migrated(200), ChatId(100)).await.unwrap();
        let second = classifier.classify(&migrated(200), ChatId(100)).await.unwrap();
        assert_eq!(first, second);
    }
}
