//! Broadcast delivery: fan a feed update out to every subscriber through the
//! gateway, classifying failures and self-healing subscription state.

use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet, time::timeout};
use tracing::{debug, error, info, warn};

use crate::{
    classify::{Classifier, RecoveryAction},
    compose::compose,
    config::Config,
    domain::{ChatId, Feed, FeedUpdate, Subscription},
    gateway::{
        port::{BroadcastGateway, SendOutcome},
        types::Rejection,
    },
    store::SubscriberStore,
};

/// The core orchestrator.
///
/// `dispatch` is best-effort: rejections are classified and recovered from
/// locally, per subscriber, and nothing is surfaced to the caller beyond
/// operator logs. Subscribers that turn out to be unreachable silently stop
/// receiving updates; that is the intended self-healing outcome.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    store: Arc<dyn SubscriberStore>,
    gateway: Arc<dyn BroadcastGateway>,
    classifier: Classifier,
    send_timeout: std::time::Duration,
    permits: Semaphore,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        gateway: Arc<dyn BroadcastGateway>,
        cfg: &Config,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                classifier: Classifier::new(store.clone(), cfg.delete_on_failed_delivery),
                store,
                gateway,
                send_timeout: cfg.send_timeout,
                permits: Semaphore::new(cfg.max_concurrent_deliveries),
            }),
        }
    }

    /// Deliver one feed update to every current subscriber of the feed.
    ///
    /// Subscribers are snapshotted up front: additions and removals that
    /// happen mid-dispatch are not retroactively included or excluded.
    /// Deliveries run concurrently across subscribers (bounded by
    /// `max_concurrent_deliveries`), strictly sequentially within one
    /// subscriber's payload sequence, and this call returns only after every
    /// delivery, including resends, has finished.
    pub async fn dispatch(&self, feed: &Feed, update: &FeedUpdate) {
        if let FeedUpdate::Items(items) = update {
            if items.is_empty() {
                warn!(feed_id = feed.id.0, "skipping feed update with no items");
                return;
            }
        }

        let subscribers = match self.inner.store.subscribers_of(feed.id).await {
            Ok(subs) => subs,
            Err(e) => {
                error!(feed_id = feed.id.0, "failed to load subscribers: {e}");
                return;
            }
        };
        if subscribers.is_empty() {
            debug!(feed_id = feed.id.0, "no subscribers for feed update");
            return;
        }

        // Payloads are identical for every subscriber; compose once.
        let payloads = Arc::new(compose(feed, update));
        info!(
            feed_id = feed.id.0,
            subscribers = subscribers.len(),
            payloads = payloads.len(),
            "broadcasting feed update"
        );

        let mut deliveries = JoinSet::new();
        for sub in subscribers {
            let inner = self.inner.clone();
            let payloads = payloads.clone();
            deliveries.spawn(async move {
                let _permit = match inner.permits.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return, // semaphore is never closed
                };
                inner.deliver(sub, &payloads).await;
            });
        }

        // One subscriber's failure (or panic) must not abort the others.
        while let Some(res) = deliveries.join_next().await {
            if let Err(e) = res {
                error!("delivery task failed: {e}");
            }
        }
    }
}

impl DispatcherInner {
    /// Deliver the payload sequence to one subscriber.
    ///
    /// The destination is mutable: a migration discovered mid-sequence
    /// redirects the remaining payloads to the upgraded chat id.
    async fn deliver(&self, sub: Subscription, payloads: &[String]) {
        let mut dest = sub.chat_id;

        for payload in payloads {
            let rejection = match self.send(dest, payload).await {
                Ok(()) => continue,
                Err(rejection) => rejection,
            };
            warn!(
                chat_id = dest.0,
                code = ?rejection.code,
                "send rejected: {}",
                rejection.description
            );

            let action = match self.classifier.classify(&rejection, dest).await {
                Ok(action) => action,
                Err(e) => {
                    error!(chat_id = dest.0, "classification failed: {e}");
                    RecoveryAction::None
                }
            };

            match action {
                RecoveryAction::None => {}
                RecoveryAction::DeleteSubscriptions(chat) => {
                    warn!(chat_id = chat.0, "recipient unreachable, deleting its subscriptions");
                    self.delete(chat).await;
                    // The destination is gone; the rest of the sequence
                    // cannot be delivered.
                    return;
                }
                RecoveryAction::DeleteStaleDuplicate(chat) => {
                    warn!(
                        chat_id = chat.0,
                        "migration target already subscribed, dropping stale subscriptions"
                    );
                    self.delete(chat).await;
                    return;
                }
                RecoveryAction::MigrateAndResend { from, to } => {
                    info!(from = from.0, to = to.0, "chat upgraded, migrating subscriptions");
                    if let Err(e) = self.store.migrate_subscriptions(from, to).await {
                        error!(from = from.0, to = to.0, "failed to migrate subscriptions: {e}");
                    }
                    // Resend the payload that just failed. A resend's own
                    // failure is terminal: logged, never reclassified.
                    if let Err(r) = self.send(to, payload).await {
                        warn!(chat_id = to.0, "resend after migration rejected: {}", r.description);
                    }
                    // The remaining payloads follow the chat to its new id.
                    dest = to;
                }
            }
        }
    }

    async fn send(&self, chat_id: ChatId, html: &str) -> SendOutcome {
        match timeout(self.send_timeout, self.gateway.send_html(chat_id, html)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Rejection::unclassified("send timed out")),
        }
    }

    async fn delete(&self, chat_id: ChatId) {
        if let Err(e) = self.store.delete_subscriptions(chat_id).await {
            error!(chat_id = chat_id.0, "failed to delete subscriptions: {e}");
        }
    }
}
