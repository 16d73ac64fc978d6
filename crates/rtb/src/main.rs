use std::sync::Arc;

use serde::Deserialize;
use teloxide::Bot;

use rtb_core::{
    config::Config,
    dispatch::Dispatcher,
    domain::{ChatId, Feed, FeedUpdate},
    gateway::{port::BroadcastGateway, throttled::ThrottledGateway},
    store::MemoryStore,
    Error,
};
use rtb_telegram::TelegramGateway;

/// One feed-update event: what the upstream scheduler hands to `dispatch`,
/// made loadable from a file for one-shot broadcasts. Persistent stores are
/// an integration concern behind the `SubscriberStore` port.
#[derive(Debug, Deserialize)]
struct BroadcastEvent {
    feed: Feed,
    update: FeedUpdate,
    subscribers: Vec<ChatId>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    rtb_core::logging::init("rtb")?;

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| Error::Config("usage: rtb <event.json>".to_string()))?;
    let raw = std::fs::read_to_string(&path)?;
    let event: BroadcastEvent = serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("invalid event file {path}: {e}")))?;

    let cfg = Config::load();

    let store = Arc::new(MemoryStore::new());
    for chat_id in &event.subscribers {
        store.subscribe(event.feed.id, *chat_id).await;
    }

    // Bot token comes from TELOXIDE_TOKEN.
    let gateway: Arc<dyn BroadcastGateway> = Arc::new(ThrottledGateway::new(
        Arc::new(TelegramGateway::new(Bot::from_env())),
        cfg.throttle(),
    ));

    let dispatcher = Dispatcher::new(store, gateway, &cfg);
    dispatcher.dispatch(&event.feed, &event.update).await;

    Ok(())
}
