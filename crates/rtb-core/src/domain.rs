use serde::{Deserialize, Serialize};

/// Telegram chat id (numeric).
///
/// This is the destination id subscriptions are keyed on; it changes when a
/// group chat is upgraded to a supergroup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Feed id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedId(pub i64);

/// A feed being broadcast. Immutable for the duration of a dispatch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feed {
    pub id: FeedId,
    pub title: String,
}

/// One entry of a feed, as handed over by the upstream fetcher.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub content: String,
    pub link: String,
}

/// An active (feed, destination) pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub feed_id: FeedId,
    pub chat_id: ChatId,
}

/// One feed-update event: either a plain announcement or a batch of new
/// items. The upstream scheduler produces exactly one of these per event.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedUpdate {
    /// Sent verbatim as a single payload.
    Announcement(String),
    /// Itemized or collapsed into a digest, depending on count.
    Items(Vec<FeedItem>),
}
