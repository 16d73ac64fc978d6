use async_trait::async_trait;

use crate::{domain::ChatId, gateway::types::Rejection};

/// Per-attempt outcome: success, or a structured rejection.
pub type SendOutcome = std::result::Result<(), Rejection>;

/// Outbound messaging port.
///
/// Telegram is the first implementation; payloads are HTML restricted to the
/// `<b>`/`<a>` tag subset and implementations must disable link previews.
#[async_trait]
pub trait BroadcastGateway: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> SendOutcome;
}
