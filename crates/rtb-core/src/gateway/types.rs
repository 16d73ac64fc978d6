use crate::domain::ChatId;

/// Structured rejection returned by a gateway for one send attempt.
///
/// Adapters translate provider-specific error text into a `RejectionCode` at
/// the boundary, so classification never depends on string fixtures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub code: RejectionCode,
    /// Provider description, kept for operator logs only.
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionCode {
    /// The destination chat does not exist anymore (or never did).
    ChatNotFound,
    /// The recipient blocked the bot.
    BotBlocked,
    /// The bot was kicked from the chat.
    BotKicked,
    /// The group chat was upgraded to a supergroup; sends must go to `to`.
    ChatMigrated { to: ChatId },
    /// Anything else: network failures, flood limits, timeouts.
    Unclassified,
}

impl Rejection {
    pub fn new(code: RejectionCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    pub fn unclassified(description: impl Into<String>) -> Self {
        Self::new(RejectionCode::Unclassified, description)
    }
}
