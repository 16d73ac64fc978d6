//! Telegram adapter (teloxide).
//!
//! This crate implements the `rtb-core` BroadcastGateway over the Telegram
//! Bot API and translates provider errors into structured rejections at the
//! boundary, so the core never matches on error text.

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode, ApiError, RequestError};

use tokio::time::sleep;

use rtb_core::{
    domain::ChatId,
    gateway::{
        port::{BroadcastGateway, SendOutcome},
        types::{Rejection, RejectionCode},
    },
};

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }
}

/// Translate a provider error into the structured rejection the classifier
/// consumes. The provider description is preserved for operator logs.
fn map_rejection(e: RequestError) -> Rejection {
    let code = match &e {
        RequestError::Api(ApiError::ChatNotFound) => RejectionCode::ChatNotFound,
        RequestError::Api(ApiError::BotBlocked) => RejectionCode::BotBlocked,
        RequestError::Api(ApiError::BotKicked)
        | RequestError::Api(ApiError::BotKickedFromSupergroup) => RejectionCode::BotKicked,
        RequestError::MigrateToChatId(to) => RejectionCode::ChatMigrated { to: ChatId(*to) },
        _ => RejectionCode::Unclassified,
    };
    Rejection::new(code, e.to_string())
}

#[async_trait]
impl BroadcastGateway for TelegramGateway {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> SendOutcome {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            let res = self
                .bot
                .send_message(Self::tg_chat(chat_id), html.to_string())
                .parse_mode(ParseMode::Html)
                .disable_web_page_preview(true)
                .await;

            match res {
                Ok(_) => return Ok(()),
                Err(RequestError::RetryAfter(d)) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    tracing::debug!(chat_id = chat_id.0, "flood control, retrying in {d:?}");
                    sleep(d).await;
                }
                Err(e) => return Err(map_rejection(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_unreachable_recipients() {
        let cases = [
            (ApiError::ChatNotFound, RejectionCode::ChatNotFound),
            (ApiError::BotBlocked, RejectionCode::BotBlocked),
            (ApiError::BotKicked, RejectionCode::BotKicked),
            (ApiError::BotKickedFromSupergroup, RejectionCode::BotKicked),
        ];
        for (api, expected) in cases {
            assert_eq!(map_rejection(RequestError::Api(api)).code, expected);
        }
    }

    #[test]
    fn maps_group_upgrade_with_its_target() {
        let rejection = map_rejection(RequestError::MigrateToChatId(200));
        assert_eq!(rejection.code, RejectionCode::ChatMigrated { to: ChatId(200) });
    }

    #[test]
    fn keeps_the_description_for_unclassified_errors() {
        let rejection = map_rejection(RequestError::Api(ApiError::Unknown(
            "Bad Request: message is too long".to_string(),
        )));
        assert_eq!(rejection.code, RejectionCode::Unclassified);
        assert!(rejection.description.contains("message is too long"));
    }
}
