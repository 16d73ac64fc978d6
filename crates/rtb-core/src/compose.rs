//! Payload composition: itemized messages for small updates, a single
//! linked digest for large ones.

use crate::{
    domain::{Feed, FeedUpdate},
    formatting::{clean_item_text, escape_html},
};

/// Item batches longer than this collapse into a single digest payload.
pub const ITEMIZED_MAX: usize = 5;

/// Produce the ordered payload sequence to send to one subscriber.
///
/// Output is Telegram HTML restricted to `<b>` and `<a>`; all feed text is
/// escaped so it cannot break out of those two tags. The dispatcher sends
/// payloads strictly in this order, because a chat migration discovered
/// mid-sequence must redirect the remaining ones.
pub fn compose(feed: &Feed, update: &FeedUpdate) -> Vec<String> {
    match update {
        FeedUpdate::Announcement(text) => vec![text.clone()],
        FeedUpdate::Items(items) => {
            debug_assert!(!items.is_empty(), "empty item batches are filtered by the dispatcher");

            if items.len() <= ITEMIZED_MAX {
                items
                    .iter()
                    .map(|item| {
                        format!(
                            "<b>{}</b>\n\n{}",
                            escape_html(&clean_item_text(&item.title)),
                            escape_html(&clean_item_text(&item.content)),
                        )
                    })
                    .collect()
            } else {
                let mut text = format!("<b>{}</b>", escape_html(&feed.title));
                for item in items {
                    text.push_str(&format!(
                        "\n<a href=\"{}\">{}</a>",
                        escape_html(item.link.trim()),
                        escape_html(&clean_item_text(&item.title)),
                    ));
                }
                vec![text]
            }
        }
    }
}
