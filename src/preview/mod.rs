//! Preview card composition.
//!
//! Turns resolved [`LinkMetadata`] plus who/where it was shared into a
//! size-bounded card. Pure: no I/O, same input gives the same card.

pub mod theme;

use serde::{Deserialize, Serialize};

use crate::scraping::LinkMetadata;
use crate::scraping::urls::is_http_like;

/// Platform ceiling for card titles (characters).
pub const MAX_TITLE_CHARS: usize = 256;
/// Platform ceiling for card descriptions (characters).
pub const MAX_DESCRIPTION_CHARS: usize = 4096;
/// Descriptions are cut here, leaving room for an ellipsis.
pub const DESCRIPTION_BUDGET: usize = 4093;
/// Framed descriptions longer than this get cut to the budget.
const FRAMED_SOFT_LIMIT: usize = 4000;
/// Descriptions shorter than this get the "found something lovely" padding.
const PADDING_THRESHOLD: usize = 100;

/// Who shared the link, and where.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageContext {
    /// Display name of the author.
    pub author_name: String,
    /// Author avatar, if they have one set.
    pub author_avatar_url: Option<String>,
    /// Channel name (guild channels only).
    pub channel_name: Option<String>,
    /// Whether the message came from a guild rather than a DM.
    pub in_guild: bool,
    /// The bot's default avatar, used when the author has none.
    pub bot_default_avatar_url: String,
}

/// An inline labelled field on a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    /// Field label.
    pub name: String,
    /// Field value.
    pub value: String,
    /// Whether the field is rendered inline.
    pub inline: bool,
}

/// A finished preview, ready for the messaging boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewCard {
    /// Decorated title.
    pub title: String,
    /// Framed, bounded description.
    pub description: String,
    /// The shared link.
    pub link: String,
    /// RGB accent colour.
    pub accent_color: u32,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// "Cosmic Origin" domain field.
    pub domain_field: Option<CardField>,
    /// Footer line.
    pub footer_text: String,
    /// Footer icon URL.
    pub footer_icon_url: String,
}

/// Build the card for a resolved link.
#[must_use]
pub fn compose_card(metadata: &LinkMetadata, context: &MessageContext) -> PreviewCard {
    PreviewCard {
        title: decorate_title(&metadata.title),
        description: frame_description(&metadata.title, &metadata.description),
        link: metadata.source_url.clone(),
        accent_color: theme::ACCENT_COLOR,
        thumbnail: metadata
            .thumbnail_url
            .clone()
            .filter(|url| is_http_like(url)),
        domain_field: metadata.site_domain.as_ref().map(|domain| CardField {
            name: theme::DOMAIN_FIELD_NAME.to_string(),
            value: format!("`{domain}`"),
            inline: true,
        }),
        footer_text: footer_text(context),
        footer_icon_url: context
            .author_avatar_url
            .clone()
            .unwrap_or_else(|| context.bot_default_avatar_url.clone()),
    }
}

/// Wrap the title in the heart/star markers, shortening it if needed.
#[must_use]
pub fn decorate_title(title: &str) -> String {
    let decorated = format!("{} {title} {}", theme::TITLE_PREFIX, theme::TITLE_SUFFIX);
    if decorated.chars().count() <= MAX_TITLE_CHARS {
        return decorated;
    }

    let overhead = decorated.chars().count() - title.chars().count();
    let room = MAX_TITLE_CHARS.saturating_sub(overhead + 1);
    let shortened: String = title.chars().take(room).collect();
    format!("{} {shortened}… {}", theme::TITLE_PREFIX, theme::TITLE_SUFFIX)
}

/// Short or generic descriptions get Mika's padding; substantial ones get a
/// "let me make it shine" lead-in.
#[must_use]
pub fn frame_description(title: &str, description: &str) -> String {
    if needs_padding(description) {
        let combined = format!(
            "{}\n\n{description}\n\n{}",
            theme::PADDING_TOP,
            theme::PADDING_BOTTOM
        );
        return truncate_chars(&combined, DESCRIPTION_BUDGET);
    }

    let framed = format!("Oh! A {title}! Let me make it shine. ✨ {description}");
    if framed.chars().count() > FRAMED_SOFT_LIMIT {
        format!("{}...", truncate_chars(&framed, DESCRIPTION_BUDGET))
    } else {
        framed
    }
}

fn needs_padding(description: &str) -> bool {
    if description.chars().count() < PADDING_THRESHOLD {
        return true;
    }

    let lower = description.to_lowercase();
    theme::FILLER_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

fn footer_text(context: &MessageContext) -> String {
    let mut parts = vec![format!("Shared by: {}", context.author_name)];
    if context.in_guild {
        if let Some(channel) = &context.channel_name {
            parts.push(format!("Channel: #{channel}"));
        }
    }

    format!(
        "{} | {} | {}",
        theme::FOOTER_PREFIX,
        parts.join(" | "),
        theme::FOOTER_SUFFIX
    )
}

/// First `max` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
