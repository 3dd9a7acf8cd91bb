//! Rendering for the Discord messaging boundary.

use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter};

use crate::preview::PreviewCard;

/// Discord's per-message character limit.
pub const MESSAGE_CHAR_LIMIT: usize = 2000;

/// Render a preview card as a Discord embed.
#[must_use]
pub fn card_embed(card: &PreviewCard) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(card.title.clone())
        .description(card.description.clone())
        .url(card.link.clone())
        .colour(Colour::new(card.accent_color))
        .footer(CreateEmbedFooter::new(card.footer_text.clone()).icon_url(card.footer_icon_url.clone()));

    if let Some(thumbnail) = &card.thumbnail {
        embed = embed.thumbnail(thumbnail.clone());
    }
    if let Some(field) = &card.domain_field {
        embed = embed.field(field.name.clone(), field.value.clone(), field.inline);
    }
    embed
}

/// Split a reply into chunks of at most `limit` characters.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::CardField;

    fn card() -> PreviewCard {
        PreviewCard {
            title: "💖🌟 Cool Thing 🔗 | ⭐".to_string(),
            description: "Oh! A Cool Thing!".to_string(),
            link: "http://example.com/cool-thing".to_string(),
            accent_color: 0xC7_A8_7A,
            thumbnail: Some("http://example.com/img.png".to_string()),
            domain_field: Some(CardField {
                name: "🌟 **Cosmic Origin**".to_string(),
                value: "`example.com`".to_string(),
                inline: true,
            }),
            footer_text: "💖 Mika's Craftsmanship | Shared by: Stella | ✨ So magical! ✨".to_string(),
            footer_icon_url: "https://cdn.example/avatar.png".to_string(),
        }
    }

    #[test]
    fn test_embed_carries_card() {
        let json = serde_json::to_value(card_embed(&card())).expect("serialize");
        assert_eq!(json["title"], "💖🌟 Cool Thing 🔗 | ⭐");
        assert_eq!(json["url"], "http://example.com/cool-thing");
        assert_eq!(json["color"], 0xC7_A8_7A);
        assert_eq!(json["thumbnail"]["url"], "http://example.com/img.png");
        assert_eq!(json["fields"][0]["name"], "🌟 **Cosmic Origin**");
        assert_eq!(json["fields"][0]["inline"], true);
        assert_eq!(json["footer"]["icon_url"], "https://cdn.example/avatar.png");
    }

    #[test]
    fn test_embed_without_optional_parts() {
        let mut bare = card();
        bare.thumbnail = None;
        bare.domain_field = None;
        let json = serde_json::to_value(card_embed(&bare)).expect("serialize");
        assert!(json.get("thumbnail").is_none_or(serde_json::Value::is_null));
        assert!(
            json.get("fields")
                .and_then(serde_json::Value::as_array)
                .is_none_or(Vec::is_empty)
        );
    }

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("hi", MESSAGE_CHAR_LIMIT), vec!["hi".to_string()]);
        assert!(split_message("", MESSAGE_CHAR_LIMIT).is_empty());
    }

    #[test]
    fn test_split_long_message_on_char_boundaries() {
        let text = "✨".repeat(4500);
        let chunks = split_message(&text, MESSAGE_CHAR_LIMIT);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 2000);
        assert_eq!(chunks[2].chars().count(), 500);
        assert_eq!(chunks.concat(), text);
    }
}
