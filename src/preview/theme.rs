//! Accent colour and the fixed strings of Mika's preview cards.

/// Celestial gold wash, the accent of every card.
pub const ACCENT_COLOR: u32 = 0xC7_A8_7A;

pub(crate) const TITLE_PREFIX: &str = "💖🌟";
pub(crate) const TITLE_SUFFIX: &str = "🔗 | ⭐";

pub(crate) const PADDING_TOP: &str = "Hehe! ✨ Mika found something lovely for you! 💖";
pub(crate) const PADDING_BOTTOM: &str = "This is a little sparkle from the cosmos, just for you! 😉🌟";

/// Lowercase phrases that mark a description as generic filler.
pub(crate) const FILLER_MARKERS: [&str; 7] = [
    "celestial",
    "mika's touch",
    "curated",
    "link resource",
    "beauty",
    "clarity",
    "found something lovely",
];

pub(crate) const DOMAIN_FIELD_NAME: &str = "🌟 **Cosmic Origin**";

pub(crate) const FOOTER_PREFIX: &str = "💖 Mika's Craftsmanship";
pub(crate) const FOOTER_SUFFIX: &str = "✨ So magical! ✨";
