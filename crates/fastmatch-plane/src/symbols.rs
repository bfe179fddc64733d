//! The 57 symbols of the deck.
//!
//! Entry `i` labels point `i + 1` of the order-7 plane. The order is a fixed
//! enumeration and carries no meaning beyond being stable.

/// `(display name, glyph)` for every symbol, indexed by `point_id - 1`.
pub const DECK_SYMBOLS: [(&str, &str); 57] = [
    ("Anchor", "⚓"),
    ("Apple", "🍎"),
    ("Baby bottle", "🍼"),
    ("Bomb", "💣"),
    ("Cactus", "🌵"),
    ("Candle", "🕯️"),
    ("Taxi", "🚕"),
    ("Carrot", "🥕"),
    ("Knight", "♞"),
    ("Clock", "🕐"),
    ("Clown", "🤡"),
    ("Daisy", "🌼"),
    ("Dinosaur", "🦕"),
    ("Dolphin", "🐬"),
    ("Dragon", "🐉"),
    ("Exclamation", "❗"),
    ("Eye", "👁️"),
    ("Fire", "🔥"),
    ("Clover", "🍀"),
    ("Ghost", "👻"),
    ("Green heart", "💚"),
    ("Hammer", "🔨"),
    ("Heart", "❤️"),
    ("Ice", "🧊"),
    ("Tent", "⛺"),
    ("Key", "🔑"),
    ("Ladybug", "🐞"),
    ("Light bulb", "💡"),
    ("Lightning", "⚡"),
    ("Lock", "🔒"),
    ("Maple leaf", "🍁"),
    ("Moon", "🌙"),
    ("Prohibited", "🚫"),
    ("Pumpkin", "🎃"),
    ("Pencil", "✏️"),
    ("Bird", "🐦"),
    ("Cat", "🐱"),
    ("Hand wave", "👋"),
    ("Lips", "💋"),
    ("Scissors", "✂️"),
    ("Skull", "💀"),
    ("Snowflake", "❄️"),
    ("Snowman", "☃️"),
    ("Spider", "🕷️"),
    ("Spider web", "🕸️"),
    ("Sun", "☀️"),
    ("Sunglasses", "🕶️"),
    ("Target", "🎯"),
    ("Tortoise", "🐢"),
    ("Music notes", "🎵"),
    ("Tree", "🌲"),
    ("Drop", "💧"),
    ("Dog", "🐕"),
    ("Yin yang", "☯️"),
    ("Zebra", "🦓"),
    ("Question mark", "❓"),
    ("Cheese", "🧀"),
];

/// Labels for a plane with `count` points.
///
/// The deck catalog when it fits exactly, generated `"Symbol <id>"` labels
/// otherwise.
pub fn default_labels(count: usize) -> Vec<String> {
    if count == DECK_SYMBOLS.len() {
        DECK_SYMBOLS.iter().map(|(name, _)| name.to_string()).collect()
    } else {
        (1..=count).map(|id| format!("Symbol {id}")).collect()
    }
}

/// Glyph for a symbol name (trimmed, case-insensitive).
pub fn emoji_for_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    DECK_SYMBOLS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(name))
        .map(|(_, glyph)| *glyph)
}
