//! Built-in tag registry.

use super::TagEntry;

pub const FALLBACK_TITLE: &str = "New video";
pub const FALLBACK_CHANNEL: &str = "videos";

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn entry(titles: &[&str], channels: &[&str], host_tags: &[&str], sensitive: bool) -> TagEntry {
    TagEntry {
        titles: owned(titles),
        channels: owned(channels),
        host_tags: owned(host_tags),
        sensitive,
    }
}

pub fn entries() -> Vec<(&'static str, TagEntry)> {
    vec![
        (
            "ANATOMY_SOLO",
            entry(
                &["Can you handle this?", "What would you do?", "Rate this"],
                &["TransGoneWild", "GoneWildTrans"],
                &["trans", "solo", "amateur"],
                true,
            ),
        ),
        (
            "OUTFIT",
            entry(
                &[
                    "Thoughts on this fit?",
                    "Dressed up for tonight",
                    "Would you take me out in this?",
                ],
                &["OUTFITS", "streetwear"],
                &["outfit", "fashion"],
                false,
            ),
        ),
        (
            "GYM",
            entry(
                &["Leg day done", "Post-workout check", "How's the progress?"],
                &["GymMotivation", "progresspics"],
                &["fitness", "gym", "workout"],
                false,
            ),
        ),
    ]
}
