//! Maneuver icon keys.

/// Keys the presentation layer has artwork for.
pub const KNOWN_ICON_KEYS: [&str; 12] = [
    "turn_right",
    "turn_left",
    "turn_slight_right",
    "turn_slight_left",
    "turn_sharp_right",
    "turn_sharp_left",
    "uturn",
    "straight",
    "merge",
    "roundabout",
    "arrive",
    "depart",
];

/// Key used for any maneuver without dedicated artwork.
pub const DEFAULT_ICON_KEY: &str = "default";

/// Derive the icon key for a maneuver `type` and optional `modifier`.
///
/// The key is `type_modifier` (or just `type`), with spaces folded to underscores so that
/// `("turn", "slight right")` resolves to `turn_slight_right`.
pub fn icon_key(maneuver_type: &str, modifier: Option<&str>) -> &'static str {
    let key = match modifier {
        Some(modifier) if !modifier.is_empty() => format!("{maneuver_type}_{modifier}"),
        _ => maneuver_type.to_string(),
    };
    let key = key.replace(' ', "_");

    KNOWN_ICON_KEYS
        .into_iter()
        .find(|known| *known == key)
        .unwrap_or(DEFAULT_ICON_KEY)
}
