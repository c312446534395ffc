//! Field normalization shared by every adapter.

pub const DEFAULT_NAME: &str = "Unnamed restaurant";
pub const DEFAULT_CUISINE: &str = "Restaurant";
pub const DEFAULT_RATING: f64 = 0.0;
pub const DEFAULT_PRICE_TIER: u8 = 2;

/// Google `types` that say nothing about cuisine.
const GENERIC_PLACE_TYPES: &[&str] = &[
    "restaurant",
    "food",
    "point_of_interest",
    "establishment",
    "store",
    "meal_delivery",
    "meal_takeaway",
];

/// Scale a vendor rating onto `[0, 5]`.
///
/// Non-finite and negative inputs map to [`DEFAULT_RATING`]; values above
/// `scale_max` clamp to 5.
#[must_use]
pub fn normalize_rating(raw: Option<f64>, scale_max: f64) -> f64 {
    match raw {
        Some(r) if r.is_finite() && r >= 0.0 && scale_max > 0.0 => {
            (r * 5.0 / scale_max).clamp(0.0, 5.0)
        }
        _ => DEFAULT_RATING,
    }
}

/// Map a vendor price level onto tiers 1..=4.
///
/// Level 0 ("free") is folded into tier 1; a missing level is the default tier.
#[must_use]
pub fn price_tier_from_level(level: Option<i64>) -> u8 {
    level.map_or(DEFAULT_PRICE_TIER, |l| {
        u8::try_from(l.clamp(1, 4)).unwrap_or(DEFAULT_PRICE_TIER)
    })
}

/// Clamp a stored tier into 1..=4, falling back to the default when absent.
#[must_use]
pub fn price_tier_from_stored(tier: Option<i16>) -> u8 {
    price_tier_from_level(tier.map(i64::from))
}

#[must_use]
pub fn review_count_from(raw: Option<i64>) -> u32 {
    raw.map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

/// First specific Google place type, title-cased (`thai_restaurant` -> `Thai`).
#[must_use]
pub fn cuisine_from_google_types(types: &[String]) -> String {
    types
        .iter()
        .map(String::as_str)
        .find(|t| !GENERIC_PLACE_TYPES.contains(t))
        .map(|t| t.strip_suffix("_restaurant").unwrap_or(t))
        .filter(|t| !t.is_empty())
        .map_or_else(|| DEFAULT_CUISINE.to_string(), title_case)
}

/// Non-blank text, or the given default.
#[must_use]
pub fn text_or(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn title_case(raw: &str) -> String {
    raw.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
