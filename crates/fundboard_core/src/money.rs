//! Currency-amount parsing for free-text funding strings.

use std::sync::LazyLock;

use regex::Regex;

// Matches "50000", "50k", "1.5m"; commas are stripped before matching so
// "$50,000" reduces to "$50000" and still yields 50000.
static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([km])?").expect("amount pattern"));

fn multiplier(suffix: Option<&str>) -> f64 {
    match suffix {
        Some("k") => 1_000.0,
        Some("m") => 1_000_000.0,
        _ => 1.0,
    }
}

fn first_amount(cleaned: &str) -> Option<f64> {
    let caps = AMOUNT.captures(cleaned)?;
    let base: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(base * multiplier(caps.get(2).map(|m| m.as_str())))
}

/// Parse a single human-entered amount such as a minimum-funding threshold.
/// `None` means the input carries no parseable amount and any filter built on
/// it should deactivate rather than exclude everything.
pub fn parse_amount(input: &str) -> Option<f64> {
    let cleaned = input.trim().to_lowercase().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    first_amount(&cleaned)
}

/// Largest amount embedded anywhere in a funding-range string, e.g.
/// `"£10k–£50k"` yields `50000`. `None` when the text carries no digits.
pub fn max_amount(text: &str) -> Option<f64> {
    let cleaned = text.to_lowercase().replace(',', "");
    AMOUNT
        .captures_iter(&cleaned)
        .filter_map(|caps| {
            let base: f64 = caps.get(1)?.as_str().parse().ok()?;
            Some(base * multiplier(caps.get(2).map(|m| m.as_str())))
        })
        .fold(None, |best, amount| match best {
            Some(b) if b >= amount => Some(b),
            _ => Some(amount),
        })
}
