//! Call-signature number extraction
//!
//! Pulls the classification number out of free-text call signatures such as
//! `"001.2 M67s"`. Signatures mix the Dewey class with Cutter author codes and
//! punctuation, so patterns are tried from most to least Dewey-specific:
//!
//! 1. Dotted class with 1-3 integer and 1-6 fractional digits (`001.2`)
//! 2. Bare three-digit class (`120`)
//! 3. Any integer or decimal token
//!
//! Decimal commas are normalized to dots before matching.

use once_cell::sync::Lazy;
use regex::Regex;

static DOTTED_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{1,3}\.[0-9]{1,6})\b").expect("valid dotted class pattern")
});

static BARE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{3})\b").expect("valid bare class pattern")
});

static ANY_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]+(?:\.[0-9]+)?)\b").expect("valid number pattern")
});

/// Extract the classification number from a call signature
///
/// Returns `None` when the text holds no numeric token at all. Leading zeros
/// carry no weight: `"001.2"` and `"1.2"` both yield `1.2`.
pub fn parse_signature_number(signature: &str) -> Option<f64> {
    let normalized = signature.replace(',', ".");

    [&*DOTTED_CLASS, &*BARE_CLASS, &*ANY_NUMBER]
        .into_iter()
        .find_map(|pattern| {
            pattern
                .captures(&normalized)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
        })
}
