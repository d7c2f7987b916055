//! Recovery of attribute structure from stored variants.
//!
//! Older products were saved without structured attribute lists (or with a
//! single `Default`/`Default` placeholder). For those the only trace of the
//! options is the SKU, laid out as `PREFIX|REF|Name-Value|Name-Value`. The
//! parse is best-effort and lossy; it is not an inverse of any serializer.

use storefront_core::{Attribute, AttributePair, Variant};

const SEGMENT_DELIMITER: char = '|';
const PAIR_DELIMITER: char = '-';

/// Parses attribute pairs out of a delimited SKU.
///
/// - No `|` in the SKU: nothing is recoverable, returns an empty list.
/// - More than two `|` segments: every segment from the third on is a token.
/// - Otherwise only the last segment is a token.
///
/// A token that splits on `-` into exactly two non-empty parts becomes
/// `{name, value}`; any other token is kept whole as an unnamed value.
///
/// Tokens are trimmed and empty tokens are skipped, so `TEE|` and
/// `TEE|42||Size-M|` never produce a `{"", ""}` pair and a stray delimiter
/// never adds an axis with an empty value.
#[must_use]
pub fn parse_from_sku(sku: &str) -> Vec<AttributePair> {
    if !sku.contains(SEGMENT_DELIMITER) {
        return Vec::new();
    }

    let segments: Vec<&str> = sku.split(SEGMENT_DELIMITER).collect();
    let tokens: &[&str] = if segments.len() > 2 {
        &segments[2..]
    } else {
        &segments[segments.len() - 1..]
    };

    tokens
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> AttributePair {
    let parts: Vec<&str> = token.split(PAIR_DELIMITER).collect();
    match parts.as_slice() {
        [name, value] if !name.trim().is_empty() && !value.trim().is_empty() => {
            AttributePair::new(name.trim(), value.trim())
        }
        _ => AttributePair::new("", token),
    }
}

/// The attribute pairs to trust for a stored variant.
///
/// Structured attributes win when present and not degenerate; otherwise the
/// pairs are parsed from the SKU.
#[must_use]
pub fn recover_attributes(variant: &Variant) -> Vec<AttributePair> {
    if !variant.has_degenerate_attributes() {
        return variant.attributes.clone();
    }
    let Some(sku) = variant.sku.as_deref() else {
        return Vec::new();
    };
    let parsed = parse_from_sku(sku);
    if !parsed.is_empty() {
        tracing::warn!(
            sku,
            recovered = parsed.len(),
            "variant has no attribute metadata; recovered attributes from SKU"
        );
    }
    parsed
}

/// Rebuilds an attribute set from per-variant pair lists.
///
/// Axes are positional: axis `i` is named after the first non-empty name seen
/// at position `i` and lists the values seen there in first-seen order,
/// without repeats.
#[must_use]
pub fn rebuild_attribute_set(pair_lists: &[Vec<AttributePair>]) -> Vec<Attribute> {
    let depth = pair_lists.iter().map(Vec::len).max().unwrap_or(0);
    let mut attributes: Vec<Attribute> = (0..depth)
        .map(|_| Attribute::new(String::new(), Vec::<String>::new()))
        .collect();

    for pairs in pair_lists {
        for (axis, pair) in attributes.iter_mut().zip(pairs) {
            if axis.name.is_empty() && !pair.name.is_empty() {
                axis.name.clone_from(&pair.name);
            }
            if !axis.values.contains(&pair.value) {
                axis.values.push(pair.value.clone());
            }
        }
    }

    attributes
}
