//! SKU layout shared with [`crate::legacy::parse_from_sku`].

use storefront_core::AttributePair;

/// Formats a SKU as `PREFIX|REF|Name-Value|Name-Value`.
///
/// Delimiter characters inside the parts are replaced so that
/// [`crate::legacy::parse_from_sku`] reads the pairs back. Pairs without a
/// name contribute their value alone.
///
/// A product without attributes gets `PREFIX-REF`, with no `|` at all, so
/// the parser recovers no pairs from it and the default variant reloads as
/// attribute-less.
#[must_use]
pub fn format_sku(prefix: &str, product_ref: &str, pairs: &[AttributePair]) -> String {
    if pairs.is_empty() {
        return format!("{}-{}", clean(prefix), clean(product_ref));
    }
    let mut segments = vec![clean(prefix), clean(product_ref)];
    for pair in pairs {
        let value = clean_token(&pair.value);
        if pair.name.trim().is_empty() {
            segments.push(value);
        } else {
            segments.push(format!("{}-{value}", clean_token(&pair.name)));
        }
    }
    segments.join("|")
}

fn clean(part: &str) -> String {
    part.trim().replace('|', "/")
}

fn clean_token(part: &str) -> String {
    clean(part).replace('-', "_")
}
