//! Carries per-variant data across a full regeneration.
//!
//! Variants have no identity of their own between regenerations. A
//! regenerated variant is matched to a previous one through its
//! [`CombinationKey`], built from every `name=value` pair, so stored ids,
//! SKUs and price overrides survive edits that leave the combination intact.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use storefront_core::{AttributePair, Variant};

const FIELD_SEP: char = '\u{1f}';
const PAIR_SEP: char = '\u{1e}';

/// Canonical identity of a combination across regenerations.
///
/// Pairs are sorted before joining, so moving an axis does not change the
/// key. The empty key identifies the default variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationKey(String);

impl CombinationKey {
    #[must_use]
    pub fn from_pairs(pairs: &[AttributePair]) -> Self {
        let mut parts: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();
        parts.sort_unstable();
        let mut key = String::new();
        for (i, (name, value)) in parts.into_iter().enumerate() {
            if i > 0 {
                key.push(PAIR_SEP);
            }
            key.push_str(name);
            key.push(FIELD_SEP);
            key.push_str(value);
        }
        Self(key)
    }

    #[must_use]
    pub fn of(variant: &Variant) -> Self {
        Self::from_pairs(&variant.attributes)
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return write!(f, "[default]");
        }
        let rendered = self
            .0
            .split(PAIR_SEP)
            .map(|pair| pair.replacen(FIELD_SEP, "=", 1))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{rendered}]")
    }
}

/// A per-variant amount that either follows the session global or replaces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Amount {
    #[default]
    Inherited,
    Overridden(Decimal),
}

impl Amount {
    #[must_use]
    pub fn resolve(self, global: Decimal) -> Decimal {
        match self {
            Amount::Inherited => global,
            Amount::Overridden(value) => value,
        }
    }

    #[must_use]
    pub fn is_overridden(self) -> bool {
        matches!(self, Amount::Overridden(_))
    }
}

/// Price and production-cost overrides for one combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantOverrides {
    pub price: Amount,
    pub production_cost: Amount,
}

impl VariantOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.price.is_overridden() && !self.production_cost.is_overridden()
    }
}

/// Result of matching a fresh variant list against the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub variants: Vec<Variant>,
    /// Fresh variants that found a previous counterpart.
    pub matched: usize,
    /// Fresh variants with no previous counterpart.
    pub added: usize,
    /// Previous variants whose combination no longer exists.
    pub dropped: usize,
}

/// Matches `fresh` against `previous` by combination key.
///
/// A matched variant keeps the previous `id` and `sku` where the previous
/// variant has them; a missing one never clears the fresh value. Stock always comes
/// from the fresh allocation. Overrides are applied on top of the fresh
/// global price and cost whether or not a previous variant matched.
#[must_use]
pub fn reconcile(
    previous: &[Variant],
    fresh: Vec<Variant>,
    overrides: &HashMap<CombinationKey, VariantOverrides>,
) -> Reconciled {
    let mut by_key: HashMap<CombinationKey, &Variant> = HashMap::with_capacity(previous.len());
    for variant in previous {
        by_key.entry(CombinationKey::of(variant)).or_insert(variant);
    }

    let mut matched = 0usize;
    let mut added = 0usize;
    let mut used: Vec<CombinationKey> = Vec::new();

    let variants = fresh
        .into_iter()
        .map(|mut variant| {
            let key = CombinationKey::of(&variant);
            match by_key.get(&key) {
                Some(prior) if !used.contains(&key) => {
                    if prior.id.is_some() {
                        variant.id.clone_from(&prior.id);
                    }
                    if prior.sku.is_some() {
                        variant.sku.clone_from(&prior.sku);
                    }
                    matched += 1;
                    used.push(key.clone());
                }
                _ => added += 1,
            }
            if let Some(ov) = overrides.get(&key) {
                variant.price = ov.price.resolve(variant.price);
                variant.production_cost = ov.production_cost.resolve(variant.production_cost);
            }
            variant
        })
        .collect();

    Reconciled {
        variants,
        matched,
        added,
        dropped: previous.len().saturating_sub(matched),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(pairs: &[(&str, &str)], id: Option<&str>, sku: Option<&str>) -> Variant {
        Variant {
            id: id.map(str::to_string),
            sku: sku.map(str::to_string),
            stock: Some(1),
            price: Decimal::new(1000, 2),
            production_cost: Decimal::new(400, 2),
            attributes: pairs
                .iter()
                .map(|(n, v)| AttributePair::new(*n, *v))
                .collect(),
        }
    }

    #[test]
    fn key_ignores_axis_order() {
        let a = CombinationKey::from_pairs(&[
            AttributePair::new("Color", "Red"),
            AttributePair::new("Size", "M"),
        ]);
        let b = CombinationKey::from_pairs(&[
            AttributePair::new("Size", "M"),
            AttributePair::new("Color", "Red"),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn key_distinguishes_third_axis() {
        let a = CombinationKey::from_pairs(&[
            AttributePair::new("Color", "Red"),
            AttributePair::new("Size", "M"),
            AttributePair::new("Fit", "Slim"),
        ]);
        let b = CombinationKey::from_pairs(&[
            AttributePair::new("Color", "Red"),
            AttributePair::new("Size", "M"),
            AttributePair::new("Fit", "Regular"),
        ]);
        assert_ne!(a, b);
    }

    #[test]
    fn key_does_not_collide_on_embedded_separators() {
        let a = CombinationKey::from_pairs(&[AttributePair::new("Color", "Red=Size")]);
        let b = CombinationKey::from_pairs(&[
            AttributePair::new("Color", "Red"),
            AttributePair::new("Size", ""),
        ]);
        assert_ne!(a, b);
    }

    #[test]
    fn key_display_is_readable() {
        let key = CombinationKey::from_pairs(&[
            AttributePair::new("Size", "M"),
            AttributePair::new("Color", "Red"),
        ]);
        assert_eq!(key.to_string(), "[Color=Red, Size=M]");
        assert_eq!(CombinationKey::from_pairs(&[]).to_string(), "[default]");
    }

    #[test]
    fn matched_variants_keep_id_and_sku() {
        let previous = vec![
            variant(&[("Color", "Red"), ("Size", "S")], Some("v1"), Some("SKU-1")),
            variant(&[("Color", "Red"), ("Size", "M")], Some("v2"), Some("SKU-2")),
        ];
        let fresh = vec![
            variant(&[("Color", "Red"), ("Size", "S")], None, None),
            variant(&[("Color", "Red"), ("Size", "L")], None, None),
        ];
        let out = reconcile(&previous, fresh, &HashMap::new());
        assert_eq!(out.variants[0].id.as_deref(), Some("v1"));
        assert_eq!(out.variants[0].sku.as_deref(), Some("SKU-1"));
        assert!(out.variants[1].id.is_none());
        assert_eq!((out.matched, out.added, out.dropped), (1, 1, 1));
    }

    #[test]
    fn missing_previous_sku_keeps_fresh_sku() {
        let previous = vec![variant(&[("Size", "S")], Some("v1"), None)];
        let fresh = vec![variant(&[("Size", "S")], None, Some("TEE|x|Size-S"))];
        let out = reconcile(&previous, fresh, &HashMap::new());
        assert_eq!(out.variants[0].id.as_deref(), Some("v1"));
        assert_eq!(out.variants[0].sku.as_deref(), Some("TEE|x|Size-S"));
    }

    #[test]
    fn stock_comes_from_fresh_allocation() {
        let mut prior = variant(&[("Color", "Red")], Some("v1"), None);
        prior.stock = Some(99);
        let mut fresh = variant(&[("Color", "Red")], None, None);
        fresh.stock = Some(3);
        let out = reconcile(&[prior], vec![fresh], &HashMap::new());
        assert_eq!(out.variants[0].stock, Some(3));
    }

    #[test]
    fn overrides_replace_global_values() {
        let fresh = vec![
            variant(&[("Color", "Red")], None, None),
            variant(&[("Color", "Blue")], None, None),
        ];
        let mut overrides = HashMap::new();
        overrides.insert(
            CombinationKey::from_pairs(&[AttributePair::new("Color", "Blue")]),
            VariantOverrides {
                price: Amount::Overridden(Decimal::new(1500, 2)),
                production_cost: Amount::Inherited,
            },
        );
        let out = reconcile(&[], fresh, &overrides);
        assert_eq!(out.variants[0].price, Decimal::new(1000, 2));
        assert_eq!(out.variants[1].price, Decimal::new(1500, 2));
        assert_eq!(out.variants[1].production_cost, Decimal::new(400, 2));
    }

    #[test]
    fn default_variant_matches_default_variant() {
        let previous = vec![variant(&[], Some("only"), Some("MUG"))];
        let fresh = vec![variant(&[], None, None)];
        let out = reconcile(&previous, fresh, &HashMap::new());
        assert_eq!(out.variants[0].id.as_deref(), Some("only"));
        assert_eq!(out.matched, 1);
    }

    #[test]
    fn duplicate_previous_keys_match_once() {
        let previous = vec![
            variant(&[("Size", "S")], Some("first"), None),
            variant(&[("Size", "S")], Some("second"), None),
        ];
        let fresh = vec![
            variant(&[("Size", "S")], None, None),
            variant(&[("Size", "S")], None, None),
        ];
        let out = reconcile(&previous, fresh, &HashMap::new());
        assert_eq!(out.variants[0].id.as_deref(), Some("first"));
        assert!(out.variants[1].id.is_none());
    }
}
