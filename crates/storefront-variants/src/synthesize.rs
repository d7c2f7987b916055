//! Turns combinations into variant records.
//!
//! Synthesis is a full recomputation: callers replace their whole variant
//! list with the result and let [`crate::reconcile`] carry over anything worth
//! keeping from the previous list.

use rust_decimal::Decimal;
use storefront_core::{Attribute, AttributePair, Variant};

use crate::combinations::Combination;
use crate::stock::{allocate_all, ParentStockMap};

/// Session-wide values copied onto every synthesized variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Globals {
    pub price: Decimal,
    pub production_cost: Decimal,
    /// Stock of the lone default variant when there are no combinations.
    pub default_stock: u32,
}

/// Builds one variant per combination.
///
/// With no combinations, returns exactly one default variant with no
/// attributes and `globals.default_stock`. Otherwise each variant pairs the
/// attribute names with the combination's values, takes its stock from the
/// parent-value allocation, and copies the global price and production cost.
#[must_use]
pub fn synthesize(
    attributes: &[Attribute],
    combinations: &[Combination],
    globals: &Globals,
    parent_stock: &ParentStockMap,
) -> Vec<Variant> {
    if combinations.is_empty() {
        return vec![default_variant(globals)];
    }

    let stocks = allocate_all(combinations, parent_stock);

    combinations
        .iter()
        .zip(stocks)
        .map(|(combo, stock)| Variant {
            id: None,
            sku: None,
            stock: Some(i64::from(stock)),
            price: globals.price,
            production_cost: globals.production_cost,
            attributes: attributes
                .iter()
                .zip(combo.values())
                .map(|(attr, value)| AttributePair::new(attr.name.clone(), value.clone()))
                .collect(),
        })
        .collect()
}

fn default_variant(globals: &Globals) -> Variant {
    Variant {
        id: None,
        sku: None,
        stock: Some(i64::from(globals.default_stock)),
        price: globals.price,
        production_cost: globals.production_cost,
        attributes: Vec::new(),
    }
}
