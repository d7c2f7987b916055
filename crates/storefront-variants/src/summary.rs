//! Read-only overview of a generated matrix, for display and reporting.

use serde::Serialize;
use storefront_core::{Attribute, Variant};

use crate::stock::ParentStockMap;

/// Stock entry and allocation for one parent-axis value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentSummary {
    pub value: String,
    /// Total the merchant entered, zero when nothing was entered.
    pub entered: u32,
    /// Variants sharing this parent value.
    pub siblings: usize,
    /// Sum of stock actually carried by those variants.
    pub allocated: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixSummary {
    pub variant_count: usize,
    pub total_stock: i64,
    pub parents: Vec<ParentSummary>,
    /// Stock entries whose value is no longer on the parent axis.
    pub stale_keys: Vec<String>,
}

impl MatrixSummary {
    #[must_use]
    pub fn new(
        attributes: &[Attribute],
        variants: &[Variant],
        parent_stock: &ParentStockMap,
    ) -> Self {
        let parent_values: &[String] = attributes
            .first()
            .map(|a| a.values.as_slice())
            .unwrap_or_default();

        let parents = parent_values
            .iter()
            .map(|value| {
                let siblings: Vec<&Variant> = variants
                    .iter()
                    .filter(|v| v.parent_value() == Some(value.as_str()))
                    .collect();
                ParentSummary {
                    value: value.clone(),
                    entered: parent_stock.get(value).unwrap_or(0),
                    siblings: siblings.len(),
                    allocated: siblings.iter().filter_map(|v| v.stock).sum(),
                }
            })
            .collect();

        Self {
            variant_count: variants.len(),
            total_stock: variants.iter().filter_map(|v| v.stock).sum(),
            parents,
            stale_keys: parent_stock.stale_keys(parent_values),
        }
    }
}
