//! Parent-value stock entry and its even split across sibling variants.
//!
//! Merchants enter one total per value of the first (parent) attribute. Every
//! variant sharing that parent value is a sibling, and the total is divided
//! between siblings so that no sibling holds more than one unit above another
//! and the parts add back up to the total.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use storefront_core::Variant;

use crate::combinations::Combination;

/// Merchant-entered total stock per parent-axis value.
///
/// Entries for values that have since left the parent axis are kept unless
/// the session prunes them; they simply stop contributing to any variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentStockMap(BTreeMap<String, u32>);

impl ParentStockMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds totals from stored variants by summing stock per parent value.
    ///
    /// Null or negative stored stock counts as zero. Variants without
    /// attributes contribute nothing.
    #[must_use]
    pub fn from_variants(variants: &[Variant]) -> Self {
        let mut totals: BTreeMap<String, u32> = BTreeMap::new();
        for variant in variants {
            let Some(parent) = variant.parent_value() else {
                continue;
            };
            let stock = variant
                .stock
                .and_then(|s| u32::try_from(s).ok())
                .unwrap_or(0);
            let entry = totals.entry(parent.to_string()).or_insert(0);
            *entry = entry.saturating_add(stock);
        }
        Self(totals)
    }

    #[must_use]
    pub fn get(&self, parent_value: &str) -> Option<u32> {
        self.0.get(parent_value).copied()
    }

    /// Sets the total for `parent_value`, returning the previous total.
    pub fn set(&mut self, parent_value: impl Into<String>, total: u32) -> Option<u32> {
        self.0.insert(parent_value.into(), total)
    }

    pub fn remove(&mut self, parent_value: &str) -> Option<u32> {
        self.0.remove(parent_value)
    }

    /// Moves a total to a renamed parent value. No-op when `from` has no entry.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(total) = self.0.remove(from) {
            self.0.insert(to.to_string(), total);
        }
    }

    /// Keys that are not values of the current parent axis.
    #[must_use]
    pub fn stale_keys(&self, parent_values: &[String]) -> Vec<String> {
        self.0
            .keys()
            .filter(|key| !parent_values.contains(key))
            .cloned()
            .collect()
    }

    /// Removes every key not in `parent_values`, returning the removed keys.
    pub fn prune(&mut self, parent_values: &[String]) -> Vec<String> {
        let stale = self.stale_keys(parent_values);
        for key in &stale {
            self.0.remove(key);
        }
        stale
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for ParentStockMap {
    fn from_iter<T: IntoIterator<Item = (K, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Stock for the sibling at `sibling_index` among `sibling_count` siblings of
/// `parent_value`.
///
/// The first `total % sibling_count` siblings receive one extra unit. A parent
/// without an entry allocates zero. Returns `None` when there are no siblings,
/// meaning the parent has nothing to allocate to.
#[must_use]
pub fn allocate(
    parent_value: &str,
    parent_stock: &ParentStockMap,
    sibling_index: usize,
    sibling_count: usize,
) -> Option<u32> {
    if sibling_count == 0 {
        return None;
    }
    let total = u64::from(parent_stock.get(parent_value).unwrap_or(0));
    let count = sibling_count as u64;
    let base = total / count;
    let remainder = total % count;
    let share = if (sibling_index as u64) < remainder {
        base + 1
    } else {
        base
    };
    // share <= total, which came from a u32.
    Some(u32::try_from(share).unwrap_or(u32::MAX))
}

/// For each combination, its `(sibling_index, sibling_count)` among the
/// combinations sharing its parent value, in generation order.
///
/// Combinations without a parent value get `(0, 0)`.
#[must_use]
pub fn sibling_positions(combinations: &[Combination]) -> Vec<(usize, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for parent in combinations.iter().filter_map(Combination::parent) {
        *counts.entry(parent).or_insert(0) += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    combinations
        .iter()
        .map(|combo| match combo.parent() {
            Some(parent) => {
                let index = seen.entry(parent).or_insert(0);
                let position = (*index, counts.get(parent).copied().unwrap_or(0));
                *index += 1;
                position
            }
            None => (0, 0),
        })
        .collect()
}

/// Allocated stock for every combination, in generation order.
#[must_use]
pub fn allocate_all(combinations: &[Combination], parent_stock: &ParentStockMap) -> Vec<u32> {
    combinations
        .iter()
        .zip(sibling_positions(combinations))
        .map(|(combo, (index, count))| {
            combo
                .parent()
                .and_then(|parent| allocate(parent, parent_stock, index, count))
                .unwrap_or(0)
        })
        .collect()
}
