//! Cartesian expansion of an attribute set into ordered value combinations.

use storefront_core::Attribute;

/// One value per attribute, in attribute order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination(Vec<String>);

impl Combination {
    #[must_use]
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// The parent-axis value, which keys stock allocation.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
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

/// Generates every combination of attribute values, in axis order.
///
/// The combinations for `[A0, A1, …, An]` are each value of `A0` prefixed onto
/// every combination of `[A1, …, An]`, so all combinations sharing an `A0`
/// value come out contiguous. Stock allocation and reconciliation rely on that.
///
/// Returns an empty list for an empty attribute set, and also when any
/// attribute has no values: one empty axis collapses the whole product.
#[must_use]
pub fn generate_combinations(attributes: &[Attribute]) -> Vec<Combination> {
    expand(attributes).into_iter().map(Combination).collect()
}

/// Expected number of combinations: the product of all value counts.
#[must_use]
pub fn combination_count(attributes: &[Attribute]) -> usize {
    if attributes.is_empty() {
        return 0;
    }
    attributes
        .iter()
        .map(|attr| attr.values.len())
        .try_fold(1usize, usize::checked_mul)
        .unwrap_or(usize::MAX)
}

fn expand(attributes: &[Attribute]) -> Vec<Vec<String>> {
    match attributes {
        [] => Vec::new(),
        [last] => last.values.iter().map(|v| vec![v.clone()]).collect(),
        [first, rest @ ..] => {
            let tails = expand(rest);
            let mut out = Vec::with_capacity(first.values.len() * tails.len());
            for value in &first.values {
                for tail in &tails {
                    let mut combo = Vec::with_capacity(tail.len() + 1);
                    combo.push(value.clone());
                    combo.extend(tail.iter().cloned());
                    out.push(combo);
                }
            }
            out
        }
    }
}
