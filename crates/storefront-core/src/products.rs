use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name and value of the placeholder pair some stored variants carry instead
/// of real attribute metadata.
pub const PLACEHOLDER_ATTRIBUTE: &str = "Default";

/// A named product option axis, e.g. `"Color"` with `["Red", "Blue"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    /// Selectable values in display order.
    #[serde(default)]
    pub values: Vec<String>,
}

impl Attribute {
    pub fn new<N, I, V>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// An attribute without values collapses the whole variant matrix.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.values.is_empty()
    }

    /// Values listed more than once, in first-repeat order.
    #[must_use]
    pub fn duplicate_values(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dupes: Vec<&str> = Vec::new();
        for value in &self.values {
            if !seen.insert(value.as_str()) && !dupes.contains(&value.as_str()) {
                dupes.push(value);
            }
        }
        dupes
    }
}

/// One `{name, value}` entry of a variant's attribute list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributePair {
    pub name: String,
    pub value: String,
}

impl AttributePair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `true` for the `Default`/`Default` stand-in written when a product
    /// had no real options.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_ATTRIBUTE && self.value == PLACEHOLDER_ATTRIBUTE
    }
}

/// A sellable record derived from one combination of attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Identifier assigned by the persistence service; absent until saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Units on hand. `None` or negative values only arrive from stored data
    /// and are rejected at submission.
    #[serde(default)]
    pub stock: Option<i64>,
    pub price: Decimal,
    pub production_cost: Decimal,
    /// Mirrors the attribute set at generation time, in axis order.
    #[serde(default)]
    pub attributes: Vec<AttributePair>,
}

impl Variant {
    /// Returns the parent-axis value, if the variant has any attributes.
    #[must_use]
    pub fn parent_value(&self) -> Option<&str> {
        self.attributes.first().map(|pair| pair.value.as_str())
    }

    /// `true` when the stored attribute list carries no usable structure:
    /// empty, or the single `Default`/`Default` placeholder.
    #[must_use]
    pub fn has_degenerate_attributes(&self) -> bool {
        match self.attributes.as_slice() {
            [] => true,
            [only] => only.is_placeholder(),
            _ => false,
        }
    }

    /// Human-readable title, e.g. `"Red / M"`; `"Default"` without attributes.
    #[must_use]
    pub fn title(&self) -> String {
        if self.attributes.is_empty() {
            return PLACEHOLDER_ATTRIBUTE.to_string();
        }
        self.attributes
            .iter()
            .map(|pair| pair.value.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Merchant-entered product fields that sit outside the variant matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// A product as returned by the persistence service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub production_cost: Option<Decimal>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Sum of non-negative stored stock across all variants.
    #[must_use]
    pub fn total_stock(&self) -> i64 {
        self.variants
            .iter()
            .filter_map(|v| v.stock)
            .filter(|s| *s > 0)
            .sum()
    }

    #[must_use]
    pub fn details(&self) -> ProductDetails {
        ProductDetails {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            categories: self.categories.clone(),
        }
    }
}

/// Body of a product create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    pub price: Decimal,
    pub production_cost: Decimal,
    pub attributes: Vec<Attribute>,
    pub variants: Vec<Variant>,
}

/// Body of a product update call. The product id travels in the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    pub price: Decimal,
    pub production_cost: Decimal,
    pub attributes: Vec<Attribute>,
    pub variants: Vec<Variant>,
}

impl From<ProductCreate> for ProductUpdate {
    fn from(create: ProductCreate) -> Self {
        Self {
            name: create.name,
            description: create.description,
            categories: create.categories,
            price: create.price,
            production_cost: create.production_cost,
            attributes: create.attributes,
            variants: create.variants,
        }
    }
}
