//! YAML draft files: a product's details and matrix inputs, applied onto an
//! editing session in the order a merchant would enter them.
//!
//! ```yaml
//! name: Linen Shirt
//! description: Breathable summer shirt
//! categories: [shirts]
//! price: "25.00"
//! production_cost: "9.00"
//! sku_prefix: SHIRT
//! attributes:
//!   - name: Color
//!     values: [Red, Blue]
//!   - name: Size
//!     values: [S, M, L]
//! parent_stock:
//!   Red: 10
//!   Blue: 7
//! overrides:
//!   - variant: { Color: Red, Size: L }
//!     price: "27.50"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;
use storefront_core::{Attribute, AttributePair, ProductDetails};
use storefront_variants::{EditingSession, EngineSettings, SessionError};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DraftFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub production_cost: Decimal,
    /// Overrides `STOREFRONT_DEFAULT_STOCK` for this draft.
    pub default_stock: Option<u32>,
    /// Overrides `STOREFRONT_PRUNE_STALE_STOCK` for this draft.
    pub prune_stale_stock: Option<bool>,
    pub sku_prefix: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub parent_stock: BTreeMap<String, u32>,
    #[serde(default)]
    pub overrides: Vec<DraftOverride>,
}

/// Price or cost override for the variant matching every `name: value`
/// entry of `variant`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DraftOverride {
    pub variant: BTreeMap<String, String>,
    pub price: Option<Decimal>,
    pub production_cost: Option<Decimal>,
}

impl DraftOverride {
    fn pairs(&self) -> Vec<AttributePair> {
        self.variant
            .iter()
            .map(|(name, value)| AttributePair::new(name.clone(), value.clone()))
            .collect()
    }
}

impl DraftFile {
    pub(crate) fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read draft file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid draft file {}", path.display()))
    }

    pub(crate) fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub(crate) fn details(&self) -> ProductDetails {
        ProductDetails {
            name: self.name.clone(),
            description: self.description.clone(),
            categories: self.categories.clone(),
        }
    }

    /// Builds a session from the draft, starting from `settings` and letting
    /// the draft's own stock settings win.
    pub(crate) fn to_session(&self, settings: EngineSettings) -> Result<EditingSession, SessionError> {
        let settings = EngineSettings {
            default_stock: self.default_stock.unwrap_or(settings.default_stock),
            prune_stale_stock: self.prune_stale_stock.unwrap_or(settings.prune_stale_stock),
        };

        let mut session = EditingSession::new(settings);
        session.set_global_price(self.price);
        session.set_global_production_cost(self.production_cost);
        session.set_sku_prefix(self.sku_prefix.clone());

        for attribute in &self.attributes {
            session.add_attribute(&attribute.name, attribute.values.iter().cloned())?;
        }
        for (value, total) in &self.parent_stock {
            session.set_parent_stock(value, *total)?;
        }
        for entry in &self.overrides {
            let pairs = entry.pairs();
            if let Some(price) = entry.price {
                session.override_price(&pairs, price)?;
            }
            if let Some(cost) = entry.production_cost {
                session.override_production_cost(&pairs, cost)?;
            }
        }

        Ok(session)
    }
}
