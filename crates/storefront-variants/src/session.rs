//! The editing session: one product's attribute set, stock entries and
//! globals, with the variant list recomputed after every mutation.
//!
//! A session is single-writer, in-memory state. Nothing is persisted until
//! [`EditingSession::build_create`] or [`EditingSession::build_update`] hands
//! a payload to the caller, and building a payload never mutates the session,
//! so a failed submission can simply be retried.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use storefront_core::{
    AppConfig, Attribute, AttributePair, Product, ProductCreate, ProductDetails, ProductUpdate,
    Variant,
};
use uuid::Uuid;

use crate::combinations::{generate_combinations, Combination};
use crate::error::SessionError;
use crate::legacy::{rebuild_attribute_set, recover_attributes};
use crate::reconcile::{reconcile, Amount, CombinationKey, VariantOverrides};
use crate::sku::format_sku;
use crate::stock::ParentStockMap;
use crate::summary::MatrixSummary;
use crate::synthesize::{synthesize, Globals};
use crate::validate::{validate_submission, Submission, ValidationErrors};

/// Engine knobs taken from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSettings {
    /// Stock of the default variant in a fresh session.
    pub default_stock: u32,
    /// Prune parent-stock entries and overrides whose value or combination
    /// no longer exists, on every mutation.
    pub prune_stale_stock: bool,
}

impl EngineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            default_stock: config.default_stock,
            prune_stale_stock: config.prune_stale_stock,
        }
    }
}

/// Override amounts together with the pairs they were entered for, so the
/// entry can follow attribute and value renames.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OverrideEntry {
    attributes: Vec<AttributePair>,
    amounts: VariantOverrides,
}

#[derive(Debug, Clone)]
pub struct EditingSession {
    id: Uuid,
    product_id: Option<String>,
    settings: EngineSettings,
    attributes: Vec<Attribute>,
    parent_stock: ParentStockMap,
    price: Decimal,
    production_cost: Decimal,
    default_stock: u32,
    sku_prefix: Option<String>,
    overrides: HashMap<CombinationKey, OverrideEntry>,
    /// Stock as loaded from a stored product, kept per combination until an
    /// edit changes the attribute set or the stock entries.
    pinned_stock: Option<HashMap<CombinationKey, i64>>,
    combinations: Vec<Combination>,
    variants: Vec<Variant>,
}

impl EditingSession {
    /// Starts an empty session: no attributes and a single default variant.
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            product_id: None,
            settings,
            attributes: Vec::new(),
            parent_stock: ParentStockMap::new(),
            price: Decimal::ZERO,
            production_cost: Decimal::ZERO,
            default_stock: settings.default_stock,
            sku_prefix: None,
            overrides: HashMap::new(),
            pinned_stock: None,
            combinations: Vec::new(),
            variants: Vec::new(),
        };
        session.regenerate();
        session
    }

    /// Opens a stored product for editing.
    ///
    /// Variants without usable attribute metadata have their pairs recovered
    /// from the SKU. The attribute set comes from the product when stored,
    /// otherwise it is rebuilt from the variants. Parent stock totals are the
    /// stored stock summed per parent value, and a stored variant priced away
    /// from the product's global price becomes an override.
    ///
    /// Stored per-variant stock is shown as loaded, even when uneven, until
    /// an edit touches attributes or stock entries; from then on each parent
    /// total is split evenly again. Stored stock that is missing or negative
    /// is split evenly straight away.
    #[must_use]
    pub fn from_product(product: &Product, settings: EngineSettings) -> Self {
        let stored: Vec<Variant> = product
            .variants
            .iter()
            .map(|variant| Variant {
                attributes: recover_attributes(variant),
                ..variant.clone()
            })
            .collect();

        let attributes = if product.attributes.is_empty() {
            let pair_lists: Vec<Vec<AttributePair>> =
                stored.iter().map(|v| v.attributes.clone()).collect();
            rebuild_attribute_set(&pair_lists)
        } else {
            product.attributes.clone()
        };

        let first = stored.first();
        let price = product
            .price
            .or_else(|| first.map(|v| v.price))
            .unwrap_or(Decimal::ZERO);
        let production_cost = product
            .production_cost
            .or_else(|| first.map(|v| v.production_cost))
            .unwrap_or(Decimal::ZERO);

        let default_stock = if attributes.is_empty() {
            first
                .and_then(|v| v.stock)
                .and_then(|s| u32::try_from(s).ok())
                .unwrap_or(settings.default_stock)
        } else {
            settings.default_stock
        };

        let mut overrides = HashMap::new();
        for variant in &stored {
            let amounts = VariantOverrides {
                price: differs(variant.price, price),
                production_cost: differs(variant.production_cost, production_cost),
            };
            if !amounts.is_empty() {
                overrides.insert(
                    CombinationKey::of(variant),
                    OverrideEntry {
                        attributes: variant.attributes.clone(),
                        amounts,
                    },
                );
            }
        }

        let pinned_stock = (!attributes.is_empty()
            && stored.iter().all(|v| matches!(v.stock, Some(s) if s >= 0)))
        .then(|| {
            stored
                .iter()
                .filter_map(|v| v.stock.map(|s| (CombinationKey::of(v), s)))
                .collect()
        });

        let mut session = Self {
            id: Uuid::new_v4(),
            product_id: Some(product.id.clone()),
            settings,
            parent_stock: ParentStockMap::from_variants(&stored),
            attributes,
            price,
            production_cost,
            default_stock,
            sku_prefix: None,
            overrides,
            pinned_stock,
            combinations: Vec::new(),
            variants: stored,
        };
        tracing::debug!(
            session = %session.id,
            product_id = %product.id,
            stored_variants = product.variants.len(),
            axes = session.attributes.len(),
            "opened product for editing"
        );
        session.regenerate();
        session
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    #[must_use]
    pub fn parent_stock(&self) -> &ParentStockMap {
        &self.parent_stock
    }

    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub fn production_cost(&self) -> Decimal {
        self.production_cost
    }

    #[must_use]
    pub fn default_stock(&self) -> u32 {
        self.default_stock
    }

    /// Overrides recorded for the combination described by `pairs`.
    #[must_use]
    pub fn overrides_for(&self, pairs: &[AttributePair]) -> VariantOverrides {
        self.overrides
            .get(&CombinationKey::from_pairs(pairs))
            .map(|entry| entry.amounts)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn summary(&self) -> MatrixSummary {
        MatrixSummary::new(&self.attributes, &self.variants, &self.parent_stock)
    }

    // ------------------------------------------------------------------
    // Attribute mutations
    // ------------------------------------------------------------------

    /// Appends an attribute axis.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyAttributeName`] or
    /// [`SessionError::DuplicateAttributeName`].
    pub fn add_attribute<I, V>(&mut self, name: &str, values: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let name = self.check_new_name(name, None)?;
        self.pinned_stock = None;
        self.attributes.push(Attribute::new(name, values));
        self.regenerate();
        Ok(())
    }

    /// Removes the attribute at `index` and returns it.
    ///
    /// # Errors
    ///
    /// [`SessionError::AttributeIndexOutOfRange`].
    pub fn remove_attribute(&mut self, index: usize) -> Result<Attribute, SessionError> {
        self.check_index(index)?;
        self.pinned_stock = None;
        let removed = self.attributes.remove(index);
        self.regenerate();
        Ok(removed)
    }

    /// Renames the attribute at `index`. Existing variants keep their ids,
    /// SKUs and overrides.
    ///
    /// # Errors
    ///
    /// [`SessionError::AttributeIndexOutOfRange`],
    /// [`SessionError::EmptyAttributeName`] or
    /// [`SessionError::DuplicateAttributeName`].
    pub fn rename_attribute(&mut self, index: usize, name: &str) -> Result<(), SessionError> {
        self.check_index(index)?;
        let name = self.check_new_name(name, Some(index))?;
        self.pinned_stock = None;
        let old = std::mem::replace(&mut self.attributes[index].name, name.clone());
        self.rewrite_pairs(|pair| {
            if pair.name == old {
                pair.name.clone_from(&name);
            }
        });
        self.regenerate();
        Ok(())
    }

    /// Replaces the value list of the attribute at `index`.
    ///
    /// Variants whose combination disappears are dropped; new combinations
    /// get freshly allocated stock.
    ///
    /// # Errors
    ///
    /// [`SessionError::AttributeIndexOutOfRange`].
    pub fn set_attribute_values<I, V>(&mut self, index: usize, values: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.check_index(index)?;
        self.pinned_stock = None;
        self.attributes[index].values = values.into_iter().map(Into::into).collect();
        self.regenerate();
        Ok(())
    }

    /// Appends one value to the attribute at `index`.
    ///
    /// # Errors
    ///
    /// [`SessionError::AttributeIndexOutOfRange`] or
    /// [`SessionError::DuplicateValue`].
    pub fn add_value(&mut self, index: usize, value: &str) -> Result<(), SessionError> {
        self.check_index(index)?;
        let attribute = &mut self.attributes[index];
        if attribute.values.iter().any(|v| v == value) {
            return Err(SessionError::DuplicateValue {
                attribute: attribute.name.clone(),
                value: value.to_string(),
            });
        }
        attribute.values.push(value.to_string());
        self.pinned_stock = None;
        self.regenerate();
        Ok(())
    }

    /// Removes one value from the attribute at `index`.
    ///
    /// # Errors
    ///
    /// [`SessionError::AttributeIndexOutOfRange`] or
    /// [`SessionError::ValueNotFound`].
    pub fn remove_value(&mut self, index: usize, value: &str) -> Result<(), SessionError> {
        self.check_index(index)?;
        let attribute = &mut self.attributes[index];
        let Some(position) = attribute.values.iter().position(|v| v == value) else {
            return Err(SessionError::ValueNotFound {
                attribute: attribute.name.clone(),
                value: value.to_string(),
            });
        };
        attribute.values.remove(position);
        self.pinned_stock = None;
        self.regenerate();
        Ok(())
    }

    /// Renames one value of the attribute at `index`.
    ///
    /// Unlike removing and re-adding, a rename keeps the affected variants'
    /// ids, SKUs and overrides, and moves a parent-stock total to the new
    /// value.
    ///
    /// # Errors
    ///
    /// [`SessionError::AttributeIndexOutOfRange`],
    /// [`SessionError::ValueNotFound`] or [`SessionError::DuplicateValue`].
    pub fn rename_value(&mut self, index: usize, from: &str, to: &str) -> Result<(), SessionError> {
        self.check_index(index)?;
        let attribute = &mut self.attributes[index];
        let Some(position) = attribute.values.iter().position(|v| v == from) else {
            return Err(SessionError::ValueNotFound {
                attribute: attribute.name.clone(),
                value: from.to_string(),
            });
        };
        if from != to && attribute.values.iter().any(|v| v == to) {
            return Err(SessionError::DuplicateValue {
                attribute: attribute.name.clone(),
                value: to.to_string(),
            });
        }
        attribute.values[position] = to.to_string();
        let axis_name = attribute.name.clone();
        self.pinned_stock = None;

        if index == 0 {
            self.parent_stock.rename(from, to);
        }
        self.rewrite_pairs(|pair| {
            if pair.name == axis_name && pair.value == from {
                pair.value = to.to_string();
            }
        });
        self.regenerate();
        Ok(())
    }

    /// Moves the attribute at `from` to position `to`.
    ///
    /// Moving an axis into or out of first place changes which values key
    /// stock entry; totals entered for the old parent values stop applying.
    ///
    /// # Errors
    ///
    /// [`SessionError::AttributeIndexOutOfRange`] for either index.
    pub fn move_attribute(&mut self, from: usize, to: usize) -> Result<(), SessionError> {
        self.check_index(from)?;
        self.check_index(to)?;
        self.pinned_stock = None;
        let attribute = self.attributes.remove(from);
        self.attributes.insert(to, attribute);
        self.regenerate();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stock and globals
    // ------------------------------------------------------------------

    /// Records the total stock for one parent-axis value.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoParentAxis`] when there are no attributes.
    /// - [`SessionError::DegenerateParentAxis`] when the parent has no values.
    /// - [`SessionError::UnknownParentValue`] when `value` is not a parent value.
    pub fn set_parent_stock(&mut self, value: &str, total: u32) -> Result<(), SessionError> {
        let parent = self.attributes.first().ok_or(SessionError::NoParentAxis)?;
        if parent.is_degenerate() {
            return Err(SessionError::DegenerateParentAxis(parent.name.clone()));
        }
        if !parent.values.iter().any(|v| v == value) {
            return Err(SessionError::UnknownParentValue {
                attribute: parent.name.clone(),
                value: value.to_string(),
            });
        }
        self.parent_stock.set(value, total);
        self.pinned_stock = None;
        self.regenerate();
        Ok(())
    }

    pub fn set_global_price(&mut self, price: Decimal) {
        self.price = price;
        self.regenerate();
    }

    pub fn set_global_production_cost(&mut self, production_cost: Decimal) {
        self.production_cost = production_cost;
        self.regenerate();
    }

    /// Stock of the default variant, used while there are no attributes.
    pub fn set_default_stock(&mut self, stock: u32) {
        self.default_stock = stock;
        self.pinned_stock = None;
        self.regenerate();
    }

    /// Enables SKU assignment for variants that do not have one yet.
    pub fn set_sku_prefix(&mut self, prefix: Option<String>) {
        self.sku_prefix = prefix.filter(|p| !p.trim().is_empty());
        self.regenerate();
    }

    // ------------------------------------------------------------------
    // Per-variant overrides
    // ------------------------------------------------------------------

    /// Overrides the price of the variant described by `pairs`.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownCombination`] if no current variant matches.
    pub fn override_price(
        &mut self,
        pairs: &[AttributePair],
        price: Decimal,
    ) -> Result<(), SessionError> {
        self.update_override(pairs, |amounts| amounts.price = Amount::Overridden(price))
    }

    /// Overrides the production cost of the variant described by `pairs`.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownCombination`] if no current variant matches.
    pub fn override_production_cost(
        &mut self,
        pairs: &[AttributePair],
        production_cost: Decimal,
    ) -> Result<(), SessionError> {
        self.update_override(pairs, |amounts| {
            amounts.production_cost = Amount::Overridden(production_cost);
        })
    }

    /// Returns the variant described by `pairs` to the global price and cost.
    /// Returns `true` if an override was removed.
    pub fn clear_overrides(&mut self, pairs: &[AttributePair]) -> bool {
        let removed = self
            .overrides
            .remove(&CombinationKey::from_pairs(pairs))
            .is_some();
        if removed {
            self.regenerate();
        }
        removed
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validates the session and builds a create payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every problem that blocks a save.
    pub fn build_create(&self, details: &ProductDetails) -> Result<ProductCreate, ValidationErrors> {
        validate_submission(&Submission {
            details,
            price: self.price,
            production_cost: self.production_cost,
            attributes: &self.attributes,
            variants: &self.variants,
        })?;

        Ok(ProductCreate {
            name: details.name.trim().to_string(),
            description: details.description.trim().to_string(),
            categories: details
                .categories
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            price: self.price,
            production_cost: self.production_cost,
            attributes: self.attributes.clone(),
            variants: self.variants.clone(),
        })
    }

    /// Validates the session and builds an update payload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every problem that blocks a save.
    pub fn build_update(&self, details: &ProductDetails) -> Result<ProductUpdate, ValidationErrors> {
        self.build_create(details).map(ProductUpdate::from)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index < self.attributes.len() {
            Ok(())
        } else {
            Err(SessionError::AttributeIndexOutOfRange {
                index,
                len: self.attributes.len(),
            })
        }
    }

    fn check_new_name(&self, name: &str, skip: Option<usize>) -> Result<String, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyAttributeName);
        }
        let taken = self
            .attributes
            .iter()
            .enumerate()
            .any(|(i, attr)| Some(i) != skip && attr.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(SessionError::DuplicateAttributeName(name.to_string()));
        }
        Ok(name.to_string())
    }

    fn update_override<F>(&mut self, pairs: &[AttributePair], apply: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut VariantOverrides),
    {
        let key = CombinationKey::from_pairs(pairs);
        let Some(variant) = self.variants.iter().find(|v| CombinationKey::of(v) == key) else {
            return Err(SessionError::UnknownCombination(key.to_string()));
        };
        let attributes = variant.attributes.clone();
        let entry = self.overrides.entry(key).or_insert_with(|| OverrideEntry {
            attributes,
            amounts: VariantOverrides::default(),
        });
        apply(&mut entry.amounts);
        self.regenerate();
        Ok(())
    }

    /// Applies `edit` to every pair of the current variants and of recorded
    /// overrides, then rekeys the overrides.
    fn rewrite_pairs<F>(&mut self, edit: F)
    where
        F: Fn(&mut AttributePair),
    {
        for variant in &mut self.variants {
            variant.attributes.iter_mut().for_each(&edit);
        }
        self.overrides = std::mem::take(&mut self.overrides)
            .into_values()
            .map(|mut entry| {
                entry.attributes.iter_mut().for_each(&edit);
                (CombinationKey::from_pairs(&entry.attributes), entry)
            })
            .collect();
    }

    fn sku_ref(&self) -> String {
        self.product_id.clone().unwrap_or_else(|| {
            let simple = self.id.simple().to_string();
            simple[..8].to_string()
        })
    }

    /// Recomputes combinations and variants from scratch and reconciles them
    /// with the previous variant list.
    fn regenerate(&mut self) {
        if self.settings.prune_stale_stock {
            self.prune_stale();
        }

        if let Some(empty) = self.attributes.iter().find(|a| a.is_degenerate()) {
            tracing::warn!(
                session = %self.id,
                attribute = %empty.name,
                "attribute has no values; no combinations can be generated"
            );
        }

        let combinations = generate_combinations(&self.attributes);
        let globals = Globals {
            price: self.price,
            production_cost: self.production_cost,
            default_stock: self.default_stock,
        };
        let fresh = synthesize(&self.attributes, &combinations, &globals, &self.parent_stock);
        let amounts: HashMap<CombinationKey, VariantOverrides> = self
            .overrides
            .iter()
            .map(|(key, entry)| (key.clone(), entry.amounts))
            .collect();
        let outcome = reconcile(&self.variants, fresh, &amounts);

        let mut variants = outcome.variants;
        if let Some(prefix) = self.sku_prefix.as_deref() {
            let product_ref = self.sku_ref();
            for variant in variants.iter_mut().filter(|v| v.sku.is_none()) {
                variant.sku = Some(format_sku(prefix, &product_ref, &variant.attributes));
            }
        }
        if let Some(pinned) = &self.pinned_stock {
            for variant in &mut variants {
                if let Some(stock) = pinned.get(&CombinationKey::of(variant)) {
                    variant.stock = Some(*stock);
                }
            }
        }

        tracing::debug!(
            session = %self.id,
            axes = self.attributes.len(),
            combinations = combinations.len(),
            variants = variants.len(),
            matched = outcome.matched,
            added = outcome.added,
            dropped = outcome.dropped,
            "regenerated variant matrix"
        );

        self.combinations = combinations;
        self.variants = variants;
    }

    fn prune_stale(&mut self) {
        let parent_values: Vec<String> = self
            .attributes
            .first()
            .map(|a| a.values.clone())
            .unwrap_or_default();
        let removed = self.parent_stock.prune(&parent_values);
        if !removed.is_empty() {
            tracing::info!(session = %self.id, removed = ?removed, "pruned stale parent stock entries");
        }

        let live: HashSet<CombinationKey> = generate_combinations(&self.attributes)
            .iter()
            .map(|combo| {
                let pairs: Vec<AttributePair> = self
                    .attributes
                    .iter()
                    .zip(combo.values())
                    .map(|(attr, value)| AttributePair::new(attr.name.clone(), value.clone()))
                    .collect();
                CombinationKey::from_pairs(&pairs)
            })
            .collect();
        let before = self.overrides.len();
        self.overrides.retain(|key, _| live.contains(key));
        if self.overrides.len() < before {
            tracing::info!(
                session = %self.id,
                removed = before - self.overrides.len(),
                "pruned overrides for vanished combinations"
            );
        }
    }
}

fn differs(stored: Decimal, global: Decimal) -> Amount {
    if stored == global {
        Amount::Inherited
    } else {
        Amount::Overridden(stored)
    }
}
