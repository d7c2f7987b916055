//! Submission checks run before a product payload leaves the session.
//!
//! Every problem is collected rather than stopping at the first, so the
//! merchant sees the full list at once.

use std::fmt;

use rust_decimal::Decimal;
use storefront_core::{Attribute, ProductDetails, Variant};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero (got {value})")]
    InvalidGlobalValue { field: &'static str, value: Decimal },

    #[error("variant {variant} has invalid stock {}", display_stock(.stock))]
    InvalidStock { variant: String, stock: Option<i64> },

    #[error("variant {variant} has non-positive {field} override {value}")]
    InvalidOverride {
        variant: String,
        field: &'static str,
        value: Decimal,
    },

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("attribute '{0}' has no values")]
    DegenerateAttribute(String),

    #[error("attribute at position {0} has no name")]
    UnnamedAttribute(usize),

    #[error("attribute '{attribute}' lists value '{value}' more than once")]
    DuplicateAttributeValue { attribute: String, value: String },
}

fn display_stock(stock: &Option<i64>) -> String {
    stock.map_or_else(|| "null".to_string(), |s| s.to_string())
}

/// Every problem that blocks a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
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

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Everything submission validation looks at.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    pub details: &'a ProductDetails,
    pub price: Decimal,
    pub production_cost: Decimal,
    pub attributes: &'a [Attribute],
    pub variants: &'a [Variant],
}

/// Checks a submission and returns every blocking problem.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing each problem found; the list is never
/// empty when returned.
pub fn validate_submission(submission: &Submission<'_>) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    let details = submission.details;
    if details.name.trim().is_empty() {
        errors.push(ValidationError::MissingRequiredField("name"));
    }
    if details.description.trim().is_empty() {
        errors.push(ValidationError::MissingRequiredField("description"));
    }
    if !details.categories.iter().any(|c| !c.trim().is_empty()) {
        errors.push(ValidationError::MissingRequiredField("category"));
    }

    if submission.price <= Decimal::ZERO {
        errors.push(ValidationError::InvalidGlobalValue {
            field: "price",
            value: submission.price,
        });
    }
    if submission.production_cost <= Decimal::ZERO {
        errors.push(ValidationError::InvalidGlobalValue {
            field: "production cost",
            value: submission.production_cost,
        });
    }

    for (position, attribute) in submission.attributes.iter().enumerate() {
        if attribute.name.trim().is_empty() {
            errors.push(ValidationError::UnnamedAttribute(position));
        }
        if attribute.is_degenerate() {
            errors.push(ValidationError::DegenerateAttribute(attribute.name.clone()));
        }
        for value in attribute.duplicate_values() {
            errors.push(ValidationError::DuplicateAttributeValue {
                attribute: attribute.name.clone(),
                value: value.to_string(),
            });
        }
    }

    for variant in submission.variants {
        if !matches!(variant.stock, Some(s) if s >= 0) {
            errors.push(ValidationError::InvalidStock {
                variant: variant.title(),
                stock: variant.stock,
            });
        }
        if variant.price <= Decimal::ZERO && variant.price != submission.price {
            errors.push(ValidationError::InvalidOverride {
                variant: variant.title(),
                field: "price",
                value: variant.price,
            });
        }
        if variant.production_cost <= Decimal::ZERO
            && variant.production_cost != submission.production_cost
        {
            errors.push(ValidationError::InvalidOverride {
                variant: variant.title(),
                field: "production cost",
                value: variant.production_cost,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use storefront_core::AttributePair;

    use super::*;

    fn details() -> ProductDetails {
        ProductDetails {
            name: "Linen Shirt".to_string(),
            description: "Breathable".to_string(),
            categories: vec!["shirts".to_string()],
        }
    }

    fn variant(stock: Option<i64>) -> Variant {
        Variant {
            id: None,
            sku: None,
            stock,
            price: Decimal::new(2000, 2),
            production_cost: Decimal::new(800, 2),
            attributes: vec![AttributePair::new("Size", "M")],
        }
    }

    fn submission<'a>(
        details: &'a ProductDetails,
        attributes: &'a [Attribute],
        variants: &'a [Variant],
    ) -> Submission<'a> {
        Submission {
            details,
            price: Decimal::new(2000, 2),
            production_cost: Decimal::new(800, 2),
            attributes,
            variants,
        }
    }

    #[test]
    fn valid_submission_passes() {
        let details = details();
        let attributes = vec![Attribute::new("Size", ["M"])];
        let variants = vec![variant(Some(0))];
        assert!(validate_submission(&submission(&details, &attributes, &variants)).is_ok());
    }

    #[test]
    fn non_positive_globals_are_rejected() {
        let details = details();
        let variants = vec![variant(Some(1))];
        let mut sub = submission(&details, &[], &variants);
        sub.price = Decimal::ZERO;
        sub.production_cost = Decimal::new(-1, 0);
        let err = validate_submission(&sub).unwrap_err();
        assert!(err.errors().contains(&ValidationError::InvalidGlobalValue {
            field: "price",
            value: Decimal::ZERO,
        }));
        assert!(err
            .errors()
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidGlobalValue { field: "production cost", .. })));
    }

    #[test]
    fn null_and_negative_stock_are_rejected() {
        let details = details();
        let variants = vec![variant(None), variant(Some(-1)), variant(Some(3))];
        let err = validate_submission(&submission(&details, &[], &variants)).unwrap_err();
        let stock_errors: Vec<_> = err
            .errors()
            .iter()
            .filter(|e| matches!(e, ValidationError::InvalidStock { .. }))
            .collect();
        assert_eq!(stock_errors.len(), 2);
        assert!(err.to_string().contains("invalid stock null"));
    }

    #[test]
    fn missing_required_fields_are_each_reported() {
        let empty = ProductDetails::default();
        let variants = vec![variant(Some(1))];
        let err = validate_submission(&submission(&empty, &[], &variants)).unwrap_err();
        for field in ["name", "description", "category"] {
            assert!(
                err.errors()
                    .contains(&ValidationError::MissingRequiredField(field)),
                "missing {field}: {err}"
            );
        }
    }

    #[test]
    fn blank_category_does_not_count() {
        let mut details = details();
        details.categories = vec!["  ".to_string()];
        let variants = vec![variant(Some(1))];
        let err = validate_submission(&submission(&details, &[], &variants)).unwrap_err();
        assert_eq!(
            err.errors(),
            &[ValidationError::MissingRequiredField("category")]
        );
    }

    #[test]
    fn degenerate_and_duplicate_attributes_are_reported() {
        let details = details();
        let attributes = vec![
            Attribute::new("Color", Vec::<String>::new()),
            Attribute::new("Size", ["S", "S"]),
        ];
        let variants = vec![variant(Some(1))];
        let err = validate_submission(&submission(&details, &attributes, &variants)).unwrap_err();
        assert!(err
            .errors()
            .contains(&ValidationError::DegenerateAttribute("Color".to_string())));
        assert!(err
            .errors()
            .contains(&ValidationError::DuplicateAttributeValue {
                attribute: "Size".to_string(),
                value: "S".to_string(),
            }));
    }

    #[test]
    fn unnamed_attribute_is_reported() {
        let details = details();
        let attributes = vec![
            Attribute::new("Size", ["M"]),
            Attribute::new(" ", ["c22ecfbd"]),
        ];
        let variants = vec![variant(Some(1))];
        let err = validate_submission(&submission(&details, &attributes, &variants)).unwrap_err();
        assert_eq!(err.errors(), &[ValidationError::UnnamedAttribute(1)]);
        assert!(err.to_string().contains("position 1 has no name"));
    }

    #[test]
    fn non_positive_override_is_rejected() {
        let details = details();
        let mut bad = variant(Some(1));
        bad.price = Decimal::ZERO;
        let variants = vec![bad];
        let err = validate_submission(&submission(&details, &[], &variants)).unwrap_err();
        assert!(matches!(
            err.errors(),
            [ValidationError::InvalidOverride { field: "price", .. }]
        ));
    }
}
