//! End-to-end editing scenarios through the public `EditingSession` API.

use rust_decimal::Decimal;
use storefront_core::{AttributePair, ProductDetails};
use storefront_variants::{
    combination_count, parse_from_sku, CombinationKey, EditingSession, EngineSettings,
    SessionError, ValidationError,
};

fn settings() -> EngineSettings {
    EngineSettings {
        default_stock: 0,
        prune_stale_stock: false,
    }
}

fn hoodie() -> EditingSession {
    let mut session = EditingSession::new(settings());
    session.set_global_price(Decimal::new(4500, 2));
    session.set_global_production_cost(Decimal::new(1800, 2));
    session.add_attribute("Color", ["Black", "Grey"]).unwrap();
    session.add_attribute("Size", ["S", "M", "L"]).unwrap();
    session.add_attribute("Fit", ["Regular", "Oversized"]).unwrap();
    session
}

fn details() -> ProductDetails {
    ProductDetails {
        name: "Heavy Hoodie".to_string(),
        description: "400gsm fleece".to_string(),
        categories: vec!["outerwear".to_string()],
    }
}

#[test]
fn variant_count_matches_combination_count() {
    let session = hoodie();
    assert_eq!(session.variants().len(), 12);
    assert_eq!(combination_count(session.attributes()), 12);
}

#[test]
fn variant_keys_are_unique() {
    let session = hoodie();
    let mut keys: Vec<CombinationKey> = session.variants().iter().map(CombinationKey::of).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), session.variants().len());
}

#[test]
fn parent_totals_are_conserved_across_edits() {
    let mut session = hoodie();
    session.set_parent_stock("Black", 25).unwrap();
    session.set_parent_stock("Grey", 6).unwrap();

    let total_for = |s: &EditingSession, parent: &str| -> i64 {
        s.variants()
            .iter()
            .filter(|v| v.parent_value() == Some(parent))
            .filter_map(|v| v.stock)
            .sum()
    };

    assert_eq!(total_for(&session, "Black"), 25);
    assert_eq!(total_for(&session, "Grey"), 6);

    session.add_value(1, "XL").unwrap();
    session.remove_value(2, "Oversized").unwrap();
    assert_eq!(total_for(&session, "Black"), 25);
    assert_eq!(total_for(&session, "Grey"), 6);

    let summary = session.summary();
    assert_eq!(summary.total_stock, 31);
    assert!(summary
        .parents
        .iter()
        .all(|p| i64::from(p.entered) == p.allocated));
}

#[test]
fn rejected_mutation_leaves_session_untouched() {
    let mut session = hoodie();
    let before = session.variants().to_vec();
    assert!(matches!(
        session.remove_value(1, "XXL"),
        Err(SessionError::ValueNotFound { .. })
    ));
    assert_eq!(session.variants(), before.as_slice());
}

#[test]
fn emptied_axis_blocks_submission() {
    let mut session = hoodie();
    session.set_attribute_values(2, Vec::<String>::new()).unwrap();
    assert_eq!(session.variants().len(), 1);

    let err = session.build_create(&details()).unwrap_err();
    assert!(err
        .errors()
        .contains(&ValidationError::DegenerateAttribute("Fit".to_string())));
}

#[test]
fn generated_skus_parse_back_to_variant_pairs() {
    let mut session = hoodie();
    session.set_sku_prefix(Some("HOOD".to_string()));
    for variant in session.variants() {
        let sku = variant.sku.as_deref().unwrap();
        assert_eq!(parse_from_sku(sku), variant.attributes, "{sku}");
    }
}

#[test]
fn submission_round_trips_through_json() {
    let mut session = hoodie();
    session.set_parent_stock("Black", 4).unwrap();
    session
        .override_price(
            &[
                AttributePair::new("Color", "Grey"),
                AttributePair::new("Size", "L"),
                AttributePair::new("Fit", "Oversized"),
            ],
            Decimal::new(5000, 2),
        )
        .unwrap();

    let payload = session.build_update(&details()).unwrap();
    let json = serde_json::to_string(&payload).unwrap();
    let back: storefront_core::ProductUpdate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, payload);
    assert_eq!(
        back.variants
            .iter()
            .filter(|v| v.price == Decimal::new(5000, 2))
            .count(),
        1
    );
}
