//! Terminal and JSON rendering of a session's variant matrix.

use serde::Serialize;
use storefront_core::{Attribute, Variant};
use storefront_variants::{EditingSession, MatrixSummary};

/// Everything printed for a matrix, in the shape emitted by `--json`.
#[derive(Debug, Serialize)]
pub(crate) struct MatrixReport<'a> {
    pub product_id: Option<&'a str>,
    pub attributes: &'a [Attribute],
    pub variants: &'a [Variant],
    pub summary: MatrixSummary,
}

impl<'a> MatrixReport<'a> {
    pub(crate) fn new(session: &'a EditingSession) -> Self {
        Self {
            product_id: session.product_id(),
            attributes: session.attributes(),
            variants: session.variants(),
            summary: session.summary(),
        }
    }
}

pub(crate) fn print_json(session: &EditingSession) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&MatrixReport::new(session))?
    );
    Ok(())
}

pub(crate) fn print_table(session: &EditingSession) {
    for line in render_table(session) {
        println!("{line}");
    }
}

fn render_table(session: &EditingSession) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(id) = session.product_id() {
        lines.push(format!("product: {id}"));
    }
    if session.attributes().is_empty() {
        lines.push("attributes: (none)".to_string());
    }
    for (i, attribute) in session.attributes().iter().enumerate() {
        let marker = if i == 0 { " (parent)" } else { "" };
        lines.push(format!(
            "{}{marker}: {}",
            attribute.name,
            attribute.values.join(", ")
        ));
    }
    lines.push(String::new());

    lines.push(format!(
        "{:<28} {:<36} {:>6} {:>10} {:>10}",
        "VARIANT", "SKU", "STOCK", "PRICE", "COST"
    ));
    for variant in session.variants() {
        lines.push(format!(
            "{:<28} {:<36} {:>6} {:>10} {:>10}",
            variant.title(),
            variant.sku.as_deref().unwrap_or("-"),
            variant
                .stock
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
            variant.price,
            variant.production_cost,
        ));
    }

    let summary = session.summary();
    lines.push(String::new());
    lines.push(format!(
        "{} variant(s), {} unit(s) in stock",
        summary.variant_count, summary.total_stock
    ));
    for parent in &summary.parents {
        lines.push(format!(
            "  {}: {} entered over {} sibling(s), {} allocated",
            parent.value, parent.entered, parent.siblings, parent.allocated
        ));
    }
    if !summary.stale_keys.is_empty() {
        lines.push(format!(
            "  stale stock entries: {}",
            summary.stale_keys.join(", ")
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use storefront_variants::EngineSettings;

    use super::*;

    #[test]
    fn table_lists_every_variant_and_totals() {
        let mut session = EditingSession::new(EngineSettings::default());
        session.add_attribute("Color", ["Red", "Blue"]).unwrap();
        session.add_attribute("Size", ["S", "M"]).unwrap();
        session.set_parent_stock("Red", 5).unwrap();

        let lines = render_table(&session);
        assert!(lines.iter().any(|l| l == "Color (parent): Red, Blue"));
        assert!(lines.iter().any(|l| l.starts_with("Red / S")));
        assert!(lines.iter().any(|l| l.starts_with("Blue / M")));
        assert!(lines.iter().any(|l| l == "4 variant(s), 5 unit(s) in stock"));
        assert!(lines
            .iter()
            .any(|l| l == "  Red: 5 entered over 2 sibling(s), 5 allocated"));
    }

    #[test]
    fn json_report_carries_summary() {
        let session = EditingSession::new(EngineSettings {
            default_stock: 3,
            prune_stale_stock: false,
        });
        let value = serde_json::to_value(MatrixReport::new(&session)).unwrap();
        assert_eq!(value["summary"]["total_stock"], 3);
        assert_eq!(value["variants"].as_array().map(Vec::len), Some(1));
        assert!(value["product_id"].is_null());
    }
}
