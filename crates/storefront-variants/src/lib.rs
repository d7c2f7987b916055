//! Variant matrix engine: expands a product's attribute set into variants,
//! splits parent-level stock across them, and keeps per-variant data stable
//! while the attribute set is edited.

pub mod combinations;
pub mod error;
pub mod legacy;
pub mod reconcile;
pub mod session;
pub mod sku;
pub mod stock;
pub mod summary;
pub mod synthesize;
pub mod validate;

pub use combinations::{combination_count, generate_combinations, Combination};
pub use error::SessionError;
pub use legacy::{parse_from_sku, rebuild_attribute_set, recover_attributes};
pub use reconcile::{reconcile, Amount, CombinationKey, Reconciled, VariantOverrides};
pub use session::{EditingSession, EngineSettings};
pub use sku::format_sku;
pub use stock::{allocate, allocate_all, ParentStockMap};
pub use summary::{MatrixSummary, ParentSummary};
pub use synthesize::{synthesize, Globals};
pub use validate::{validate_submission, Submission, ValidationError, ValidationErrors};
