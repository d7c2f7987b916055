use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use storefront_client::CatalogClient;
use storefront_core::{AppConfig, ConfigError};
use storefront_variants::{parse_from_sku, reconcile, recover_attributes, EditingSession, EngineSettings};
use tracing_subscriber::EnvFilter;

mod draft;
mod report;

use draft::DraftFile;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Product variant matrix command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the variant matrix for a draft file and print it
    Matrix {
        /// Path to the YAML draft
        #[arg(long)]
        file: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the attributes recoverable from a SKU
    ParseSku {
        sku: String,
    },
    /// Fetch a stored product and print its rebuilt matrix
    Show {
        product_id: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate a draft and create or update the product
    Submit {
        /// Path to the YAML draft
        #[arg(long)]
        file: PathBuf,
        /// Update this stored product instead of creating a new one
        #[arg(long)]
        product_id: Option<String>,
        /// Validate and print the payload without calling the API
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = offline_tolerant(storefront_core::load_app_config_from_env())?;

    let log_level = config
        .as_ref()
        .map_or_else(|_| "info".to_string(), |c| c.log_level.clone());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = config
        .as_ref()
        .map(EngineSettings::from_app_config)
        .unwrap_or_default();

    match cli.command {
        Commands::Matrix { file, json } => run_matrix(&file, settings, json),
        Commands::ParseSku { sku } => {
            run_parse_sku(&sku);
            Ok(())
        }
        Commands::Show { product_id, json } => {
            let config = config?;
            run_show(&config, &product_id, json).await
        }
        Commands::Submit {
            file,
            product_id,
            dry_run,
        } => {
            if dry_run {
                run_submit_dry_run(&file, settings, product_id.as_deref())
            } else {
                let config = config?;
                run_submit(&config, &file, product_id.as_deref()).await
            }
        }
    }
}

fn load_session(file: &Path, settings: EngineSettings) -> anyhow::Result<(DraftFile, EditingSession)> {
    let draft = DraftFile::from_path(file)?;
    let session = draft
        .to_session(settings)
        .map_err(|e| anyhow::anyhow!("draft {} cannot be applied: {e}", file.display()))?;
    Ok((draft, session))
}

fn run_matrix(file: &Path, settings: EngineSettings, json: bool) -> anyhow::Result<()> {
    let (_, session) = load_session(file, settings)?;
    if json {
        report::print_json(&session)
    } else {
        report::print_table(&session);
        Ok(())
    }
}

fn run_parse_sku(sku: &str) {
    let pairs = parse_from_sku(sku);
    if pairs.is_empty() {
        println!("no attributes recoverable from '{sku}'");
        return;
    }
    for pair in pairs {
        if pair.name.is_empty() {
            println!("(unnamed) = {}", pair.value);
        } else {
            println!("{} = {}", pair.name, pair.value);
        }
    }
}

async fn run_show(config: &AppConfig, product_id: &str, json: bool) -> anyhow::Result<()> {
    let client = CatalogClient::new(config)
        .map_err(|e| anyhow::anyhow!("failed to build catalog client: {e}"))?;
    let product = client.get_product(product_id).await?;
    let session = EditingSession::from_product(&product, EngineSettings::from_app_config(config));
    if json {
        report::print_json(&session)
    } else {
        println!("{} ({})", product.name, product.categories.join(", "));
        report::print_table(&session);
        Ok(())
    }
}

fn run_submit_dry_run(
    file: &Path,
    settings: EngineSettings,
    product_id: Option<&str>,
) -> anyhow::Result<()> {
    let (draft, session) = load_session(file, settings)?;
    let details = draft.details();
    let payload = match product_id {
        Some(_) => serde_json::to_string_pretty(&validated(session.build_update(&details))?)?,
        None => serde_json::to_string_pretty(&validated(session.build_create(&details))?)?,
    };
    println!("dry-run: payload is valid");
    println!("{payload}");
    Ok(())
}

async fn run_submit(config: &AppConfig, file: &Path, product_id: Option<&str>) -> anyhow::Result<()> {
    let (draft, session) = load_session(file, EngineSettings::from_app_config(config))?;
    let details = draft.details();
    let client = CatalogClient::new(config)
        .map_err(|e| anyhow::anyhow!("failed to build catalog client: {e}"))?;

    let saved = if let Some(id) = product_id {
        let mut payload = validated(session.build_update(&details))?;
        // Stored variants keep their ids wherever the combination survived.
        let stored = client.get_product(id).await?;
        let previous: Vec<_> = stored
            .variants
            .iter()
            .map(|v| storefront_core::Variant {
                attributes: recover_attributes(v),
                ..v.clone()
            })
            .collect();
        let outcome = reconcile(&previous, payload.variants, &HashMap::new());
        tracing::info!(
            product_id = id,
            matched = outcome.matched,
            added = outcome.added,
            dropped = outcome.dropped,
            "submitting product update"
        );
        payload.variants = outcome.variants;
        client.update_product(id, &payload).await?
    } else {
        let payload = validated(session.build_create(&details))?;
        tracing::info!(variants = payload.variants.len(), "submitting new product");
        client.create_product(&payload).await?
    };

    println!(
        "saved product {} with {} variant(s)",
        saved.id,
        saved.variant_count()
    );
    Ok(())
}

/// Fails on a malformed setting but hands a missing one back to the caller,
/// since only the commands that reach the catalog API need a base URL.
fn offline_tolerant(
    config: Result<AppConfig, ConfigError>,
) -> anyhow::Result<Result<AppConfig, ConfigError>> {
    match config {
        Err(ConfigError::InvalidEnvVar { var, reason }) => {
            anyhow::bail!("invalid configuration: {var}: {reason}")
        }
        other => Ok(other),
    }
}

/// Prints every validation problem and turns the result into an error.
fn validated<T>(result: Result<T, storefront_variants::ValidationErrors>) -> anyhow::Result<T> {
    result.map_err(|errors| {
        for error in errors.errors() {
            eprintln!("  - {error}");
        }
        anyhow::anyhow!("draft failed validation with {} problem(s)", errors.len())
    })
}

#[cfg(test)]
mod tests;
