use super::*;

#[test]
fn parses_matrix_command() {
    let cli = Cli::try_parse_from(["storefront-cli", "matrix", "--file", "shirt.yaml"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Matrix { ref file, json: false } if file == Path::new("shirt.yaml")
    ));
}

#[test]
fn parses_matrix_json_flag() {
    let cli = Cli::try_parse_from(["storefront-cli", "matrix", "--file", "a.yaml", "--json"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Matrix { json: true, .. }));
}

#[test]
fn matrix_requires_file() {
    assert!(Cli::try_parse_from(["storefront-cli", "matrix"]).is_err());
}

#[test]
fn parses_parse_sku_positional() {
    let cli = Cli::try_parse_from(["storefront-cli", "parse-sku", "TEE|42|Color-Red"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::ParseSku { ref sku } if sku == "TEE|42|Color-Red"
    ));
}

#[test]
fn parses_show_command() {
    let cli = Cli::try_parse_from(["storefront-cli", "show", "p-42"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Show { ref product_id, json: false } if product_id == "p-42"
    ));
}

#[test]
fn parses_submit_defaults_to_create() {
    let cli = Cli::try_parse_from(["storefront-cli", "submit", "--file", "shirt.yaml"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Submit {
            product_id: None,
            dry_run: false,
            ..
        }
    ));
}

#[test]
fn parses_submit_update_dry_run() {
    let cli = Cli::try_parse_from([
        "storefront-cli",
        "submit",
        "--file",
        "shirt.yaml",
        "--product-id",
        "p-7",
        "--dry-run",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Submit {
            ref product_id,
            dry_run: true,
            ..
        } if product_id.as_deref() == Some("p-7")
    ));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["storefront-cli"]).is_err());
}

#[test]
fn validated_passes_through_ok() {
    let value: Result<u8, storefront_variants::ValidationErrors> = Ok(3);
    assert_eq!(validated(value).unwrap(), 3);
}

#[test]
fn validated_counts_problems() {
    let errors = storefront_variants::ValidationErrors(vec![
        storefront_variants::ValidationError::MissingRequiredField("name"),
        storefront_variants::ValidationError::MissingRequiredField("description"),
    ]);
    let err = validated::<()>(Err(errors)).unwrap_err();
    assert_eq!(err.to_string(), "draft failed validation with 2 problem(s)");
}

#[test]
fn missing_config_is_deferred_to_online_commands() {
    let missing = Err(ConfigError::MissingEnvVar("STOREFRONT_API_BASE_URL".to_string()));
    let config = offline_tolerant(missing).expect("missing base url is not fatal");
    assert!(matches!(config, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn invalid_config_is_fatal() {
    let invalid = Err(ConfigError::InvalidEnvVar {
        var: "STOREFRONT_DEFAULT_STOCK".to_string(),
        reason: "invalid digit found in string".to_string(),
    });
    let err = offline_tolerant(invalid).unwrap_err();
    assert!(err.to_string().contains("STOREFRONT_DEFAULT_STOCK"), "{err}");
}
