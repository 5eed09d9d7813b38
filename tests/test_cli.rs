use std::path::PathBuf;

use clap::Parser;

use sluice::cli::{Cli, Model};

#[test]
fn test_cli_port_and_docroot() {
    let cli = Cli::try_parse_from(["sluice", "8080", "/srv/www"]).unwrap();

    assert_eq!(cli.port, 8080);
    assert_eq!(cli.docroot, PathBuf::from("/srv/www"));
    assert_eq!(cli.model, Model::Async);
    assert!(cli.config.is_none());
}

#[test]
fn test_cli_explicit_async_model_and_config() {
    let cli = Cli::try_parse_from(["sluice", "80", "www", "async", "--config", "sluice.yaml"]).unwrap();

    assert_eq!(cli.model, Model::Async);
    assert_eq!(cli.config, Some(PathBuf::from("sluice.yaml")));
}

#[test]
fn test_cli_rejects_other_models() {
    for model in ["nothread", "nopool", "pool"] {
        assert!(Cli::try_parse_from(["sluice", "8080", "www", model]).is_err(), "{model}");
    }
}

#[test]
fn test_cli_rejects_missing_or_bad_arguments() {
    assert!(Cli::try_parse_from(["sluice"]).is_err());
    assert!(Cli::try_parse_from(["sluice", "8080"]).is_err());
    assert!(Cli::try_parse_from(["sluice", "http", "www"]).is_err());
    assert!(Cli::try_parse_from(["sluice", "70000", "www"]).is_err());
}
