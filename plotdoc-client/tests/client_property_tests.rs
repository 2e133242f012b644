use plotdoc_client::config::{ConfigError, PlotdocConfig};
use plotdoc_client::report;
use plotdoc_client::Invocation;
use plotdoc_core::PropertyId;
use plotdoc_resolve::{Collaborators, SessionConfig, Workspace};
use plotdoc_storage::MockCategorySource;
use plotdoc_test_utils::fixtures::legacy_property;
use proptest::prelude::*;
use std::io::Write;
use std::sync::Arc;

fn config_toml(resolve_limit: u32, list_page_size: u32, auth: &str) -> String {
    format!(
        r#"
api_base_url = "http://localhost:8080/"
request_timeout_ms = 2500
resolve_limit = {resolve_limit}
list_page_size = {list_page_size}

[auth]
{auth}

[logging]
filter = "info"
json = true
"#
    )
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn config_loads_from_explicit_path() {
    let file = write_config(&config_toml(50, 10, r#"jwt = "token""#));
    let config = PlotdocConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.resolve_limit, 50);
    assert!(config.logging.json);
    assert_eq!(config.session_config().list_page_size, 10);
}

#[test]
fn config_load_validates() {
    let file = write_config(&config_toml(0, 10, r#"api_key = "key""#));
    assert!(matches!(
        PlotdocConfig::load(Some(file.path())),
        Err(ConfigError::InvalidValue {
            field: "resolve_limit",
            ..
        })
    ));
}

#[test]
fn config_requires_auth() {
    let file = write_config(&config_toml(10, 10, ""));
    assert!(matches!(
        PlotdocConfig::load(Some(file.path())),
        Err(ConfigError::InvalidValue { field: "auth", .. })
    ));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        PlotdocConfig::load(Some(&path)),
        Err(ConfigError::Io(_))
    ));
}

#[tokio::test]
async fn report_lists_every_unit_in_catalog_order() {
    let (units, documents) = legacy_property();
    let mut workspace = Workspace::new(
        Collaborators {
            documents,
            units,
            categories: Arc::new(MockCategorySource::new(Vec::new())),
        },
        SessionConfig::default(),
    );
    let session = workspace.open_property(PropertyId::new(42)).await;
    let load = session.load_all().await;

    let lines: Vec<String> = report::lines(session.catalog(), &load)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lines,
        vec![
            "land_plot 7 A-101 loaded 1".to_string(),
            "land_plot 12 B-12 empty 0".to_string(),
        ]
    );
}

proptest! {
    #[test]
    fn positive_limits_always_validate(resolve_limit in 1u32..=1000, list_page_size in 1u32..=500) {
        let config = PlotdocConfig::from_toml_str(&config_toml(resolve_limit, list_page_size, r#"api_key = "k""#)).unwrap();
        prop_assert!(config.validate().is_ok());
        let session = config.session_config();
        prop_assert_eq!(session.resolve_limit, resolve_limit);
        prop_assert_eq!(session.list_page_size, list_page_size);
    }

    #[test]
    fn invocation_accepts_any_property_id(id in 1i64..i64::MAX, with_config in any::<bool>()) {
        let mut args = Vec::new();
        if with_config {
            args.push("--config".to_string());
            args.push("plotdoc.toml".to_string());
        }
        args.push(id.to_string());
        let invocation = Invocation::parse(args).unwrap();
        prop_assert_eq!(invocation.property_id, PropertyId::new(id));
        prop_assert_eq!(invocation.config_path.is_some(), with_config);
    }
}
