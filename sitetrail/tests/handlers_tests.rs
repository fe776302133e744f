use sitetrail::handlers::*;
use sitetrail_core::config::{Settings, StoreKind};
use sitetrail_core::data::Database;
use sitetrail_core::report::ReportFormat;
use sitetrail_core::search::SearchStrategy;
use std::fs;
use tempfile::TempDir;

fn settings_in(dir: &TempDir) -> Settings {
    Settings::default().with_data_dir(&dir.path().to_string_lossy())
}

#[test]
fn test_parse_seed_normalizes() {
    assert_eq!(parse_seed("www.ui.ac.id/").unwrap(), "https://ui.ac.id");
    assert_eq!(
        parse_seed("  http://example.com/docs/ ").unwrap(),
        "http://example.com/docs"
    );
}

#[test]
fn test_parse_seed_rejects_blank() {
    assert!(parse_seed("").is_err());
    assert!(parse_seed("   ").is_err());
}

#[test]
fn test_parse_seed_rejects_invalid() {
    assert!(parse_seed("not a valid url!!!").is_err());
}

#[test]
fn test_parse_report_format() {
    assert_eq!(parse_report_format("md").unwrap(), ReportFormat::Markdown);
    assert_eq!(parse_report_format("json").unwrap(), ReportFormat::Json);
    assert!(parse_report_format("csv").is_err());
}

#[test]
fn test_parse_strategy() {
    assert_eq!(parse_strategy("dfs").unwrap(), SearchStrategy::Dfs);
    assert!(parse_strategy("random").is_err());
}

#[test]
fn test_init_creates_layout() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let settings = settings_in(&temp_dir);

    let summary = init_data_dir(&settings, false)?;

    assert!(summary.json_dir.is_dir());
    assert!(Database::exists(&summary.database));
    assert!(!summary.removed_existing);
    Ok(())
}

#[test]
fn test_init_keeps_data_without_force() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let settings = settings_in(&temp_dir);
    init_data_dir(&settings, false)?;
    let marker = settings.json_store_dir().join("crawled_data_keep.json");
    fs::write(&marker, "[]")?;

    init_data_dir(&settings, false)?;
    assert!(marker.exists());
    Ok(())
}

#[test]
fn test_init_force_wipes_existing_data() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let settings = settings_in(&temp_dir);
    init_data_dir(&settings, false)?;
    let marker = settings.json_store_dir().join("crawled_data_old.json");
    fs::write(&marker, "[]")?;

    let summary = init_data_dir(&settings, true)?;

    assert!(summary.removed_existing);
    assert!(!marker.exists());
    assert!(summary.json_dir.is_dir());
    assert!(Database::exists(&summary.database));
    Ok(())
}

#[test]
fn test_settings_paths() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = settings_in(&temp_dir);
    settings.store = StoreKind::Sqlite;

    assert_eq!(settings.database_path(), temp_dir.path().join("sitetrail.db"));
    assert_eq!(settings.json_store_dir(), temp_dir.path().join("data"));
}

#[test]
fn test_emit_writes_output_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("out.json");

    emit("{\"ok\": true}", Some(&path), false)?;
    assert_eq!(fs::read_to_string(&path)?, "{\"ok\": true}");
    Ok(())
}
