use nattable_config::{ConfigError, Settings};
use nattable_core::{CalendarField, TextMatchMode};

#[test]
fn hand_written_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        r#"
        [grid]
        default_row_height = 24

        [fill_handle]
        date_field = "year"

        [filter]
        text_match_mode = "starts_with"
        case_sensitive = true
        conflation_interval_ms = 250
        "#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.grid.default_row_height, 24);
    assert_eq!(settings.grid.default_column_width, 100);
    assert_eq!(settings.fill_handle.date_field, CalendarField::Year);
    assert_eq!(settings.filter.text_match_mode, TextMatchMode::StartsWith);
    assert!(settings.filter.case_sensitive);
    assert_eq!(settings.filter.conflation_interval().as_millis(), 250);
    assert_eq!(settings.filter.text_delimiter, None);
}

#[test]
fn saved_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut settings = Settings::default();
    settings.filter.text_delimiter = Some("|".to_string());
    settings.fill_handle.date_field = CalendarField::Hour;
    settings.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[filter]"));
    assert_eq!(Settings::load(&path).unwrap(), settings);
}

#[test]
fn invalid_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[grid]\ndefault_column_width = \"wide\"\n").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("settings parse error"));
}
