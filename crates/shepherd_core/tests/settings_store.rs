use shepherd_core::db::open_db_in_memory;
use shepherd_core::repo::settings_repo::SettingsRepository;
use shepherd_core::{
    CategoryThresholds, Settings, SettingsService, SettingsServiceError, SqliteStore,
    ValidationError,
};

#[test]
fn fresh_store_returns_default_settings() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();

    let settings = SettingsService::new(store).settings().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.access_password, "123456");
    assert_eq!(settings.thresholds.critical, 5);
}

#[test]
fn thresholds_update_persists_and_keeps_password() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let service = SettingsService::new(store);

    service.update_access_password("  s3cret ").unwrap();
    let thresholds = CategoryThresholds {
        regular: 0,
        attention: 2,
        low: 4,
        critical: 8,
    };
    service.update_thresholds(thresholds).unwrap();

    let stored = store.get_settings().unwrap();
    assert_eq!(stored.thresholds, thresholds);
    assert_eq!(stored.access_password, "s3cret");
}

#[test]
fn non_ascending_thresholds_are_rejected_and_not_stored() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let service = SettingsService::new(store);

    let err = service
        .update_thresholds(CategoryThresholds {
            regular: 0,
            attention: 3,
            low: 3,
            critical: 5,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        SettingsServiceError::Validation(ValidationError::ThresholdsNotAscending { .. })
    ));
    assert_eq!(store.get_settings().unwrap(), Settings::default());
}

#[test]
fn blank_password_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();

    let err = SettingsService::new(store)
        .update_access_password("   ")
        .unwrap_err();
    assert!(matches!(
        err,
        SettingsServiceError::Validation(ValidationError::BlankPassword)
    ));
}

#[test]
fn corrupted_settings_row_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO settings (id, regular_floor, attention_floor, low_floor, critical_floor, access_password)
         VALUES (1, 0, -1, 3, 5, 'x');",
    )
    .unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();

    assert!(store.get_settings().is_err());
}
