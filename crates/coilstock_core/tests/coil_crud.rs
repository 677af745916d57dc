use chrono::{Duration, Utc};
use coilstock_core::db::{open_db, open_db_in_memory};
use coilstock_core::{
    CoilPatch, CoilRepository, CoilService, CoilServiceError, CoilValidationError, NewCoil,
    RepoError, SqliteCoilRepository,
};

#[test]
fn create_then_get_returns_fresh_record() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());

    let created = service.create(&NewCoil::new(100.0, 500.0)).unwrap();
    let loaded = service.get_by_id(created.id).unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.length, 100.0);
    assert_eq!(loaded.weight, 500.0);
    assert!(loaded.removed_at.is_none());
    assert!(loaded.updated_at.is_none());
}

#[test]
fn ids_are_assigned_by_storage_and_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());

    let first = service.create(&NewCoil::new(1.0, 1.0)).unwrap();
    let second = service.create(&NewCoil::new(2.0, 2.0)).unwrap();
    assert!(second.id > first.id);

    conn.execute("DELETE FROM coils WHERE id = ?1;", [second.id])
        .unwrap();
    let third = service.create(&NewCoil::new(3.0, 3.0)).unwrap();
    assert!(third.id > second.id);
}

#[test]
fn create_rejects_non_positive_dimensions_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoilRepository::try_new(&conn).unwrap();
    let service = CoilService::new(repo);

    let err = service.create(&NewCoil::new(0.0, 10.0)).unwrap_err();
    assert!(matches!(
        err,
        CoilServiceError::Validation(CoilValidationError::NonPositiveLength(_))
    ));
    let err = service.create(&NewCoil::new(10.0, -1.0)).unwrap_err();
    assert!(matches!(
        err,
        CoilServiceError::Validation(CoilValidationError::NonPositiveWeight(_))
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM coils;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn update_with_only_length_keeps_weight_and_stamps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());
    let created = service.create(&NewCoil::new(100.0, 500.0)).unwrap();

    let updated = service.update(created.id, &CoilPatch::length(120.0)).unwrap();
    assert_eq!(updated.length, 120.0);
    assert_eq!(updated.weight, 500.0);
    let updated_at = updated.updated_at.expect("updated_at should be stamped");
    assert!(updated_at >= updated.added_at);

    let loaded = service.get_by_id(created.id).unwrap();
    assert_eq!(loaded, updated);
}

#[test]
fn update_with_both_fields_replaces_both() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());
    let created = service.create(&NewCoil::new(100.0, 500.0)).unwrap();

    let patch = CoilPatch {
        length: Some(200.0),
        weight: Some(700.0),
    };
    let updated = service.update(created.id, &patch).unwrap();
    assert_eq!((updated.length, updated.weight), (200.0, 700.0));
    assert_eq!(updated.added_at, created.added_at);
}

#[test]
fn empty_update_still_stamps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());
    let created = service.create(&NewCoil::new(100.0, 500.0)).unwrap();

    let updated = service.update(created.id, &CoilPatch::default()).unwrap();
    assert_eq!(updated.length, 100.0);
    assert_eq!(updated.weight, 500.0);
    assert!(updated.updated_at.is_some());
}

#[test]
fn update_rejects_invalid_patch_and_leaves_record_untouched() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());
    let created = service.create(&NewCoil::new(100.0, 500.0)).unwrap();

    let err = service
        .update(created.id, &CoilPatch::weight(0.0))
        .unwrap_err();
    assert!(matches!(err, CoilServiceError::Validation(_)));
    assert_eq!(service.get_by_id(created.id).unwrap(), created);
}

#[test]
fn remove_sets_removed_at_and_second_remove_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());
    let created = service.create(&NewCoil::new(100.0, 500.0)).unwrap();

    let removed = service.remove(created.id).unwrap();
    let removed_at = removed.removed_at.expect("removed_at should be set");
    assert!(removed_at >= removed.added_at);

    let loaded = service.get_by_id(created.id).unwrap();
    assert_eq!(loaded.removed_at, Some(removed_at));

    let err = service.remove(created.id).unwrap_err();
    match err {
        CoilServiceError::AlreadyRemoved { id, removed_at: at } => {
            assert_eq!(id, created.id);
            assert_eq!(at, removed_at);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn removed_coils_can_still_be_updated_and_read() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());
    let created = service.create(&NewCoil::new(100.0, 500.0)).unwrap();
    let removed = service.remove(created.id).unwrap();

    let updated = service.update(created.id, &CoilPatch::weight(450.0)).unwrap();
    assert_eq!(updated.weight, 450.0);
    assert_eq!(updated.removed_at, removed.removed_at);
}

#[test]
fn operations_on_missing_id_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.get_by_id(42).unwrap_err(),
        CoilServiceError::NotFound(42)
    ));
    assert!(matches!(
        service.update(42, &CoilPatch::length(1.0)).unwrap_err(),
        CoilServiceError::NotFound(42)
    ));
    assert!(matches!(
        service.remove(42).unwrap_err(),
        CoilServiceError::NotFound(42)
    ));
}

#[test]
fn repository_writes_on_missing_row_report_absence() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoilRepository::try_new(&conn).unwrap();

    let err = repo
        .apply_patch(99, &CoilPatch::length(1.0), Utc::now())
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(99)));
    assert!(!repo.mark_removed(99, Utc::now()).unwrap());
    assert!(repo.get_coil(99).unwrap().is_none());
}

#[test]
fn removal_time_is_clamped_to_arrival() {
    let conn = open_db_in_memory().unwrap();
    let future = Utc::now() + Duration::days(1);
    conn.execute(
        "INSERT INTO coils (length, weight, added_at) VALUES (1.0, 1.0, ?1);",
        [future.timestamp_millis()],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    let service = CoilService::new(SqliteCoilRepository::try_new(&conn).unwrap());

    let removed = service.remove(id).unwrap();
    assert_eq!(removed.removed_at, Some(removed.added_at));
}

#[test]
fn update_from_another_connection_keeps_concurrent_removal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coils.db");
    let conn_a = open_db(&path).unwrap();
    let conn_b = open_db(&path).unwrap();
    let service_a = CoilService::new(SqliteCoilRepository::try_new(&conn_a).unwrap());
    let service_b = CoilService::new(SqliteCoilRepository::try_new(&conn_b).unwrap());

    let created = service_a.create(&NewCoil::new(10.0, 20.0)).unwrap();
    let before_removal = service_a.get_by_id(created.id).unwrap();
    assert!(before_removal.removed_at.is_none());

    let removed = service_b.remove(created.id).unwrap();
    let updated = service_a
        .update(created.id, &CoilPatch::length(11.0))
        .unwrap();

    assert_eq!(updated.length, 11.0);
    assert_eq!(updated.removed_at, removed.removed_at);
    let reloaded = service_b.get_by_id(created.id).unwrap();
    assert_eq!(reloaded.removed_at, removed.removed_at);
    assert_eq!(reloaded.length, 11.0);
}

#[test]
fn partial_updates_from_two_connections_both_land() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coils.db");
    let conn_a = open_db(&path).unwrap();
    let conn_b = open_db(&path).unwrap();
    let service_a = CoilService::new(SqliteCoilRepository::try_new(&conn_a).unwrap());
    let service_b = CoilService::new(SqliteCoilRepository::try_new(&conn_b).unwrap());

    let created = service_a.create(&NewCoil::new(10.0, 20.0)).unwrap();
    service_b
        .update(created.id, &CoilPatch::weight(25.0))
        .unwrap();
    let updated = service_a
        .update(created.id, &CoilPatch::length(12.0))
        .unwrap();

    assert_eq!((updated.length, updated.weight), (12.0, 25.0));
}

#[test]
fn racing_removal_from_another_connection_is_rejected_and_keeps_first_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coils.db");
    let conn_a = open_db(&path).unwrap();
    let conn_b = open_db(&path).unwrap();
    let repo_a = SqliteCoilRepository::try_new(&conn_a).unwrap();
    let service_a = CoilService::new(SqliteCoilRepository::try_new(&conn_a).unwrap());
    let service_b = CoilService::new(SqliteCoilRepository::try_new(&conn_b).unwrap());

    let created = service_a.create(&NewCoil::new(10.0, 20.0)).unwrap();
    let stale = repo_a.get_coil(created.id).unwrap().unwrap();
    assert!(stale.removed_at.is_none());

    let first = service_b.remove(created.id).unwrap();
    let first_removed_at = first.removed_at.unwrap();

    assert!(!repo_a
        .mark_removed(created.id, first_removed_at + Duration::seconds(30))
        .unwrap());

    match service_a.remove(created.id).unwrap_err() {
        CoilServiceError::AlreadyRemoved { id, removed_at } => {
            assert_eq!(id, created.id);
            assert_eq!(removed_at, first_removed_at);
        }
        other => panic!("unexpected error: {other}"),
    }
    let reloaded = service_b.get_by_id(created.id).unwrap();
    assert_eq!(reloaded.removed_at, Some(first_removed_at));
}
