// ==========================================
// Repository integration tests
// ==========================================
// Exercises the rusqlite implementations against temporary
// databases: partition activation invariant, template
// persistence, ordinal allocation, lookup upserts.
// ==========================================

mod test_helpers;

use manifest_registry::domain::types::{EntryField, SheetFormat};
use manifest_registry::domain::ImportTemplate;
use manifest_registry::repository::{
    EntryRepository, EntryRepositoryImpl, LookupRepository, LookupRepositoryImpl,
    PartitionRepository, PartitionRepositoryImpl, RepositoryError, TemplateRepository,
    TemplateRepositoryImpl,
};
use std::collections::BTreeMap;

// ==========================================
// Partition repository
// ==========================================

#[tokio::test]
async fn test_partition_create_and_duplicate_year_rejected() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = PartitionRepositoryImpl::new(&db_path).unwrap();

    let p = repo.create(2025).await.unwrap();
    assert_eq!(p.year, 2025);
    assert!(!p.is_active);

    let err = repo.create(2025).await.unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}

#[tokio::test]
async fn test_partition_activation_is_exclusive() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = PartitionRepositoryImpl::new(&db_path).unwrap();

    repo.create(2024).await.unwrap();
    repo.create(2025).await.unwrap();

    repo.activate(2024).await.unwrap();
    repo.activate(2025).await.unwrap();

    let active: Vec<_> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.is_active)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].year, 2025);
}

#[tokio::test]
async fn test_partition_resolve_target_prefers_active_else_latest() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = PartitionRepositoryImpl::new(&db_path).unwrap();

    assert!(repo.resolve_target().await.unwrap().is_none());

    repo.create(2023).await.unwrap();
    repo.create(2025).await.unwrap();
    // none active: most recent year wins
    assert_eq!(repo.resolve_target().await.unwrap().unwrap().year, 2025);

    repo.activate(2023).await.unwrap();
    assert_eq!(repo.resolve_target().await.unwrap().unwrap().year, 2023);
}

#[tokio::test]
async fn test_partition_activate_unknown_year_is_not_found() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = PartitionRepositoryImpl::new(&db_path).unwrap();

    let err = repo.activate(1999).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

// ==========================================
// Template repository
// ==========================================

#[tokio::test]
async fn test_template_save_load_round_trip() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = TemplateRepositoryImpl::new(&db_path).unwrap();

    let template = test_helpers::standard_template();
    repo.save(&template).await.unwrap();

    let loaded = repo.get_by_name("standard").await.unwrap().unwrap();
    assert_eq!(loaded.sheet_format, SheetFormat::Xlsx);
    assert_eq!(loaded.start_row, 2);
    assert_eq!(loaded.mapping, template.mapping);
    assert_eq!(
        loaded.mapping.get(&EntryField::ContainerCode),
        Some(&"C".to_string())
    );
}

#[tokio::test]
async fn test_template_save_overwrites_by_name() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = TemplateRepositoryImpl::new(&db_path).unwrap();

    repo.save(&test_helpers::standard_template()).await.unwrap();

    let mut mapping = BTreeMap::new();
    mapping.insert(EntryField::ContainerCode, "B".to_string());
    let edited = ImportTemplate::new("standard", SheetFormat::Xls, 3, mapping).unwrap();
    repo.save(&edited).await.unwrap();

    let loaded = repo.get_by_name("standard").await.unwrap().unwrap();
    assert_eq!(loaded.sheet_format, SheetFormat::Xls);
    assert_eq!(loaded.start_row, 3);
    assert_eq!(loaded.mapping.len(), 1);
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_template_missing_and_delete() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = TemplateRepositoryImpl::new(&db_path).unwrap();

    assert!(repo.get_by_name("nope").await.unwrap().is_none());
    assert!(!repo.delete("nope").await.unwrap());

    repo.save(&test_helpers::standard_template()).await.unwrap();
    assert!(repo.delete("standard").await.unwrap());
    assert!(repo.get_by_name("standard").await.unwrap().is_none());
}

// ==========================================
// Entry repository - ordinal allocation
// ==========================================

#[tokio::test]
async fn test_ordinals_are_contiguous_within_a_partition() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let partitions = PartitionRepositoryImpl::new(&db_path).unwrap();
    let entries = EntryRepositoryImpl::new(&db_path).unwrap();

    let partition = partitions.create(2025).await.unwrap();

    for i in 0..5 {
        let row = test_helpers::staged_row(
            2 + i,
            "RE-100",
            &format!("MSKU000000{}", i),
            "20GP",
            "",
            "",
        );
        let entry = entries
            .insert_with_next_ordinal(partition.id, &row)
            .await
            .unwrap();
        assert_eq!(entry.ordinal, i as i64 + 1);
    }

    assert_eq!(entries.max_ordinal(partition.id).await.unwrap(), 5);
}

#[tokio::test]
async fn test_sequential_batches_never_reuse_an_ordinal() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let partitions = PartitionRepositoryImpl::new(&db_path).unwrap();
    let entries = EntryRepositoryImpl::new(&db_path).unwrap();

    let partition = partitions.create(2025).await.unwrap();

    // first batch: ordinals 1..=3
    for i in 0..3 {
        let row = test_helpers::staged_row(2 + i, "RE-1", "MSKU1111111", "20GP", "", "");
        entries
            .insert_with_next_ordinal(partition.id, &row)
            .await
            .unwrap();
    }
    // second batch continues at 4
    let row = test_helpers::staged_row(2, "RE-2", "MSKU2222222", "20GP", "", "");
    let entry = entries
        .insert_with_next_ordinal(partition.id, &row)
        .await
        .unwrap();
    assert_eq!(entry.ordinal, 4);

    let all = entries.list_by_partition(partition.id).await.unwrap();
    let ordinals: Vec<i64> = all.iter().map(|e| e.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_partitions_have_independent_sequences() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let partitions = PartitionRepositoryImpl::new(&db_path).unwrap();
    let entries = EntryRepositoryImpl::new(&db_path).unwrap();

    let p2024 = partitions.create(2024).await.unwrap();
    let p2025 = partitions.create(2025).await.unwrap();

    let row = test_helpers::staged_row(2, "RE-1", "MSKU1111111", "20GP", "", "");
    entries.insert_with_next_ordinal(p2024.id, &row).await.unwrap();
    entries.insert_with_next_ordinal(p2024.id, &row).await.unwrap();
    let first_2025 = entries.insert_with_next_ordinal(p2025.id, &row).await.unwrap();

    assert_eq!(first_2025.ordinal, 1);
    assert_eq!(entries.max_ordinal(p2024.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_entry_round_trip_preserves_typed_fields() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let partitions = PartitionRepositoryImpl::new(&db_path).unwrap();
    let entries = EntryRepositoryImpl::new(&db_path).unwrap();

    let partition = partitions.create(2025).await.unwrap();

    let mut row = test_helpers::staged_row(2, "RE-100", "MSKU1234567", "20GP", "AURORA", "Panama");
    row.gross_weight = Some(rust_decimal::Decimal::new(1850050, 2)); // 18500.50
    row.operation_type = Some(manifest_registry::OperationType::Import);
    row.registration_date = chrono::NaiveDate::from_ymd_opt(2025, 3, 14);
    row.position_number = Some(7);

    let inserted = entries
        .insert_with_next_ordinal(partition.id, &row)
        .await
        .unwrap();
    let loaded = entries.get(inserted.id).await.unwrap().unwrap();

    assert_eq!(loaded.container_model, "MSKU20GP");
    assert_eq!(loaded.gross_weight, row.gross_weight);
    assert_eq!(
        loaded.operation_type,
        Some(manifest_registry::OperationType::Import)
    );
    assert_eq!(loaded.registration_date, row.registration_date);
    assert_eq!(loaded.position_number, Some(7));
    assert_eq!(
        entries.latest_manifest_number(partition.id).await.unwrap(),
        Some("RE-100".to_string())
    );
}

// ==========================================
// Lookup repository - atomic get-or-create
// ==========================================

#[tokio::test]
async fn test_container_type_get_or_create_never_overwrites() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let lookups = LookupRepositoryImpl::new(&db_path).unwrap();

    let (first, created) = lookups
        .get_or_create_container_type("MSKU20GP", "20GP")
        .await
        .unwrap();
    assert!(created);

    // second call with different metadata resolves the same row untouched
    let (second, created) = lookups
        .get_or_create_container_type("MSKU20GP", "40HC")
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.type_code, "20GP");
    assert_eq!(lookups.count_container_types().await.unwrap(), 1);
}

#[tokio::test]
async fn test_ship_lookup_is_case_insensitive() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let lookups = LookupRepositoryImpl::new(&db_path).unwrap();

    let (ship, created) = lookups
        .get_or_create_ship("MSC Aurora", "MSC", None)
        .await
        .unwrap();
    assert!(created);

    assert!(lookups.find_ship("msc aurora").await.unwrap().is_some());

    let (resolved, created) = lookups
        .get_or_create_ship("MSC AURORA", "other line", None)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(resolved.id, ship.id);
    assert_eq!(resolved.shipping_line, "MSC");
    assert_eq!(lookups.count_ships().await.unwrap(), 1);
}

#[tokio::test]
async fn test_flag_get_or_create_by_exact_name() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let lookups = LookupRepositoryImpl::new(&db_path).unwrap();

    let (_, created) = lookups.get_or_create_flag("Panama").await.unwrap();
    assert!(created);
    let (_, created) = lookups.get_or_create_flag("Panama").await.unwrap();
    assert!(!created);
    // flag names are exact, unlike ships
    let (_, created) = lookups.get_or_create_flag("PANAMA").await.unwrap();
    assert!(created);
    assert_eq!(lookups.count_flags().await.unwrap(), 2);
}

#[tokio::test]
async fn test_get_or_create_rejects_empty_keys() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let lookups = LookupRepositoryImpl::new(&db_path).unwrap();

    assert!(lookups.get_or_create_container_type("", "20GP").await.is_err());
    assert!(lookups.get_or_create_flag("").await.is_err());
    assert!(lookups.get_or_create_ship("", "", None).await.is_err());
}
