// ==========================================
// 管道集成测试
// ==========================================
// 覆盖: CSV → 分类 → 扫描 → 去重 → 整表替换 → 元数据
// ==========================================


use compat_matrix::config::{config_keys, ConfigManager};
use compat_matrix::domain::{CompatibilityRecord, RecordType};
use compat_matrix::importer::{CompatibilityPipeline, ImportError};
use compat_matrix::repository::{CompatibilityRepository, CompatibilityRepositoryImpl};
use compat_matrix::{logging, PipelineVariant};
use rusqlite::Connection;
use test_helpers::{
    count_rows, create_test_db, csv_upload, denoising_technologies, insert_global_config,
    macos_matrix, nik_windows_workbook, table_exists, windows_matrix,
};

fn create_pipeline(db_path: &str) -> CompatibilityPipeline<CompatibilityRepositoryImpl, ConfigManager> {
    CompatibilityPipeline::new(
        CompatibilityRepositoryImpl::new(db_path).unwrap(),
        ConfigManager::new(db_path).unwrap(),
    )
}

#[tokio::test]
async fn test_compatibility_end_to_end() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let pipeline = create_pipeline(&db_path);

    let outcome = pipeline
        .run_compatibility(&[windows_matrix(), macos_matrix()], Some("qa@example.com"))
        .await
        .unwrap();

    // Windows 6 条（含 2 条重复）+ macOS 4 条
    assert_eq!(outcome.pipeline, PipelineVariant::Compatibility);
    assert_eq!(outcome.total_records, 10);
    assert_eq!(outcome.valid_records, 8);
    assert!(outcome.metadata_recorded);
    assert_eq!(outcome.sheets.len(), 2);

    let records = pipeline
        .repository()
        .list_compatibility_records("compatibility_matrix")
        .await
        .unwrap();
    assert_eq!(records.len(), 8);

    // 首条保留（重复行的 ✗ 被丢弃）
    assert_eq!(
        records[0],
        CompatibilityRecord::new("DxO PhotoLab", "8", "Windows", "Windows 10", "compatible")
    );
    assert_eq!(records[3].status, "not compatible");

    // 分节行携带版本
    let nik: Vec<_> = records.iter().filter(|r| r.software == "Nik Collection").collect();
    assert_eq!(nik.len(), 2);
    assert!(nik.iter().all(|r| r.software_version == "7" && r.feature == "macOS"));
    assert_eq!(nik[1].status, "beta");
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let pipeline = create_pipeline(&db_path);

    let first = pipeline.run_compatibility(&[windows_matrix()], None).await.unwrap();
    let second = pipeline.run_compatibility(&[windows_matrix()], None).await.unwrap();

    assert_eq!(first.valid_records, second.valid_records);
    assert_eq!(count_rows(&db_path, "compatibility_matrix").unwrap(), 4);
    assert_ne!(first.ingestion_id, second.ingestion_id);

    let history = pipeline
        .repository()
        .list_recent_ingestions("compatibility_ingestions", 10)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].ingestion_id, second.ingestion_id);
}

#[tokio::test]
async fn test_failed_load_leaves_previous_table() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let pipeline = create_pipeline(&db_path);

    pipeline.run_compatibility(&[windows_matrix()], None).await.unwrap();

    // 占用索引名，令第二次装载在建索引时失败
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "DROP INDEX idx_compatibility_matrix_target;
             CREATE TABLE idx_compatibility_matrix_target (x INTEGER);",
        )
        .unwrap();
    }

    let err = pipeline
        .run_compatibility(&[windows_matrix(), macos_matrix()], None)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Store(_)));
    assert!(!err.is_input_error());

    assert_eq!(count_rows(&db_path, "compatibility_matrix").unwrap(), 4);
    let records = pipeline
        .repository()
        .list_compatibility_records("compatibility_matrix")
        .await
        .unwrap();
    assert!(records.iter().all(|r| r.feature == "Windows"));

    // 失败运行不写元数据
    assert_eq!(count_rows(&db_path, "compatibility_ingestions").unwrap(), 1);
}

#[tokio::test]
async fn test_no_files_touches_nothing() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let pipeline = create_pipeline(&db_path);

    let err = pipeline.run_compatibility(&[], None).await.unwrap_err();

    assert!(matches!(err, ImportError::NoFilesProvided));
    assert!(!table_exists(&db_path, "compatibility_matrix").unwrap());
    assert!(!table_exists(&db_path, "compatibility_ingestions").unwrap());
}

#[tokio::test]
async fn test_unrecognized_sheets_only_is_rejected() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let pipeline = create_pipeline(&db_path);

    let changelog = csv_upload("Changelog.csv", &[&["Date", "Note"], &["2024-01-01", "init"]]);
    let err = pipeline.run_compatibility(&[changelog], None).await.unwrap_err();

    assert!(matches!(
        err,
        ImportError::NoValidRecords {
            variant: PipelineVariant::Compatibility
        }
    ));
    assert!(!table_exists(&db_path, "compatibility_matrix").unwrap());
}

#[tokio::test]
async fn test_unsupported_format_is_input_error() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let pipeline = create_pipeline(&db_path);

    let upload = compat_matrix::UploadedFile::new("matrix.pdf", b"%PDF-1.4".to_vec());
    let err = pipeline.run_compatibility(&[upload], None).await.unwrap_err();

    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_denoising_end_to_end() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let pipeline = create_pipeline(&db_path);

    let outcome = pipeline
        .run_denoising(&[denoising_technologies()], Some("qa@example.com"))
        .await
        .unwrap();
    assert_eq!(outcome.pipeline, PipelineVariant::Denoising);
    assert_eq!(outcome.valid_records, 6);

    let records = pipeline
        .repository()
        .list_capability_records("denoising_compatibility")
        .await
        .unwrap();
    assert_eq!(records.len(), 6);

    let software: Vec<_> = records
        .iter()
        .filter(|r| r.record_type == RecordType::Software)
        .collect();
    assert_eq!(software.len(), 2);
    assert_eq!(software[0].status, "compatible: Bayer + X-Trans");
    assert_eq!(software[1].status, "compatible: X-Trans only");

    let npu: Vec<_> = records.iter().filter(|r| r.name == "NPU").collect();
    assert_eq!(npu[0].status, "not compatible");
    assert_eq!(npu[0].version, "");
    assert_eq!(npu[0].record_type, RecordType::Capability);

    // 通用管道的表不受影响
    assert!(!table_exists(&db_path, "compatibility_matrix").unwrap());
    assert_eq!(count_rows(&db_path, "denoising_ingestions").unwrap(), 1);
}

#[tokio::test]
async fn test_config_overrides_target_tables() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_global_config(
        &db_path,
        &[
            (config_keys::COMPAT_TABLE, "matrix_v2"),
            (config_keys::COMPAT_METADATA_TABLE, "matrix_v2_log"),
            (config_keys::BATCH_SIZE, "1"),
        ],
    )
    .unwrap();
    let pipeline = create_pipeline(&db_path);

    pipeline.run_compatibility(&[windows_matrix()], None).await.unwrap();

    assert_eq!(count_rows(&db_path, "matrix_v2").unwrap(), 4);
    assert_eq!(count_rows(&db_path, "matrix_v2_log").unwrap(), 1);
    assert!(!table_exists(&db_path, "compatibility_matrix").unwrap());
}

#[tokio::test]
async fn test_metadata_failure_keeps_successful_load() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    // 元数据表指向列结构不兼容的 config_kv，追加必然失败
    insert_global_config(&db_path, &[(config_keys::COMPAT_METADATA_TABLE, "config_kv")]).unwrap();
    let pipeline = create_pipeline(&db_path);

    let outcome = pipeline.run_compatibility(&[windows_matrix()], None).await.unwrap();

    assert!(!outcome.metadata_recorded);
    assert_eq!(outcome.valid_records, 4);
    assert_eq!(count_rows(&db_path, "compatibility_matrix").unwrap(), 4);
    // config_kv 本身未被改写
    assert_eq!(count_rows(&db_path, "config_kv").unwrap(), 1);
}

#[tokio::test]
async fn test_xlsx_upload_end_to_end() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let pipeline = create_pipeline(&db_path);

    let outcome = pipeline
        .run_compatibility(&[nik_windows_workbook()], None)
        .await
        .unwrap();

    // Notes 表未识别，仅 Nik Windows 计入
    assert_eq!(outcome.sheets.len(), 1);
    assert_eq!(outcome.valid_records, 2);

    let records = pipeline
        .repository()
        .list_compatibility_records("compatibility_matrix")
        .await
        .unwrap();
    assert_eq!(
        records,
        vec![
            CompatibilityRecord::new(
                "Nik Silver Efex",
                "7",
                "Windows",
                "Windows 10\n64-bit",
                "compatible"
            ),
            CompatibilityRecord::new("Nik Viveza", "3", "Windows", "Windows 10\n64-bit", "5.5"),
        ]
    );
}

#[tokio::test]
async fn test_invalid_configured_table_fails_before_load() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_global_config(&db_path, &[(config_keys::DENOISING_TABLE, "bad name")]).unwrap();
    let pipeline = create_pipeline(&db_path);

    let err = pipeline
        .run_denoising(&[denoising_technologies()], None)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Config { .. }));
    assert!(!table_exists(&db_path, "denoising_compatibility").unwrap());
}
