// ==========================================
// 集成测试 - 导入提交与配置
// ==========================================
// 测试目标: 预览 → 提交 → SQLite 落库；配置驱动的会话设置
// 覆盖范围: ImportSession + ImportRecordRepositoryImpl + ConfigManager
// ==========================================


use async_trait::async_trait;
use construction_import::config::config_keys;
use construction_import::domain::{CostRecord, ImportBatch, ImportRecord, NormRecord};
use construction_import::importer::{cost_fields, TemplateGenerator};
use construction_import::logging;
use construction_import::repository::{RepositoryError, RepositoryResult};
use construction_import::{
    CommitContext, ConfigManager, FieldCatalog, ImportError, ImportKind, ImportRecordRepository,
    ImportRecordRepositoryImpl, ImportSession, ImportSettings, SessionState, SpreadsheetFormat,
};
use std::collections::HashMap;
use test_helpers::{build_csv, cost_row, create_test_db, write_file, COST_HEADERS};

const PROJECT_ID: &str = "DA-2024-001";

fn commit_context() -> CommitContext {
    CommitContext {
        project_id: PROJECT_ID.to_string(),
        imported_by: Some("ke_toan".to_string()),
    }
}

/// 总是失败的仓储
struct FailingRepository;

#[async_trait]
impl ImportRecordRepository for FailingRepository {
    async fn batch_insert_records(
        &self,
        _batch: ImportBatch,
        _records: Vec<ImportRecord>,
    ) -> RepositoryResult<usize> {
        Err(RepositoryError::DatabaseTransactionError("disk full".to_string()))
    }

    async fn get_batch(&self, _batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        Ok(None)
    }

    async fn list_batches(
        &self,
        _project_id: &str,
        _limit: usize,
    ) -> RepositoryResult<Vec<ImportBatch>> {
        Ok(Vec::new())
    }

    async fn list_cost_entries(&self, _project_id: &str) -> RepositoryResult<Vec<CostRecord>> {
        Ok(Vec::new())
    }

    async fn list_norm_entries(&self, _project_id: &str) -> RepositoryResult<Vec<NormRecord>> {
        Ok(Vec::new())
    }
}

// ==========================================
// 测试用例 1: 部分有效行提交
// ==========================================

#[tokio::test]
async fn test_commit_valid_rows_and_batch_report() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ImportRecordRepositoryImpl::new(&db_path).unwrap();

    let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());
    let bytes = build_csv(
        &COST_HEADERS,
        &[
            cost_row("VT-001", "15/03/2024", "1200000"),
            cost_row("VT-002", "15/03/2024", "-5"),
            cost_row("VT-003", "2024-03-16", "0"),
        ],
    );
    session
        .upload_bytes(&bytes, SpreadsheetFormat::Csv, Some("chi_phi.csv".to_string()))
        .unwrap();
    session.preview().unwrap();

    let report = session.commit(&repo, &commit_context()).await.unwrap();
    assert_eq!(report.committed, 2);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.message("en"), "Imported 2 records");

    // 提交成功后会话 reset
    assert_eq!(session.state(), SessionState::Upload);
    assert!(session.records().is_empty());

    let entries = repo.list_cost_entries(PROJECT_ID).await.unwrap();
    let codes: Vec<&str> = entries.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["VT-001", "VT-003"]);
    assert_eq!(entries[1].row_number, 4);

    let batch = repo.get_batch(&report.batch_id).await.unwrap().unwrap();
    assert_eq!(batch.import_kind, ImportKind::Cost);
    assert_eq!(batch.project_id, PROJECT_ID);
    assert_eq!(batch.file_name.as_deref(), Some("chi_phi.csv"));
    assert_eq!(batch.total_rows, 3);
    assert_eq!(batch.success_rows, 2);
    assert_eq!(batch.error_rows, 1);
    assert_eq!(batch.imported_by.as_deref(), Some("ke_toan"));
    assert!(batch
        .error_report_json
        .as_deref()
        .unwrap_or_default()
        .contains(cost_fields::BUDGET));

    let batches = repo.list_batches(PROJECT_ID, 10).await.unwrap();
    assert_eq!(batches.len(), 1);
}

// ==========================================
// 测试用例 2: 提交守卫
// ==========================================

#[tokio::test]
async fn test_commit_guards() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ImportRecordRepositoryImpl::new(&db_path).unwrap();
    let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());

    // UPLOAD 状态不可提交
    assert!(matches!(
        session.commit(&repo, &commit_context()).await,
        Err(ImportError::InvalidStateTransition { .. })
    ));

    // 全部行无效
    let bytes = build_csv(&COST_HEADERS, &[cost_row("VT-001", "15/03/2024", "-1")]);
    session
        .upload_bytes(&bytes, SpreadsheetFormat::Csv, None)
        .unwrap();
    session.preview().unwrap();

    assert!(matches!(
        session.commit(&repo, &commit_context()).await,
        Err(ImportError::NothingToCommit)
    ));
    assert_eq!(session.state(), SessionState::Preview);
    assert!(repo.list_cost_entries(PROJECT_ID).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_commit_failure_keeps_preview() {
    let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());
    let bytes = build_csv(&COST_HEADERS, &[cost_row("VT-001", "15/03/2024", "1")]);
    session
        .upload_bytes(&bytes, SpreadsheetFormat::Csv, None)
        .unwrap();
    session.preview().unwrap();

    let result = session.commit(&FailingRepository, &commit_context()).await;
    assert!(matches!(result, Err(ImportError::PersistenceError(_))));
    assert_eq!(session.state(), SessionState::Preview);
    assert_eq!(session.records().len(), 1);
}

// ==========================================
// 测试用例 3: 配置驱动的会话设置
// ==========================================

#[tokio::test]
async fn test_session_settings_from_config() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let config = ConfigManager::new(&db_path).unwrap();

    config
        .set_global_config_value(config_keys::IMPORT_LOCALE, "en")
        .unwrap();
    config
        .set_global_config_value(config_keys::IMPORT_ALLOW_DUPLICATE_COLUMN_MAPPING, "false")
        .unwrap();
    let mut extra = HashMap::new();
    extra.insert(
        cost_fields::VENDOR.to_string(),
        vec!["đơn vị cung ứng".to_string()],
    );
    config.set_extra_keywords(ImportKind::Cost, &extra).unwrap();

    let mut session = ImportSession::from_config(ImportKind::Cost, &config)
        .await
        .unwrap();
    assert_eq!(session.settings().locale, "en");
    assert!(!session.settings().allow_duplicate_column_mapping);

    let headers = [
        "Mã chi phí",
        "Mô tả",
        "Danh mục",
        "Ngày",
        "Đơn vị cung ứng",
        "Ngân sách",
        "Trạng thái",
    ];
    let bytes = build_csv(
        &headers,
        &[vec!["VT-001", "Thép", "Vật tư", "15/03/2024", "", "10", "Đã thanh toán"]],
    );
    session
        .upload_bytes(&bytes, SpreadsheetFormat::Csv, None)
        .unwrap();

    // 额外关键词生效
    let vendor = session.mapping(cost_fields::VENDOR).unwrap();
    assert_eq!(vendor.source_column.as_deref(), Some("Đơn vị cung ứng"));

    // 严格模式拒绝重复映射
    assert!(matches!(
        session.set_mapping(cost_fields::NOTES, Some("Mô tả".to_string())),
        Err(ImportError::DuplicateColumnMapping { .. })
    ));

    // 校验消息使用配置语言
    session.preview().unwrap();
    let error = &session.errors()[0];
    assert_eq!(error.field_id, cost_fields::VENDOR);
    assert!(error.message.contains("is required"), "{}", error.message);
}

// ==========================================
// 测试用例 4: 模板 → 上传 → 提交（定额）
// ==========================================

#[tokio::test]
async fn test_norm_template_round_trip_commit() {
    let dir = tempfile::tempdir().unwrap();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = ImportRecordRepositoryImpl::new(&db_path).unwrap();

    let template_path = dir.path().join("mau_dinh_muc.xlsx");
    TemplateGenerator::new()
        .write_to_path(&FieldCatalog::norm(), &template_path)
        .await
        .unwrap();

    let mut session = ImportSession::new(ImportKind::Norm, ImportSettings::default());
    session.upload_path(&template_path).await.unwrap();
    assert!(session.mappings().iter().all(|m| m.is_mapped() || !m.required));

    let summary = session.preview().unwrap();
    assert_eq!(summary.valid_rows, 1);
    assert_eq!(summary.error_count, 0);

    let report = session.commit(&repo, &commit_context()).await.unwrap();
    assert_eq!(report.committed, 1);

    let norms = repo.list_norm_entries(PROJECT_ID).await.unwrap();
    assert_eq!(norms.len(), 1);
    assert_eq!(norms[0].work_code, "AF.11111");
    assert_eq!(norms[0].material_unit, "kg");
    assert_eq!(norms[0].norm_quantity, 200.85);
    assert_eq!(norms[0].notes, None);
}

#[tokio::test]
async fn test_cost_csv_template_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = TemplateGenerator::new()
        .generate_csv(&FieldCatalog::cost())
        .unwrap();
    let path = write_file(dir.path(), "mau_chi_phi.csv", &bytes).unwrap();

    let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());
    session.upload_path(&path).await.unwrap();
    assert!(session.mappings().iter().all(|m| m.is_mapped()));

    let summary = session.preview().unwrap();
    assert_eq!(summary.valid_rows, 1);
    assert_eq!(summary.error_count, 0);

    let record = session.records()[0].as_cost().unwrap();
    assert_eq!(record.boq_item.as_deref(), Some("BOQ-02.01"));
    assert_eq!(record.actual, 1_150_000_000.0);
    assert_eq!(record.payment_method.as_ref().map(|p| p.code()), Some("bank_transfer"));
}
