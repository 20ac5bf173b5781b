// ==========================================
// 工程项目管理平台 - 导入会话（状态机）
// ==========================================
// 状态: UPLOAD → MAPPING → PREVIEW
// 转换:
// - UPLOAD → MAPPING: 表格解析成功，生成自动映射
// - MAPPING → MAPPING: 修改单个字段映射
// - MAPPING → PREVIEW: 全部必填字段已映射，执行行校验
// - PREVIEW → MAPPING: 丢弃校验结果，保留映射与数据行
// - PREVIEW → 提交: 有效记录交给仓储，成功后等同 reset
// - 任意状态 → UPLOAD: reset，清空全部会话数据
// 会话由调用方持有，不共享、不持久化
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::import::{ColumnMapping, ImportBatch, ParsedSheet, PreviewSummary, RawRow};
use crate::domain::import::ValidationError;
use crate::domain::record::ImportRecord;
use crate::domain::types::{ImportKind, SessionState};
use crate::importer::auto_mapper::AutoMapper;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_catalog::FieldCatalog;
use crate::importer::file_parser::{SpreadsheetFormat, SpreadsheetReader};
use crate::importer::row_validator::RowValidator;
use crate::repository::ImportRecordRepository;
use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// CommitContext - 提交上下文
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitContext {
    pub project_id: String,          // 目标项目
    pub imported_by: Option<String>, // 操作人
}

// ==========================================
// CommitReport - 提交结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub batch_id: String,
    pub committed: usize,    // 已落库记录数
    pub skipped_rows: usize, // 因校验失败未提交的行数
}

impl CommitReport {
    /// 面向用户的提交结果消息
    pub fn message(&self, locale: &str) -> String {
        let count = self.committed.to_string();
        crate::i18n::t_in_with_args(locale, "import.commit_success", &[("count", count.as_str())])
    }
}

// ==========================================
// ImportSession
// ==========================================
pub struct ImportSession {
    session_id: String,
    kind: ImportKind,
    catalog: FieldCatalog,
    settings: ImportSettings,
    reader: SpreadsheetReader,
    mapper: AutoMapper,

    state: SessionState,
    file_name: Option<String>,
    headers: Vec<String>,
    raw_rows: Vec<RawRow>,
    mappings: Vec<ColumnMapping>,
    errors: Vec<ValidationError>,
    records: Vec<ImportRecord>,
    started_at: Instant,
}

impl ImportSession {
    /// 创建会话（初始状态 UPLOAD）
    pub fn new(kind: ImportKind, settings: ImportSettings) -> Self {
        let catalog = FieldCatalog::for_kind(kind).with_extra_keywords(&settings.extra_keywords);

        Self {
            session_id: Uuid::new_v4().to_string(),
            kind,
            catalog,
            settings,
            reader: SpreadsheetReader::new(),
            mapper: AutoMapper::new(),
            state: SessionState::Upload,
            file_name: None,
            headers: Vec::new(),
            raw_rows: Vec::new(),
            mappings: Vec::new(),
            errors: Vec::new(),
            records: Vec::new(),
            started_at: Instant::now(),
        }
    }

    /// 从配置读取设置后创建会话
    pub async fn from_config<C>(kind: ImportKind, config: &C) -> ImportResult<Self>
    where
        C: ImportConfigReader + ?Sized,
    {
        let settings = ImportSettings::load(config, kind).await?;
        Ok(Self::new(kind, settings))
    }

    // ==========================================
    // UPLOAD → MAPPING
    // ==========================================

    /// 读取磁盘文件（唯一的异步读取边界）
    ///
    /// 失败时会话保持 UPLOAD
    pub async fn upload_path<P: AsRef<Path>>(&mut self, file_path: P) -> ImportResult<()> {
        self.ensure_state(SessionState::Upload, SessionState::Mapping)?;

        let path = file_path.as_ref();
        let sheet = self.reader.read_path(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        self.load_sheet(sheet, file_name)
    }

    /// 解析内存中的文件内容
    pub fn upload_bytes(
        &mut self,
        bytes: &[u8],
        format: SpreadsheetFormat,
        file_name: Option<String>,
    ) -> ImportResult<()> {
        self.ensure_state(SessionState::Upload, SessionState::Mapping)?;

        let sheet = self.reader.read_bytes(bytes, format)?;
        self.load_sheet(sheet, file_name)
    }

    /// 解析上传的文件内容，格式由文件名或文件头判断
    pub fn upload_file(&mut self, bytes: &[u8], file_name: Option<String>) -> ImportResult<()> {
        self.ensure_state(SessionState::Upload, SessionState::Mapping)?;

        let format = SpreadsheetFormat::detect(file_name.as_deref(), bytes)?;
        self.upload_bytes(bytes, format, file_name)
    }

    /// 载入已解析的工作表并生成自动映射
    #[instrument(skip_all, fields(session_id = %self.session_id, kind = %self.kind))]
    pub fn load_sheet(&mut self, sheet: ParsedSheet, file_name: Option<String>) -> ImportResult<()> {
        self.ensure_state(SessionState::Upload, SessionState::Mapping)?;

        self.mappings = self.mapper.auto_map(&self.catalog, &sheet.headers);
        self.headers = sheet.headers;
        self.raw_rows = sheet.rows;
        self.file_name = file_name;
        self.state = SessionState::Mapping;

        info!(
            file_name = ?self.file_name,
            rows = self.raw_rows.len(),
            missing_required = self.missing_required_fields().len(),
            "进入列映射"
        );
        Ok(())
    }

    // ==========================================
    // MAPPING → MAPPING
    // ==========================================

    /// 修改单个字段的源列（None / 空串 = 取消映射）
    pub fn set_mapping(&mut self, field_id: &str, source_column: Option<String>) -> ImportResult<()> {
        self.ensure_state(SessionState::Mapping, SessionState::Mapping)?;

        let index = self
            .mappings
            .iter()
            .position(|m| m.field_id == field_id)
            .ok_or_else(|| ImportError::UnknownField(field_id.to_string()))?;

        let source_column = source_column
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if let Some(column) = source_column.as_deref() {
            if !self.headers.iter().any(|h| h == column) {
                return Err(ImportError::UnknownColumn(column.to_string()));
            }

            if !self.settings.allow_duplicate_column_mapping {
                if let Some(other) = self.mappings.iter().find(|m| {
                    m.field_id != field_id && m.source_column.as_deref() == Some(column)
                }) {
                    return Err(ImportError::DuplicateColumnMapping {
                        column: column.to_string(),
                        field: other.field_id.clone(),
                    });
                }
            }
        }

        let updated = self.mappings[index].clone().with_source(source_column);
        self.mappings[index] = updated;
        Ok(())
    }

    /// 未映射的必填字段（目录顺序）
    pub fn missing_required_fields(&self) -> Vec<String> {
        self.mappings
            .iter()
            .filter(|m| m.required && !m.is_mapped())
            .map(|m| m.field_id.clone())
            .collect()
    }

    /// MAPPING → PREVIEW 是否可用
    pub fn can_preview(&self) -> bool {
        self.state == SessionState::Mapping && self.missing_required_fields().is_empty()
    }

    // ==========================================
    // MAPPING → PREVIEW
    // ==========================================

    /// 执行行校验并进入预览
    #[instrument(skip_all, fields(session_id = %self.session_id, kind = %self.kind))]
    pub fn preview(&mut self) -> ImportResult<PreviewSummary> {
        self.ensure_state(SessionState::Mapping, SessionState::Preview)?;

        let missing = self.missing_required_fields();
        if !missing.is_empty() {
            return Err(ImportError::MappingIncomplete { missing });
        }

        let validator = RowValidator::new(&self.catalog, &self.settings.locale);
        let outcome = validator.validate_rows(&self.headers, &self.raw_rows, &self.mappings);
        self.records = outcome.records;
        self.errors = outcome.errors;
        self.state = SessionState::Preview;

        let summary = self.build_summary();
        info!(
            valid_rows = summary.valid_rows,
            invalid_rows = summary.invalid_rows,
            "进入预览"
        );
        Ok(summary)
    }

    /// 预览汇总（仅 PREVIEW 状态可用）
    pub fn preview_summary(&self) -> Option<PreviewSummary> {
        (self.state == SessionState::Preview).then(|| self.build_summary())
    }

    fn build_summary(&self) -> PreviewSummary {
        let invalid_rows = self
            .errors
            .iter()
            .map(|e| e.row_number)
            .collect::<HashSet<_>>()
            .len();

        PreviewSummary {
            total_rows: self.raw_rows.len(),
            valid_rows: self.records.len(),
            invalid_rows,
            error_count: self.errors.len(),
            errors: self.errors.clone(),
        }
    }

    // ==========================================
    // PREVIEW → MAPPING
    // ==========================================

    /// 返回映射（丢弃校验结果）
    pub fn back_to_mapping(&mut self) -> ImportResult<()> {
        self.ensure_state(SessionState::Preview, SessionState::Mapping)?;

        self.errors.clear();
        self.records.clear();
        self.state = SessionState::Mapping;
        Ok(())
    }

    // ==========================================
    // PREVIEW → 提交
    // ==========================================

    /// 提交有效记录
    ///
    /// 成功后会话 reset；持久化失败时保持 PREVIEW，不自动重试
    #[instrument(skip_all, fields(session_id = %self.session_id, project_id = %ctx.project_id))]
    pub async fn commit<R>(&mut self, repo: &R, ctx: &CommitContext) -> ImportResult<CommitReport>
    where
        R: ImportRecordRepository + ?Sized,
    {
        if self.state != SessionState::Preview {
            return Err(ImportError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "COMMIT".to_string(),
            });
        }
        if self.records.is_empty() {
            return Err(ImportError::NothingToCommit);
        }

        let summary = self.build_summary();
        let error_report_json = if self.errors.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&self.errors).context("序列化校验错误明细失败")?)
        };

        let batch = ImportBatch {
            batch_id: Uuid::new_v4().to_string(),
            import_kind: self.kind,
            project_id: ctx.project_id.clone(),
            file_name: self.file_name.clone(),
            total_rows: summary.total_rows as i32,
            success_rows: summary.valid_rows as i32,
            error_rows: summary.invalid_rows as i32,
            imported_at: Utc::now(),
            imported_by: ctx.imported_by.clone(),
            elapsed_ms: self.started_at.elapsed().as_millis() as i64,
            error_report_json,
        };
        let batch_id = batch.batch_id.clone();

        let committed = match repo.batch_insert_records(batch, self.records.clone()).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "提交失败，会话保持预览");
                return Err(e.into());
            }
        };

        info!(batch_id = %batch_id, committed, skipped_rows = summary.invalid_rows, "提交完成");
        self.reset();

        Ok(CommitReport {
            batch_id,
            committed,
            skipped_rows: summary.invalid_rows,
        })
    }

    // ==========================================
    // 任意状态 → UPLOAD
    // ==========================================

    /// 清空全部会话数据
    pub fn reset(&mut self) {
        self.state = SessionState::Upload;
        self.file_name = None;
        self.headers.clear();
        self.raw_rows.clear();
        self.mappings.clear();
        self.errors.clear();
        self.records.clear();
        self.started_at = Instant::now();
    }

    fn ensure_state(&self, expected: SessionState, target: SessionState) -> ImportResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ImportError::InvalidStateTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            })
        }
    }

    // ===== 访问器 =====

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn raw_rows(&self) -> &[RawRow] {
        &self.raw_rows
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    pub fn mapping(&self, field_id: &str) -> Option<&ColumnMapping> {
        self.mappings.iter().find(|m| m.field_id == field_id)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn records(&self) -> &[ImportRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST_CSV: &str = "Mã chi phí,Mô tả,Danh mục,Ngày,Nhà cung cấp,Ngân sách,Trạng thái\n\
VT-001,Thép,Vật tư,15/03/2024,NCC A,1200000000,Đã thanh toán\n\
VT-002,Cát,Vật tư,không rõ,NCC B,-5,Chờ duyệt\n";

    fn mapping_session() -> ImportSession {
        let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());
        session
            .upload_bytes(COST_CSV.as_bytes(), SpreadsheetFormat::Csv, None)
            .unwrap();
        session
    }

    #[test]
    fn test_upload_enters_mapping() {
        let session = mapping_session();
        assert_eq!(session.state(), SessionState::Mapping);
        assert_eq!(session.headers().len(), 7);
        assert_eq!(session.raw_rows().len(), 2);
        assert!(session.can_preview());
    }

    #[test]
    fn test_upload_file_detects_format() {
        let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());
        session
            .upload_file(COST_CSV.as_bytes(), Some("chi_phi.csv".to_string()))
            .unwrap();
        assert_eq!(session.state(), SessionState::Mapping);
        assert_eq!(session.file_name(), Some("chi_phi.csv"));
    }

    #[test]
    fn test_failed_upload_stays_in_upload() {
        let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());
        let result = session.upload_bytes(b"only,headers\n", SpreadsheetFormat::Csv, None);
        assert!(matches!(result, Err(ImportError::FileReadError(_))));
        assert_eq!(session.state(), SessionState::Upload);
        assert!(session.headers().is_empty());
    }

    #[test]
    fn test_mapping_gate() {
        let mut session = mapping_session();
        session.set_mapping("vendor", None).unwrap();
        assert!(!session.can_preview());
        assert_eq!(session.missing_required_fields(), vec!["vendor".to_string()]);

        match session.preview() {
            Err(ImportError::MappingIncomplete { missing }) => assert_eq!(missing, vec!["vendor"]),
            other => panic!("unexpected: {:?}", other.map(|s| s.valid_rows)),
        }
        assert_eq!(session.state(), SessionState::Mapping);

        session
            .set_mapping("vendor", Some("Nhà cung cấp".to_string()))
            .unwrap();
        assert!(session.can_preview());
        assert!(session.preview().is_ok());
    }

    #[test]
    fn test_blank_data_rows_reach_preview_empty() {
        let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());
        let csv = "Mã chi phí,Mô tả,Danh mục,Ngày,Nhà cung cấp,Ngân sách,Trạng thái\n,,,,,,\n";
        session
            .upload_bytes(csv.as_bytes(), SpreadsheetFormat::Csv, None)
            .unwrap();
        assert_eq!(session.state(), SessionState::Mapping);
        assert!(session.raw_rows().is_empty());

        let summary = session.preview().unwrap();
        assert_eq!(summary.total_rows, 0);
        assert_eq!(summary.valid_rows, 0);
    }

    #[test]
    fn test_whitespace_row_fails_required() {
        let mut session = ImportSession::new(ImportKind::Cost, ImportSettings::default());
        let csv = "Mã chi phí,Mô tả,Danh mục,Ngày,Nhà cung cấp,Ngân sách,Trạng thái\n  ,  ,  ,  ,  ,  ,  \n";
        session
            .upload_bytes(csv.as_bytes(), SpreadsheetFormat::Csv, None)
            .unwrap();

        let summary = session.preview().unwrap();
        assert_eq!(summary.total_rows, 1);
        assert_eq!(summary.invalid_rows, 1);
        assert!(session
            .errors()
            .iter()
            .all(|e| e.kind == crate::domain::import::ValidationErrorKind::Required));
    }

    #[test]
    fn test_set_mapping_only_touches_one_field() {
        let mut session = mapping_session();
        let before: Vec<ColumnMapping> = session.mappings().to_vec();

        session.set_mapping("notes", Some("Mô tả".to_string())).unwrap();

        for (old, new) in before.iter().zip(session.mappings()) {
            if old.field_id == "notes" {
                assert_eq!(new.source_column.as_deref(), Some("Mô tả"));
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_set_mapping_rejects_unknown_field_and_column() {
        let mut session = mapping_session();
        assert!(matches!(
            session.set_mapping("tax", Some("Mô tả".to_string())),
            Err(ImportError::UnknownField(_))
        ));
        assert!(matches!(
            session.set_mapping("notes", Some("Không có".to_string())),
            Err(ImportError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_strict_mode_rejects_duplicate_column() {
        let settings = ImportSettings::default().strict_column_mapping();
        let mut session = ImportSession::new(ImportKind::Cost, settings);
        session
            .upload_bytes(COST_CSV.as_bytes(), SpreadsheetFormat::Csv, None)
            .unwrap();

        match session.set_mapping("notes", Some("Mô tả".to_string())) {
            Err(ImportError::DuplicateColumnMapping { column, field }) => {
                assert_eq!(column, "Mô tả");
                assert_eq!(field, "description");
            }
            other => panic!("unexpected: {:?}", other),
        }

        // 默认宽松模式允许
        let mut permissive = mapping_session();
        assert!(permissive.set_mapping("notes", Some("Mô tả".to_string())).is_ok());
    }

    #[test]
    fn test_preview_and_back_to_mapping() {
        let mut session = mapping_session();
        let summary = session.preview().unwrap();
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.valid_rows, 1);
        assert_eq!(summary.invalid_rows, 1);
        assert_eq!(summary.error_count, 2);
        assert_eq!(session.preview_summary(), Some(summary));

        let mappings = session.mappings().to_vec();
        session.back_to_mapping().unwrap();
        assert_eq!(session.state(), SessionState::Mapping);
        assert!(session.records().is_empty());
        assert!(session.errors().is_empty());
        assert_eq!(session.mappings(), mappings.as_slice());
        assert_eq!(session.raw_rows().len(), 2);
        assert_eq!(session.preview_summary(), None);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut session = ImportSession::new(ImportKind::Norm, ImportSettings::default());
        assert!(matches!(
            session.preview(),
            Err(ImportError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            session.back_to_mapping(),
            Err(ImportError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            session.set_mapping("work_code", None),
            Err(ImportError::InvalidStateTransition { .. })
        ));

        let mut session = mapping_session();
        assert!(matches!(
            session.upload_bytes(COST_CSV.as_bytes(), SpreadsheetFormat::Csv, None),
            Err(ImportError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut session = mapping_session();
        session.preview().unwrap();
        session.reset();

        assert_eq!(session.state(), SessionState::Upload);
        assert!(session.headers().is_empty());
        assert!(session.raw_rows().is_empty());
        assert!(session.mappings().is_empty());
        assert!(session.errors().is_empty());
        assert!(session.records().is_empty());
    }
}
