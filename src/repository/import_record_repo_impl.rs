// ==========================================
// 工程项目管理平台 - 导入记录 Repository 实现
// ==========================================
// 职责: 实现提交协作方数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::cost::{CostCategory, CostRecord, CostStatus, PaymentMethod};
use crate::domain::import::ImportBatch;
use crate::domain::norm::NormRecord;
use crate::domain::record::ImportRecord;
use crate::domain::types::ImportKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_record_repo::ImportRecordRepository;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// ImportRecordRepositoryImpl
// ==========================================
pub struct ImportRecordRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportRecordRepositoryImpl {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共用连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中写入批次行
    fn insert_batch_tx(tx: &Transaction, batch: &ImportBatch) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, import_kind, project_id, file_name,
                total_rows, success_rows, error_rows,
                imported_at, imported_by, elapsed_ms, error_report_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                batch.batch_id,
                batch.import_kind.as_str(),
                batch.project_id,
                batch.file_name,
                batch.total_rows,
                batch.success_rows,
                batch.error_rows,
                batch.imported_at.to_rfc3339(),
                batch.imported_by,
                batch.elapsed_ms,
                batch.error_report_json,
            ],
        )?;
        Ok(())
    }

    /// 在事务中插入成本条目
    fn insert_cost_tx(
        tx: &Transaction,
        batch: &ImportBatch,
        record: &CostRecord,
    ) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO cost_entry (
                entry_id, batch_id, project_id, code, description, category,
                entry_date, vendor, boq_item, budget, actual, committed, status,
                invoice_number, payment_method, notes, row_number
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17
            )
            "#,
            params![
                Uuid::new_v4().to_string(),
                batch.batch_id,
                batch.project_id,
                record.code,
                record.description,
                record.category.code(),
                record.date.format(DATE_FORMAT).to_string(),
                record.vendor,
                record.boq_item,
                record.budget,
                record.actual,
                record.committed,
                record.status.code(),
                record.invoice_number,
                record.payment_method.map(|p| p.code()),
                record.notes,
                record.row_number as i64,
            ],
        )?;
        Ok(())
    }

    /// 在事务中插入材料定额
    fn insert_norm_tx(
        tx: &Transaction,
        batch: &ImportBatch,
        record: &NormRecord,
    ) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO material_norm (
                norm_id, batch_id, project_id, work_code, work_name, work_unit,
                material_code, material_name, material_unit, norm_quantity, notes, row_number
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                Uuid::new_v4().to_string(),
                batch.batch_id,
                batch.project_id,
                record.work_code,
                record.work_name,
                record.work_unit,
                record.material_code,
                record.material_name,
                record.material_unit,
                record.norm_quantity,
                record.notes,
                record.row_number as i64,
            ],
        )?;
        Ok(())
    }

    fn map_batch_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BatchRow> {
        Ok(BatchRow {
            batch_id: row.get(0)?,
            import_kind: row.get(1)?,
            project_id: row.get(2)?,
            file_name: row.get(3)?,
            total_rows: row.get(4)?,
            success_rows: row.get(5)?,
            error_rows: row.get(6)?,
            imported_at: row.get(7)?,
            imported_by: row.get(8)?,
            elapsed_ms: row.get(9)?,
            error_report_json: row.get(10)?,
        })
    }
}

// ==========================================
// 行映射（数据库原始值 → 领域类型）
// ==========================================

struct BatchRow {
    batch_id: String,
    import_kind: String,
    project_id: String,
    file_name: Option<String>,
    total_rows: i32,
    success_rows: i32,
    error_rows: i32,
    imported_at: String,
    imported_by: Option<String>,
    elapsed_ms: i64,
    error_report_json: Option<String>,
}

impl BatchRow {
    fn into_batch(self) -> RepositoryResult<ImportBatch> {
        let import_kind = ImportKind::from_code(&self.import_kind)
            .ok_or_else(|| field_error("import_kind", &self.import_kind))?;
        let imported_at = DateTime::parse_from_rfc3339(&self.imported_at)
            .map_err(|_| field_error("imported_at", &self.imported_at))?
            .with_timezone(&Utc);

        Ok(ImportBatch {
            batch_id: self.batch_id,
            import_kind,
            project_id: self.project_id,
            file_name: self.file_name,
            total_rows: self.total_rows,
            success_rows: self.success_rows,
            error_rows: self.error_rows,
            imported_at,
            imported_by: self.imported_by,
            elapsed_ms: self.elapsed_ms,
            error_report_json: self.error_report_json,
        })
    }
}

struct CostRow {
    code: String,
    description: String,
    category: String,
    entry_date: String,
    vendor: String,
    boq_item: Option<String>,
    budget: f64,
    actual: f64,
    committed: f64,
    status: String,
    invoice_number: Option<String>,
    payment_method: Option<String>,
    notes: Option<String>,
    row_number: i64,
}

impl CostRow {
    fn into_record(self) -> RepositoryResult<CostRecord> {
        let category = CostCategory::from_code(&self.category)
            .ok_or_else(|| field_error("category", &self.category))?;
        let status =
            CostStatus::from_code(&self.status).ok_or_else(|| field_error("status", &self.status))?;
        let date = NaiveDate::parse_from_str(&self.entry_date, DATE_FORMAT)
            .map_err(|_| field_error("entry_date", &self.entry_date))?;
        let payment_method = match self.payment_method.as_deref() {
            Some(code) => Some(
                PaymentMethod::from_code(code).ok_or_else(|| field_error("payment_method", code))?,
            ),
            None => None,
        };

        Ok(CostRecord {
            code: self.code,
            description: self.description,
            category,
            date,
            vendor: self.vendor,
            budget: self.budget,
            status,
            boq_item: self.boq_item,
            actual: self.actual,
            committed: self.committed,
            invoice_number: self.invoice_number,
            payment_method,
            notes: self.notes,
            row_number: self.row_number as usize,
        })
    }
}

fn field_error(field: &str, value: &str) -> RepositoryError {
    RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("无法识别的存储值: {}", value),
    }
}

#[async_trait]
impl ImportRecordRepository for ImportRecordRepositoryImpl {
    #[instrument(skip_all, fields(batch_id = %batch.batch_id, records = records.len()))]
    async fn batch_insert_records(
        &self,
        batch: ImportBatch,
        records: Vec<ImportRecord>,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        Self::insert_batch_tx(&tx, &batch)?;

        let mut count = 0;
        for record in &records {
            match record {
                ImportRecord::Cost(cost) => Self::insert_cost_tx(&tx, &batch, cost)?,
                ImportRecord::Norm(norm) => Self::insert_norm_tx(&tx, &batch, norm)?,
            }
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(kind = %batch.import_kind, project_id = %batch.project_id, count, "导入记录已提交");
        Ok(count)
    }

    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                r#"
                SELECT batch_id, import_kind, project_id, file_name,
                       total_rows, success_rows, error_rows,
                       imported_at, imported_by, elapsed_ms, error_report_json
                FROM import_batch
                WHERE batch_id = ?1
                "#,
                params![batch_id],
                Self::map_batch_row,
            )
            .optional()?;

        row.map(BatchRow::into_batch).transpose()
    }

    async fn list_batches(
        &self,
        project_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, import_kind, project_id, file_name,
                   total_rows, success_rows, error_rows,
                   imported_at, imported_by, elapsed_ms, error_report_json
            FROM import_batch
            WHERE project_id = ?1
            ORDER BY imported_at DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt
            .query_map(params![project_id, limit as i64], Self::map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(BatchRow::into_batch).collect()
    }

    async fn list_cost_entries(&self, project_id: &str) -> RepositoryResult<Vec<CostRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT code, description, category, entry_date, vendor, boq_item,
                   budget, actual, committed, status, invoice_number, payment_method,
                   notes, row_number
            FROM cost_entry
            WHERE project_id = ?1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt
            .query_map(params![project_id], |row| {
                Ok(CostRow {
                    code: row.get(0)?,
                    description: row.get(1)?,
                    category: row.get(2)?,
                    entry_date: row.get(3)?,
                    vendor: row.get(4)?,
                    boq_item: row.get(5)?,
                    budget: row.get(6)?,
                    actual: row.get(7)?,
                    committed: row.get(8)?,
                    status: row.get(9)?,
                    invoice_number: row.get(10)?,
                    payment_method: row.get(11)?,
                    notes: row.get(12)?,
                    row_number: row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(CostRow::into_record).collect()
    }

    async fn list_norm_entries(&self, project_id: &str) -> RepositoryResult<Vec<NormRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT work_code, work_name, work_unit, material_code, material_name,
                   material_unit, norm_quantity, notes, row_number
            FROM material_norm
            WHERE project_id = ?1
            ORDER BY rowid
            "#,
        )?;

        let norms = stmt
            .query_map(params![project_id], |row| {
                Ok(NormRecord {
                    work_code: row.get(0)?,
                    work_name: row.get(1)?,
                    work_unit: row.get(2)?,
                    material_code: row.get(3)?,
                    material_name: row.get(4)?,
                    material_unit: row.get(5)?,
                    norm_quantity: row.get(6)?,
                    notes: row.get(7)?,
                    row_number: row.get::<_, i64>(8)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(norms)
    }
}
