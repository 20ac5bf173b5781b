// ==========================================
// 工程项目管理平台 - 导入记录 Repository Trait
// ==========================================
// 职责: 定义提交协作方的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::cost::CostRecord;
use crate::domain::import::ImportBatch;
use crate::domain::norm::NormRecord;
use crate::domain::record::ImportRecord;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ImportRecordRepository Trait
// ==========================================
// 用途: 导入会话提交时落库
// 实现者: ImportRecordRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ImportRecordRepository: Send + Sync {
    // ===== 批量写入（事务化）=====

    /// 写入批次 + 批量插入记录
    ///
    /// # 参数
    /// - batch: 批次元信息（project_id 作用于全部记录）
    /// - records: 强类型记录（保持原有顺序）
    ///
    /// # 返回
    /// - Ok(usize): 成功插入的记录数
    /// - Err: 数据库错误（整个事务回滚，批次行也不保留）
    async fn batch_insert_records(
        &self,
        batch: ImportBatch,
        records: Vec<ImportRecord>,
    ) -> RepositoryResult<usize>;

    // ===== 查询 =====

    /// 按 ID 查询批次
    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>>;

    /// 查询项目最近的批次（按导入时间倒序）
    async fn list_batches(&self, project_id: &str, limit: usize)
        -> RepositoryResult<Vec<ImportBatch>>;

    /// 查询项目的成本条目（按写入顺序）
    async fn list_cost_entries(&self, project_id: &str) -> RepositoryResult<Vec<CostRecord>>;

    /// 查询项目的材料定额（按写入顺序）
    async fn list_norm_entries(&self, project_id: &str) -> RepositoryResult<Vec<NormRecord>>;
}
