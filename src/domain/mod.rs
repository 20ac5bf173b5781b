// ==========================================
// 工程项目管理平台 - 领域模型层
// ==========================================
// 职责: 定义导入相关实体与类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod cost;
pub mod import;
pub mod norm;
pub mod record;
pub mod types;

// 重导出核心类型
pub use cost::{CostCategory, CostRecord, CostStatus, PaymentMethod};
pub use import::{
    CellValue, ColumnMapping, FieldDefinition, ImportBatch, ParsedSheet, PreviewSummary, RawRow,
    ValidationError, ValidationErrorKind,
};
pub use norm::NormRecord;
pub use record::ImportRecord;
pub use types::{EnumSet, FieldCheck, ImportKind, SessionState, ValueType};
