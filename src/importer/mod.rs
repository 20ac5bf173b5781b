// ==========================================
// 工程项目管理平台 - 导入层
// ==========================================
// 职责: 表格文件 → 强类型成本条目 / 材料定额
// 流程: 读取 → 自动映射 → 人工调整 → 校验预览 → 提交
// 支持: Excel 工作簿, CSV
// ==========================================

// 模块声明
pub mod auto_mapper;
pub mod data_cleaner;
pub mod error;
pub mod field_catalog;
pub mod file_parser;
pub mod importer_trait;
pub mod record_builder;
pub mod row_validator;
pub mod session;
pub mod synonyms;
pub mod template;
pub mod value_coercer;

// 重导出核心类型
pub use auto_mapper::AutoMapper;
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use field_catalog::{cost_fields, norm_fields, FieldCatalog};
pub use file_parser::{CsvParser, ExcelParser, SpreadsheetFormat, SpreadsheetReader};
pub use row_validator::{RowValidator, ValidationOutcome};
pub use session::{CommitContext, CommitReport, ImportSession};
pub use template::TemplateGenerator;
pub use value_coercer::{FieldValue, ValueCoercer};

// 重导出 Trait 接口
pub use importer_trait::FileParser;
