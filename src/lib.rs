// ==========================================
// 工程项目管理平台 - 表格批量导入核心库
// ==========================================
// 导入对象: 成本条目 (cost) / 材料定额 (norm)
// 技术栈: Rust + SQLite
// 流程: 上传 → 列映射 → 预览 → 提交（人工确认后才落库）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "vi");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 表格解析、映射、校验、会话
pub mod importer;

// 配置层 - 导入设置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EnumSet, FieldCheck, ImportKind, SessionState, ValueType};

// 领域实体
pub use domain::{
    CellValue, ColumnMapping, CostRecord, ImportBatch, ImportRecord, NormRecord, PreviewSummary,
    ValidationError, ValidationErrorKind,
};

// 导入
pub use importer::{
    AutoMapper, CommitContext, CommitReport, FieldCatalog, ImportError, ImportResult,
    ImportSession, RowValidator, SpreadsheetFormat, SpreadsheetReader, TemplateGenerator,
    ValueCoercer,
};

// 配置与仓储
pub use config::{ConfigManager, ImportConfigReader, ImportSettings};
pub use repository::{ImportRecordRepository, ImportRecordRepositoryImpl};

// ==========================================
// 常量定义
// ==========================================

// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工程项目管理平台 - 批量导入";
