// ==========================================
// 工程项目管理平台 - 导入领域模型
// ==========================================
// 职责: 单元格值 / 原始行 / 字段定义 / 列映射 / 校验错误 / 导入批次
// 生命周期: 除 ImportBatch 外，均仅存在于一次导入会话内
// ==========================================

use crate::domain::types::{FieldCheck, ImportKind, ValueType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
// 读取器产出的单元格只有三种形态：文本 / 数值 / 空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// 空单元格（空串 / 纯空白文本同样视为空）
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 文本形式（数值整数不带小数位）
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Empty => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// 数值转文本：整数值输出为 "1200" 而不是 "1200.0"
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// RawRow - 原始数据行
// ==========================================
// 与表头按位置对齐；读取后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<CellValue>,
}

impl RawRow {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// 取指定列的单元格，越界视为空
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    /// 全部单元格为空值或空串（纯空白文本不算空）
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| match cell {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        })
    }
}

// ==========================================
// ParsedSheet - 解析后的工作表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSheet {
    pub sheet_name: String,    // 工作表名（CSV 为文件名或 "csv"）
    pub headers: Vec<String>,  // 表头（已 TRIM）
    pub rows: Vec<RawRow>,     // 数据行（已剔除全空行）
}

// ==========================================
// FieldDefinition - 目标字段定义
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub id: &'static str,         // 字段 ID
    pub label: &'static str,      // 显示名（同时作为模板表头）
    pub required: bool,           // 是否必填
    pub value_type: ValueType,    // 值类型
    pub check: FieldCheck,        // 附加数值校验
    pub keywords: Vec<String>,    // 表头匹配关键词
    pub example: &'static str,    // 模板示例值
}

impl FieldDefinition {
    /// 设置附加数值校验
    pub fn with_check(mut self, check: FieldCheck) -> Self {
        self.check = check;
        self
    }
}

// ==========================================
// ColumnMapping - 字段 ↔ 源列映射
// ==========================================
// source_column 在 Mapping 状态下可由用户修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub field_id: String,
    pub source_column: Option<String>,
    pub required: bool,
}

impl ColumnMapping {
    pub fn new(field: &FieldDefinition, source_column: Option<String>) -> Self {
        Self {
            field_id: field.id.to_string(),
            source_column,
            required: field.required,
        }
    }

    /// 返回替换源列后的新映射（空串视为未映射）
    pub fn with_source(self, source_column: Option<String>) -> Self {
        Self {
            source_column: source_column.filter(|c| !c.trim().is_empty()),
            ..self
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.source_column
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }
}

// ==========================================
// ValidationErrorKind - 行级校验错误类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    ColumnNotMapped,   // 必填字段未映射列
    Required,          // 必填值为空
    InvalidNumber,     // 数值无法解析
    MustBeNonNegative, // 须 >= 0
    MustBePositive,    // 须 > 0
    InvalidDate,       // 日期无法识别
    InvalidEnum,       // 枚举值无法识别
}

impl ValidationErrorKind {
    /// i18n 消息键
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationErrorKind::ColumnNotMapped => "validation.column_not_mapped",
            ValidationErrorKind::Required => "validation.required",
            ValidationErrorKind::InvalidNumber => "validation.invalid_number",
            ValidationErrorKind::MustBeNonNegative => "validation.must_be_non_negative",
            ValidationErrorKind::MustBePositive => "validation.must_be_positive",
            ValidationErrorKind::InvalidDate => "validation.invalid_date",
            ValidationErrorKind::InvalidEnum => "validation.invalid_enum",
        }
    }
}

// ==========================================
// ValidationError - 行级校验错误
// ==========================================
// 行号: 表头为第 1 行，首个数据行为第 2 行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row_number: usize,
    pub field_id: String,
    pub kind: ValidationErrorKind,
    pub message: String,
    pub raw_value: String,
}

// ==========================================
// PreviewSummary - 预览汇总
// ==========================================
// 预览页并排展示有效记录数与完整错误列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub total_rows: usize,   // 数据行总数
    pub valid_rows: usize,   // 生成记录的行数
    pub invalid_rows: usize, // 至少一个错误的行数
    pub error_count: usize,  // 错误条目总数
    pub errors: Vec<ValidationError>,
}

// ==========================================
// ImportBatch - 导入批次
// ==========================================
// 用途: 提交时记录批次元信息
// 对齐: import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,                   // 批次 ID（UUID）
    pub import_kind: ImportKind,            // 导入种类
    pub project_id: String,                 // 所属项目（租户隔离）
    pub file_name: Option<String>,          // 源文件名
    pub total_rows: i32,                    // 数据行总数
    pub success_rows: i32,                  // 成功提交行数
    pub error_rows: i32,                    // 校验失败行数
    pub imported_at: DateTime<Utc>,         // 提交时间
    pub imported_by: Option<String>,        // 提交人
    pub elapsed_ms: i64,                    // 会话耗时（毫秒）
    pub error_report_json: Option<String>,  // 校验错误明细 JSON
}
