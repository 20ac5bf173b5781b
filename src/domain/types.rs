// ==========================================
// 工程项目管理平台 - 领域类型定义
// ==========================================
// 职责: 导入种类 / 字段值类型 / 字段校验规则 / 会话状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 导入种类 (Import Kind)
// ==========================================
// 两套并行字段目录共用同一导入引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Cost, // 成本条目
    Norm, // 材料定额
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Cost => "cost",
            ImportKind::Norm => "norm",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "cost" => Some(ImportKind::Cost),
            "norm" => Some(ImportKind::Norm),
            _ => None,
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 枚举集合 (Enum Set)
// ==========================================
// 每个枚举集合对应一张同义词表（见 importer::synonyms）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumSet {
    CostCategory,  // 成本类别
    CostStatus,    // 成本状态
    PaymentMethod, // 支付方式
}

impl EnumSet {
    /// 非必填枚举字段无法匹配时的回退值
    pub fn default_code(&self) -> Option<&'static str> {
        match self {
            EnumSet::CostStatus => Some("pending"),
            EnumSet::CostCategory => Some("other"),
            EnumSet::PaymentMethod => None,
        }
    }
}

// ==========================================
// 字段值类型 (Value Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "set", rename_all = "snake_case")]
pub enum ValueType {
    Text,
    Number,
    Date,
    Enum(EnumSet),
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Text => write!(f, "TEXT"),
            ValueType::Number => write!(f, "NUMBER"),
            ValueType::Date => write!(f, "DATE"),
            ValueType::Enum(set) => write!(f, "ENUM({:?})", set),
        }
    }
}

// ==========================================
// 字段附加校验 (Field Check)
// ==========================================
// 仅作用于数值字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCheck {
    #[default]
    None,
    NonNegative, // >= 0（如成本预算）
    Positive,    // > 0（如定额数量）
}

// ==========================================
// 导入会话状态 (Session State)
// ==========================================
// Upload → Mapping → Preview，任意状态可 reset 回 Upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Upload,  // 等待上传
    Mapping, // 列映射
    Preview, // 预览 / 提交
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Upload => write!(f, "UPLOAD"),
            SessionState::Mapping => write!(f, "MAPPING"),
            SessionState::Preview => write!(f, "PREVIEW"),
        }
    }
}
