// ==========================================
// 工程项目管理平台 - 成本条目领域模型
// ==========================================
// 用途: 成本导入的强类型记录，提交后写入 cost_entry 表
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CostCategory - 成本类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Material,      // 材料（vật tư）
    Labor,         // 人工（nhân công）
    Equipment,     // 机械设备（máy móc / thiết bị）
    Subcontractor, // 分包（thầu phụ）
    Overhead,      // 间接费（chi phí chung）
    Other,         // 其他（khác）
}

impl CostCategory {
    pub fn code(&self) -> &'static str {
        match self {
            CostCategory::Material => "material",
            CostCategory::Labor => "labor",
            CostCategory::Equipment => "equipment",
            CostCategory::Subcontractor => "subcontractor",
            CostCategory::Overhead => "overhead",
            CostCategory::Other => "other",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "material" => Some(CostCategory::Material),
            "labor" => Some(CostCategory::Labor),
            "equipment" => Some(CostCategory::Equipment),
            "subcontractor" => Some(CostCategory::Subcontractor),
            "overhead" => Some(CostCategory::Overhead),
            "other" => Some(CostCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// CostStatus - 成本状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostStatus {
    Pending,  // 待审批（chờ duyệt）
    Approved, // 已审批（đã duyệt）
    Paid,     // 已付款（đã thanh toán）
    Rejected, // 已驳回（từ chối）
}

impl CostStatus {
    pub fn code(&self) -> &'static str {
        match self {
            CostStatus::Pending => "pending",
            CostStatus::Approved => "approved",
            CostStatus::Paid => "paid",
            CostStatus::Rejected => "rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(CostStatus::Pending),
            "approved" => Some(CostStatus::Approved),
            "paid" => Some(CostStatus::Paid),
            "rejected" => Some(CostStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for CostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// PaymentMethod - 支付方式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer, // 转账（chuyển khoản）
    Cash,         // 现金（tiền mặt）
    Check,        // 支票（séc）
    Card,         // 刷卡（thẻ）
}

impl PaymentMethod {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Check => "check",
            PaymentMethod::Card => "card",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "cash" => Some(PaymentMethod::Cash),
            "check" => Some(PaymentMethod::Check),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// CostRecord - 成本条目
// ==========================================
// 仅由零错误的数据行构建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    // ===== 必填字段 =====
    pub code: String,               // 成本编码
    pub description: String,        // 描述
    pub category: CostCategory,     // 类别
    pub date: NaiveDate,            // 发生日期（YYYY-MM-DD）
    pub vendor: String,             // 供应商
    pub budget: f64,                // 预算（>= 0）
    pub status: CostStatus,         // 状态

    // ===== 可选字段 =====
    pub boq_item: Option<String>,             // BOQ 清单项
    pub actual: f64,                          // 实际发生（缺省 0）
    pub committed: f64,                       // 已承诺（缺省 0）
    pub invoice_number: Option<String>,       // 发票号
    pub payment_method: Option<PaymentMethod>, // 支付方式
    pub notes: Option<String>,                // 备注

    // 元信息
    pub row_number: usize, // 原始文件行号
}
