// ==========================================
// 工程项目管理平台 - 材料定额领域模型
// ==========================================
// 用途: 定额导入的强类型记录（每项工作 × 每种材料的消耗量）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// NormRecord - 材料定额条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormRecord {
    // ===== 工作项 =====
    pub work_code: String,
    pub work_name: String,
    pub work_unit: String,

    // ===== 材料 =====
    pub material_code: String,
    pub material_name: String,
    pub material_unit: String,

    // ===== 定额 =====
    pub norm_quantity: f64,    // 单位工作量的材料消耗（> 0）
    pub notes: Option<String>, // 备注

    // 元信息
    pub row_number: usize,
}
