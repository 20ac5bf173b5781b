// ==========================================
// 工程项目管理平台 - 导入记录
// ==========================================
// 按导入种类区分的强类型记录，交给提交协作方落库
// ==========================================

use crate::domain::cost::CostRecord;
use crate::domain::norm::NormRecord;
use crate::domain::types::ImportKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportRecord {
    Cost(CostRecord),
    Norm(NormRecord),
}

impl ImportRecord {
    pub fn kind(&self) -> ImportKind {
        match self {
            ImportRecord::Cost(_) => ImportKind::Cost,
            ImportRecord::Norm(_) => ImportKind::Norm,
        }
    }

    pub fn row_number(&self) -> usize {
        match self {
            ImportRecord::Cost(r) => r.row_number,
            ImportRecord::Norm(r) => r.row_number,
        }
    }

    pub fn as_cost(&self) -> Option<&CostRecord> {
        match self {
            ImportRecord::Cost(r) => Some(r),
            ImportRecord::Norm(_) => None,
        }
    }

    pub fn as_norm(&self) -> Option<&NormRecord> {
        match self {
            ImportRecord::Norm(r) => Some(r),
            ImportRecord::Cost(_) => None,
        }
    }
}
