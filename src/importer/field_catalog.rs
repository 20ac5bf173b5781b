// ==========================================
// 工程项目管理平台 - 字段目录
// ==========================================
// 职责: 成本条目 / 材料定额 两套目标字段定义
// 说明: 目录顺序即校验顺序，也是模板列顺序
// ==========================================

use crate::domain::import::FieldDefinition;
use crate::domain::types::{EnumSet, FieldCheck, ImportKind, ValueType};
use std::collections::HashMap;

/// 成本条目字段 ID
pub mod cost_fields {
    pub const CODE: &str = "code";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY: &str = "category";
    pub const DATE: &str = "date";
    pub const VENDOR: &str = "vendor";
    pub const BOQ_ITEM: &str = "boq_item";
    pub const BUDGET: &str = "budget";
    pub const ACTUAL: &str = "actual";
    pub const COMMITTED: &str = "committed";
    pub const STATUS: &str = "status";
    pub const INVOICE_NUMBER: &str = "invoice_number";
    pub const PAYMENT_METHOD: &str = "payment_method";
    pub const NOTES: &str = "notes";
}

/// 材料定额字段 ID
pub mod norm_fields {
    pub const WORK_CODE: &str = "work_code";
    pub const WORK_NAME: &str = "work_name";
    pub const WORK_UNIT: &str = "work_unit";
    pub const MATERIAL_CODE: &str = "material_code";
    pub const MATERIAL_NAME: &str = "material_name";
    pub const MATERIAL_UNIT: &str = "material_unit";
    pub const NORM_QUANTITY: &str = "norm_quantity";
    pub const NOTES: &str = "notes";
}

// ==========================================
// FieldCatalog - 字段目录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCatalog {
    kind: ImportKind,
    fields: Vec<FieldDefinition>,
}

impl FieldCatalog {
    pub fn for_kind(kind: ImportKind) -> Self {
        match kind {
            ImportKind::Cost => Self::cost(),
            ImportKind::Norm => Self::norm(),
        }
    }

    /// 成本条目目录（7 个必填字段）
    pub fn cost() -> Self {
        use cost_fields::*;

        let fields = vec![
            field(CODE, "Mã chi phí", true, ValueType::Text, &["mã", "code"], "VT-001"),
            field(
                DESCRIPTION,
                "Mô tả",
                true,
                ValueType::Text,
                &["mô tả", "diễn giải", "nội dung", "description"],
                "Thép D16",
            ),
            field(
                CATEGORY,
                "Danh mục",
                true,
                ValueType::Enum(EnumSet::CostCategory),
                &["danh mục", "loại chi phí", "phân loại", "category"],
                "Vật tư",
            ),
            field(DATE, "Ngày", true, ValueType::Date, &["ngày", "date"], "15/03/2024"),
            field(
                VENDOR,
                "Nhà cung cấp",
                true,
                ValueType::Text,
                &["nhà cung cấp", "ncc", "vendor", "supplier"],
                "Công ty Thép Hòa Phát",
            ),
            field(
                BOQ_ITEM,
                "Hạng mục BOQ",
                false,
                ValueType::Text,
                &["boq", "hạng mục"],
                "BOQ-02.01",
            ),
            field(
                BUDGET,
                "Ngân sách",
                true,
                ValueType::Number,
                &["ngân sách", "dự toán", "budget"],
                "1200000000",
            )
            .with_check(FieldCheck::NonNegative),
            field(
                ACTUAL,
                "Thực tế",
                false,
                ValueType::Number,
                &["thực tế", "thực chi", "actual"],
                "1150000000",
            ),
            field(
                COMMITTED,
                "Cam kết",
                false,
                ValueType::Number,
                &["cam kết", "committed"],
                "1200000000",
            ),
            field(
                STATUS,
                "Trạng thái",
                true,
                ValueType::Enum(EnumSet::CostStatus),
                &["trạng thái", "tình trạng", "status"],
                "Đã thanh toán",
            ),
            field(
                INVOICE_NUMBER,
                "Số hóa đơn",
                false,
                ValueType::Text,
                &["hóa đơn", "invoice"],
                "HD-0001234",
            ),
            field(
                PAYMENT_METHOD,
                "Phương thức thanh toán",
                false,
                ValueType::Enum(EnumSet::PaymentMethod),
                &["phương thức", "thanh toán", "payment"],
                "Chuyển khoản",
            ),
            field(
                NOTES,
                "Ghi chú",
                false,
                ValueType::Text,
                &["ghi chú", "notes", "note", "remark"],
                "Đợt 1",
            ),
        ];

        Self {
            kind: ImportKind::Cost,
            fields,
        }
    }

    /// 材料定额目录
    ///
    /// 工作项与材料的 mã/tên/đơn vị 成对出现，关键词必须带限定词，
    /// 否则 "mã" 会同时命中两列
    pub fn norm() -> Self {
        use norm_fields::*;

        let fields = vec![
            field(
                WORK_CODE,
                "Mã công việc",
                true,
                ValueType::Text,
                &["mã công việc", "mã hiệu", "work code"],
                "AF.11111",
            ),
            field(
                WORK_NAME,
                "Tên công việc",
                true,
                ValueType::Text,
                &["tên công việc", "work name"],
                "Bê tông lót móng đá 4x6 M100",
            ),
            field(
                WORK_UNIT,
                "Đơn vị công việc",
                true,
                ValueType::Text,
                &["đơn vị công việc", "đvt công việc", "work unit"],
                "m3",
            ),
            field(
                MATERIAL_CODE,
                "Mã vật tư",
                true,
                ValueType::Text,
                &["mã vật tư", "material code"],
                "XM-PCB30",
            ),
            field(
                MATERIAL_NAME,
                "Tên vật tư",
                true,
                ValueType::Text,
                &["tên vật tư", "material name"],
                "Xi măng PCB30",
            ),
            field(
                MATERIAL_UNIT,
                "Đơn vị vật tư",
                true,
                ValueType::Text,
                &["đơn vị vật tư", "đvt vật tư", "material unit"],
                "kg",
            ),
            field(
                NORM_QUANTITY,
                "Định mức",
                true,
                ValueType::Number,
                &["định mức", "hao phí", "quantity", "norm"],
                "200.85",
            )
            .with_check(FieldCheck::Positive),
            field(
                NOTES,
                "Ghi chú",
                false,
                ValueType::Text,
                &["ghi chú", "notes", "note", "remark"],
                "",
            ),
        ];

        Self {
            kind: ImportKind::Norm,
            fields,
        }
    }

    /// 追加配置中的关键词别名（field_id → [alias]），未知字段忽略
    pub fn with_extra_keywords(mut self, extra: &HashMap<String, Vec<String>>) -> Self {
        for def in self.fields.iter_mut() {
            if let Some(aliases) = extra.get(def.id) {
                for alias in aliases {
                    if !alias.trim().is_empty() && !def.keywords.contains(alias) {
                        def.keywords.push(alias.clone());
                    }
                }
            }
        }
        self
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.label).collect()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.required)
    }
}

fn field(
    id: &'static str,
    label: &'static str,
    required: bool,
    value_type: ValueType,
    keywords: &[&str],
    example: &'static str,
) -> FieldDefinition {
    FieldDefinition {
        id,
        label,
        required,
        value_type,
        check: FieldCheck::None,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        example,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_catalog_has_seven_required_fields() {
        let catalog = FieldCatalog::cost();
        let required: Vec<&str> = catalog.required_fields().map(|f| f.id).collect();
        assert_eq!(
            required,
            vec!["code", "description", "category", "date", "vendor", "budget", "status"]
        );
        assert_eq!(catalog.fields().len(), 13);
    }

    #[test]
    fn test_field_checks() {
        let cost = FieldCatalog::cost();
        assert_eq!(cost.field("budget").unwrap().check, FieldCheck::NonNegative);
        assert_eq!(cost.field("actual").unwrap().check, FieldCheck::None);

        let norm = FieldCatalog::norm();
        assert_eq!(norm.field("norm_quantity").unwrap().check, FieldCheck::Positive);
    }

    #[test]
    fn test_field_ids_unique() {
        for catalog in [FieldCatalog::cost(), FieldCatalog::norm()] {
            let mut ids: Vec<&str> = catalog.fields().iter().map(|f| f.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), catalog.fields().len());
        }
    }

    #[test]
    fn test_with_extra_keywords() {
        let mut extra = HashMap::new();
        extra.insert("vendor".to_string(), vec!["đơn vị cung ứng".to_string()]);
        extra.insert("unknown".to_string(), vec!["x".to_string()]);

        let catalog = FieldCatalog::cost().with_extra_keywords(&extra);
        let vendor = catalog.field("vendor").unwrap();
        assert_eq!(vendor.keywords.last().unwrap(), "đơn vị cung ứng");
        assert!(catalog.field("unknown").is_none());
    }
}
