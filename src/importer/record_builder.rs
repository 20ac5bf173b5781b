// ==========================================
// 工程项目管理平台 - 记录构建器
// ==========================================
// 职责: 按导入种类把字段值组装为强类型记录
// 约束: 必填字段缺值 → 不产出记录（返回缺失字段 ID）
// ==========================================

use crate::domain::cost::{CostCategory, CostRecord, CostStatus, PaymentMethod};
use crate::domain::norm::NormRecord;
use crate::domain::record::ImportRecord;
use crate::domain::types::ImportKind;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::field_catalog::{cost_fields, norm_fields};
use crate::importer::value_coercer::FieldValue;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct RecordBuilder {
    kind: ImportKind,
    row_number: usize,
    values: HashMap<&'static str, FieldValue>,
}

impl RecordBuilder {
    pub fn new(kind: ImportKind, row_number: usize) -> Self {
        Self {
            kind,
            row_number,
            values: HashMap::new(),
        }
    }

    pub fn set(&mut self, field_id: &'static str, value: FieldValue) {
        self.values.insert(field_id, value);
    }

    /// 组装记录；Err 携带第一个缺值的必填字段
    pub fn build(self) -> Result<ImportRecord, &'static str> {
        match self.kind {
            ImportKind::Cost => self.build_cost().map(ImportRecord::Cost),
            ImportKind::Norm => self.build_norm().map(ImportRecord::Norm),
        }
    }

    fn build_cost(&self) -> Result<CostRecord, &'static str> {
        use cost_fields::*;

        Ok(CostRecord {
            code: self.required_text(CODE)?,
            description: self.required_text(DESCRIPTION)?,
            category: self
                .enum_code(CATEGORY)
                .and_then(CostCategory::from_code)
                .ok_or(CATEGORY)?,
            date: self.date(DATE).ok_or(DATE)?,
            vendor: self.required_text(VENDOR)?,
            budget: self.number(BUDGET).ok_or(BUDGET)?,
            status: self
                .enum_code(STATUS)
                .and_then(CostStatus::from_code)
                .ok_or(STATUS)?,
            boq_item: self.optional_text(BOQ_ITEM),
            actual: self.number(ACTUAL).unwrap_or(0.0),
            committed: self.number(COMMITTED).unwrap_or(0.0),
            invoice_number: self.optional_text(INVOICE_NUMBER),
            payment_method: self.enum_code(PAYMENT_METHOD).and_then(PaymentMethod::from_code),
            notes: self.optional_text(NOTES),
            row_number: self.row_number,
        })
    }

    fn build_norm(&self) -> Result<NormRecord, &'static str> {
        use norm_fields::*;

        Ok(NormRecord {
            work_code: self.required_text(WORK_CODE)?,
            work_name: self.required_text(WORK_NAME)?,
            work_unit: self.required_text(WORK_UNIT)?,
            material_code: self.required_text(MATERIAL_CODE)?,
            material_name: self.required_text(MATERIAL_NAME)?,
            material_unit: self.required_text(MATERIAL_UNIT)?,
            norm_quantity: self.number(NORM_QUANTITY).ok_or(NORM_QUANTITY)?,
            notes: self.optional_text(NOTES),
            row_number: self.row_number,
        })
    }

    fn required_text(&self, field_id: &'static str) -> Result<String, &'static str> {
        self.optional_text(field_id).ok_or(field_id)
    }

    fn optional_text(&self, field_id: &str) -> Option<String> {
        let raw = self
            .values
            .get(field_id)
            .and_then(FieldValue::as_text)
            .map(str::to_string);
        DataCleaner.normalize_null(raw)
    }

    fn number(&self, field_id: &str) -> Option<f64> {
        self.values.get(field_id).and_then(FieldValue::as_number)
    }

    fn date(&self, field_id: &str) -> Option<NaiveDate> {
        self.values.get(field_id).and_then(FieldValue::as_date)
    }

    fn enum_code(&self, field_id: &str) -> Option<&'static str> {
        self.values.get(field_id).and_then(FieldValue::as_enum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_norm_record() {
        let mut builder = RecordBuilder::new(ImportKind::Norm, 2);
        for (id, value) in [
            (norm_fields::WORK_CODE, "AF.11111"),
            (norm_fields::WORK_NAME, "Bê tông lót móng"),
            (norm_fields::WORK_UNIT, "m3"),
            (norm_fields::MATERIAL_CODE, "XM-PCB30"),
            (norm_fields::MATERIAL_NAME, "Xi măng PCB30"),
            (norm_fields::MATERIAL_UNIT, "kg"),
        ] {
            builder.set(id, FieldValue::Text(value.to_string()));
        }
        builder.set(norm_fields::NORM_QUANTITY, FieldValue::Number(200.85));
        builder.set(norm_fields::NOTES, FieldValue::Text(String::new()));

        let record = builder.build().unwrap();
        let norm = record.as_norm().unwrap();
        assert_eq!(norm.work_code, "AF.11111");
        assert_eq!(norm.norm_quantity, 200.85);
        assert_eq!(norm.notes, None);
        assert_eq!(norm.row_number, 2);
    }

    #[test]
    fn test_build_rejects_missing_required() {
        let mut builder = RecordBuilder::new(ImportKind::Cost, 3);
        builder.set(cost_fields::CODE, FieldValue::Text("VT-001".to_string()));
        assert_eq!(builder.build().unwrap_err(), cost_fields::DESCRIPTION);
    }

    #[test]
    fn test_build_cost_optional_defaults() {
        let mut builder = RecordBuilder::new(ImportKind::Cost, 2);
        builder.set(cost_fields::CODE, FieldValue::Text("VT-001".to_string()));
        builder.set(cost_fields::DESCRIPTION, FieldValue::Text("Thép".to_string()));
        builder.set(cost_fields::CATEGORY, FieldValue::Enum("material"));
        builder.set(
            cost_fields::DATE,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
        );
        builder.set(cost_fields::VENDOR, FieldValue::Text("NCC A".to_string()));
        builder.set(cost_fields::BUDGET, FieldValue::Number(0.0));
        builder.set(cost_fields::STATUS, FieldValue::Enum("pending"));
        builder.set(cost_fields::PAYMENT_METHOD, FieldValue::Absent);

        let record = builder.build().unwrap();
        let cost = record.as_cost().unwrap();
        assert_eq!(cost.category, CostCategory::Material);
        assert_eq!(cost.actual, 0.0);
        assert_eq!(cost.committed, 0.0);
        assert_eq!(cost.payment_method, None);
        assert_eq!(cost.boq_item, None);
    }
}
