// ==========================================
// 工程项目管理平台 - 行校验器
// ==========================================
// 阶段 3: 映射 + 转换 + 字段校验 → 记录 / 校验错误
// 规则: 行与行相互独立；一行可产生多条错误；
//       零错误的行产出且仅产出一条记录
// 行号: 数据行下标 + 2（表头为第 1 行）
// ==========================================

use crate::domain::import::{
    CellValue, ColumnMapping, FieldDefinition, RawRow, ValidationError, ValidationErrorKind,
};
use crate::domain::record::ImportRecord;
use crate::i18n;
use crate::importer::field_catalog::FieldCatalog;
use crate::importer::record_builder::RecordBuilder;
use crate::importer::value_coercer::{FieldValue, ValueCoercer};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// 首个数据行的行号
pub const FIRST_DATA_ROW_NUMBER: usize = 2;

// ==========================================
// ValidationOutcome - 校验结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub records: Vec<ImportRecord>,
    pub errors: Vec<ValidationError>,
}

impl ValidationOutcome {
    /// 至少有一条错误的行数
    pub fn invalid_row_count(&self) -> usize {
        self.errors
            .iter()
            .map(|e| e.row_number)
            .collect::<HashSet<_>>()
            .len()
    }
}

/// 已解析列下标的字段
struct ResolvedField<'a> {
    def: &'a FieldDefinition,
    column: Option<usize>,
}

// ==========================================
// RowValidator
// ==========================================
pub struct RowValidator<'a> {
    catalog: &'a FieldCatalog,
    coercer: ValueCoercer,
    locale: &'a str,
}

impl<'a> RowValidator<'a> {
    pub fn new(catalog: &'a FieldCatalog, locale: &'a str) -> Self {
        Self {
            catalog,
            coercer: ValueCoercer::new(),
            locale,
        }
    }

    /// 校验全部数据行
    #[instrument(skip_all, fields(kind = %self.catalog.kind(), rows = rows.len()))]
    pub fn validate_rows(
        &self,
        headers: &[String],
        rows: &[RawRow],
        mappings: &[ColumnMapping],
    ) -> ValidationOutcome {
        let fields = self.resolve_columns(headers, mappings);
        let mut outcome = ValidationOutcome::default();

        for (index, row) in rows.iter().enumerate() {
            match self.validate_row(index + FIRST_DATA_ROW_NUMBER, row, &fields) {
                Ok(record) => outcome.records.push(record),
                Err(errors) => outcome.errors.extend(errors),
            }
        }

        info!(
            valid_rows = outcome.records.len(),
            invalid_rows = outcome.invalid_row_count(),
            errors = outcome.errors.len(),
            "行校验完成"
        );
        outcome
    }

    /// 按目录顺序为每个字段定位源列（同名表头取第一个）
    fn resolve_columns(
        &self,
        headers: &[String],
        mappings: &[ColumnMapping],
    ) -> Vec<ResolvedField<'a>> {
        self.catalog
            .fields()
            .iter()
            .map(|def| {
                let source = mappings
                    .iter()
                    .find(|m| m.field_id == def.id)
                    .filter(|m| m.is_mapped())
                    .and_then(|m| m.source_column.as_deref());

                let column = source.and_then(|name| {
                    let idx = headers.iter().position(|h| h == name);
                    if idx.is_none() {
                        warn!(field = def.id, column = name, "映射的列不在表头中，按未映射处理");
                    }
                    idx
                });

                ResolvedField { def, column }
            })
            .collect()
    }

    fn validate_row(
        &self,
        row_number: usize,
        row: &RawRow,
        fields: &[ResolvedField<'_>],
    ) -> Result<ImportRecord, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut builder = RecordBuilder::new(self.catalog.kind(), row_number);

        for field in fields {
            let def = field.def;
            let Some(column) = field.column else {
                if def.required {
                    errors.push(self.error(
                        row_number,
                        def,
                        ValidationErrorKind::ColumnNotMapped,
                        &CellValue::Empty,
                    ));
                } else {
                    builder.set(def.id, FieldValue::Absent);
                }
                continue;
            };

            let cell = row.cell(column);
            match self.coercer.coerce(def, cell) {
                Ok(value) => builder.set(def.id, value),
                Err(kind) => errors.push(self.error(row_number, def, kind, cell)),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        builder.build().map_err(|missing| {
            let def = self.catalog.field(missing);
            vec![ValidationError {
                row_number,
                field_id: missing.to_string(),
                kind: ValidationErrorKind::Required,
                message: i18n::t_in_with_args(
                    self.locale,
                    ValidationErrorKind::Required.message_key(),
                    &[("field", def.map(|d| d.label).unwrap_or(missing))],
                ),
                raw_value: String::new(),
            }]
        })
    }

    fn error(
        &self,
        row_number: usize,
        def: &FieldDefinition,
        kind: ValidationErrorKind,
        cell: &CellValue,
    ) -> ValidationError {
        let raw_value = cell.to_text();
        let message = i18n::t_in_with_args(
            self.locale,
            kind.message_key(),
            &[("field", def.label), ("value", raw_value.as_str())],
        );

        ValidationError {
            row_number,
            field_id: def.id.to_string(),
            kind,
            message,
            raw_value,
        }
    }
}
