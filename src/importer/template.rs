// ==========================================
// 工程项目管理平台 - 导入模板生成
// ==========================================
// 输出: 表头 = 目录显示名（目录顺序），第二行为示例值
// 模板表头经自动映射后每个字段都映射到自身列
// ==========================================

use crate::domain::types::{ImportKind, ValueType};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_catalog::FieldCatalog;
use crate::importer::file_parser::SpreadsheetFormat;
use crate::importer::value_coercer::parse_number;
use anyhow::Context;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::{debug, info};

const HEADER_ROW: u32 = 0;
const EXAMPLE_ROW: u32 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 生成 xlsx 模板
    pub fn generate_xlsx(&self, catalog: &FieldCatalog) -> ImportResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet
            .set_name(sheet_name(catalog.kind()))
            .context("设置工作表名失败")?;
        write_header(worksheet, catalog)?;
        write_example_row(worksheet, catalog)?;

        let buffer = workbook.save_to_buffer().context("生成 xlsx 模板失败")?;
        debug!(kind = %catalog.kind(), bytes = buffer.len(), "xlsx 模板已生成");
        Ok(buffer)
    }

    /// 生成 CSV 模板（UTF-8）
    pub fn generate_csv(&self, catalog: &FieldCatalog) -> ImportResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(catalog.labels())?;
        writer.write_record(catalog.fields().iter().map(|f| f.example))?;

        writer
            .into_inner()
            .map_err(|e| ImportError::InternalError(format!("生成 CSV 模板失败: {}", e)))
    }

    /// 按扩展名写出模板文件
    pub async fn write_to_path<P: AsRef<Path>>(
        &self,
        catalog: &FieldCatalog,
        file_path: P,
    ) -> ImportResult<()> {
        let path = file_path.as_ref();
        let bytes = match SpreadsheetFormat::from_path(path)? {
            SpreadsheetFormat::Csv => self.generate_csv(catalog)?,
            SpreadsheetFormat::Workbook => self.generate_xlsx(catalog)?,
        };

        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| ImportError::FileWriteError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        info!(kind = %catalog.kind(), path = %path.display(), "导入模板已写出");
        Ok(())
    }
}

fn sheet_name(kind: ImportKind) -> &'static str {
    match kind {
        ImportKind::Cost => "Chi phi",
        ImportKind::Norm => "Dinh muc",
    }
}

fn write_header(ws: &mut Worksheet, catalog: &FieldCatalog) -> anyhow::Result<()> {
    let bold = Format::new().set_bold();

    for (col, def) in catalog.fields().iter().enumerate() {
        let col = col as u16;
        ws.write_string_with_format(HEADER_ROW, col, def.label, &bold)?;
        ws.set_column_width(col, (def.label.chars().count().max(12) + 2) as f64)?;
    }
    Ok(())
}

fn write_example_row(ws: &mut Worksheet, catalog: &FieldCatalog) -> anyhow::Result<()> {
    for (col, def) in catalog.fields().iter().enumerate() {
        let col = col as u16;
        if def.example.is_empty() {
            continue;
        }

        // 数值示例按数字写入，读回时为数值单元格
        match (def.value_type, parse_number(def.example)) {
            (ValueType::Number, Some(n)) => {
                ws.write_number(EXAMPLE_ROW, col, n)?;
            }
            _ => {
                ws.write_string(EXAMPLE_ROW, col, def.example)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::CellValue;
    use crate::importer::auto_mapper::AutoMapper;
    use crate::importer::file_parser::SpreadsheetReader;

    fn assert_template_maps_to_itself(catalog: &FieldCatalog, format: SpreadsheetFormat) {
        let generator = TemplateGenerator::new();
        let bytes = match format {
            SpreadsheetFormat::Workbook => generator.generate_xlsx(catalog).unwrap(),
            SpreadsheetFormat::Csv => generator.generate_csv(catalog).unwrap(),
        };

        let sheet = SpreadsheetReader::new().read_bytes(&bytes, format).unwrap();
        assert_eq!(sheet.headers, catalog.labels());
        assert_eq!(sheet.rows.len(), 1);

        let mappings = AutoMapper::new().auto_map(catalog, &sheet.headers);
        for (mapping, def) in mappings.iter().zip(catalog.fields()) {
            assert_eq!(mapping.source_column.as_deref(), Some(def.label), "{}", def.id);
        }
    }

    #[test]
    fn test_xlsx_template_maps_to_itself() {
        assert_template_maps_to_itself(&FieldCatalog::cost(), SpreadsheetFormat::Workbook);
        assert_template_maps_to_itself(&FieldCatalog::norm(), SpreadsheetFormat::Workbook);
    }

    #[test]
    fn test_csv_template_maps_to_itself() {
        assert_template_maps_to_itself(&FieldCatalog::cost(), SpreadsheetFormat::Csv);
        assert_template_maps_to_itself(&FieldCatalog::norm(), SpreadsheetFormat::Csv);
    }

    #[test]
    fn test_xlsx_numeric_examples_are_numbers() {
        let catalog = FieldCatalog::cost();
        let bytes = TemplateGenerator::new().generate_xlsx(&catalog).unwrap();
        let sheet = SpreadsheetReader::new()
            .read_bytes(&bytes, SpreadsheetFormat::Workbook)
            .unwrap();

        let budget_col = sheet.headers.iter().position(|h| h == "Ngân sách").unwrap();
        assert_eq!(sheet.rows[0].cell(budget_col), &CellValue::Number(1_200_000_000.0));
    }

    #[tokio::test]
    async fn test_write_to_path_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("khong_co_thu_muc").join("mau.csv");

        match TemplateGenerator::new()
            .write_to_path(&FieldCatalog::cost(), &target)
            .await
        {
            Err(ImportError::FileWriteError { path, .. }) => {
                assert!(path.ends_with("mau.csv"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_write_to_path_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let result = TemplateGenerator::new()
            .write_to_path(&FieldCatalog::norm(), dir.path().join("mau.txt"))
            .await;
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
