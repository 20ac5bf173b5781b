// ==========================================
// 工程项目管理平台 - 列自动映射器
// ==========================================
// 阶段 1: 表头 → 目标字段
// 规则: 每个字段按表头从左到右扫描，取第一个
//       归一化后包含任一关键词（子串）的表头
// 结果仅为建议值，会话停留在 Mapping 供人工修正
// ==========================================

use crate::domain::import::{ColumnMapping, FieldDefinition};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::field_catalog::FieldCatalog;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoMapper;

impl AutoMapper {
    pub fn new() -> Self {
        Self
    }

    /// 为目录中每个字段生成一条映射（顺序与目录一致）
    #[instrument(skip_all, fields(kind = %catalog.kind(), headers = headers.len()))]
    pub fn auto_map(&self, catalog: &FieldCatalog, headers: &[String]) -> Vec<ColumnMapping> {
        let cleaner = DataCleaner;
        let normalized_headers: Vec<String> = headers
            .iter()
            .map(|h| cleaner.normalize_keyword(h))
            .collect();

        let mappings: Vec<ColumnMapping> = catalog
            .fields()
            .iter()
            .map(|def| {
                let source = self
                    .match_header(def, &normalized_headers)
                    .map(|idx| headers[idx].clone());
                ColumnMapping::new(def, source)
            })
            .collect();

        debug!(
            mapped = mappings.iter().filter(|m| m.is_mapped()).count(),
            total = mappings.len(),
            "自动映射完成"
        );
        mappings
    }

    /// 返回第一个命中的表头下标
    fn match_header(&self, def: &FieldDefinition, normalized_headers: &[String]) -> Option<usize> {
        let cleaner = DataCleaner;
        let keywords: Vec<String> = def
            .keywords
            .iter()
            .map(|k| cleaner.normalize_keyword(k))
            .filter(|k| !k.is_empty())
            .collect();

        normalized_headers.iter().position(|header| {
            !header.is_empty() && keywords.iter().any(|k| header.contains(k.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn source_of<'a>(mappings: &'a [ColumnMapping], field_id: &str) -> Option<&'a str> {
        mappings
            .iter()
            .find(|m| m.field_id == field_id)
            .and_then(|m| m.source_column.as_deref())
    }

    #[test]
    fn test_auto_map_vietnamese_cost_headers() {
        let catalog = FieldCatalog::cost();
        let hs = headers(&[
            "Mã chi phí",
            "Mô tả",
            "Danh mục",
            "Ngày",
            "Nhà cung cấp",
            "Ngân sách",
            "Trạng thái",
        ]);
        let mappings = AutoMapper::new().auto_map(&catalog, &hs);

        assert_eq!(mappings.len(), catalog.fields().len());
        assert_eq!(source_of(&mappings, "code"), Some("Mã chi phí"));
        assert_eq!(source_of(&mappings, "description"), Some("Mô tả"));
        assert_eq!(source_of(&mappings, "category"), Some("Danh mục"));
        assert_eq!(source_of(&mappings, "date"), Some("Ngày"));
        assert_eq!(source_of(&mappings, "vendor"), Some("Nhà cung cấp"));
        assert_eq!(source_of(&mappings, "budget"), Some("Ngân sách"));
        assert_eq!(source_of(&mappings, "status"), Some("Trạng thái"));
        assert_eq!(source_of(&mappings, "boq_item"), None);
        assert_eq!(source_of(&mappings, "payment_method"), None);
    }

    #[test]
    fn test_accent_and_case_insensitive() {
        let catalog = FieldCatalog::cost();
        for header in ["Mã chi phí", "ma chi phi", "MA CHI PHI"] {
            let mappings = AutoMapper::new().auto_map(&catalog, &headers(&[header]));
            assert_eq!(source_of(&mappings, "code"), Some(header));
        }
    }

    #[test]
    fn test_first_matching_header_wins() {
        let catalog = FieldCatalog::cost();
        let hs = headers(&["Ngày lập", "Ngày thanh toán"]);
        let mappings = AutoMapper::new().auto_map(&catalog, &hs);
        assert_eq!(source_of(&mappings, "date"), Some("Ngày lập"));
    }

    #[test]
    fn test_idempotent() {
        let catalog = FieldCatalog::norm();
        let hs = headers(&[
            "Mã công việc",
            "Tên công việc",
            "Đơn vị công việc",
            "Mã vật tư",
            "Tên vật tư",
            "Đơn vị vật tư",
            "Định mức",
        ]);
        let mapper = AutoMapper::new();
        let first = mapper.auto_map(&catalog, &hs);
        let second = mapper.auto_map(&catalog, &hs);
        assert_eq!(first, second);
        assert!(first.iter().filter(|m| m.required).all(|m| m.is_mapped()));
    }

    #[test]
    fn test_empty_header_never_matches() {
        let catalog = FieldCatalog::cost();
        let mappings = AutoMapper::new().auto_map(&catalog, &headers(&["", "  "]));
        assert!(mappings.iter().all(|m| !m.is_mapped()));
    }
}
