// ==========================================
// 工程项目管理平台 - 导入接口 Trait
// ==========================================
// 职责: 定义导入管道中可替换环节的接口（不包含实现）
// ==========================================

use crate::domain::import::ParsedSheet;
use crate::importer::error::ImportResult;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 将表格内容解析为表头 + 数据行
    ///
    /// # 参数
    /// - bytes: 文件原始内容
    ///
    /// # 返回
    /// - Ok(ParsedSheet): 第一个工作表的表头与非空数据行
    /// - Err(FileReadError): 无法解码，或没有数据行
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet>;
}
