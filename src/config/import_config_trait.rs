// ==========================================
// 工程项目管理平台 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::ImportKind;
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取校验消息语言
    ///
    /// # 默认值
    /// - "vi"
    async fn get_locale(&self) -> Result<String, Box<dyn Error>>;

    /// 获取额外的表头关键词（field_id → [别名]）
    ///
    /// # 参数
    /// - kind: 导入种类
    ///
    /// # 默认值
    /// - 空（仅使用字段目录自带关键词）
    async fn get_extra_keywords(
        &self,
        kind: ImportKind,
    ) -> Result<HashMap<String, Vec<String>>, Box<dyn Error>>;

    /// 是否允许多个字段映射到同一列
    ///
    /// # 默认值
    /// - true
    async fn get_allow_duplicate_column_mapping(&self) -> Result<bool, Box<dyn Error>>;
}
