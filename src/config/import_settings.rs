// ==========================================
// 工程项目管理平台 - 导入会话设置
// ==========================================
// 会话创建时从配置读取一次，之后会话内不再访问配置
// ==========================================

use crate::config::config_manager::config_keys;
use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::types::ImportKind;
use crate::i18n::DEFAULT_LOCALE;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub locale: String,                               // 校验消息语言
    pub extra_keywords: HashMap<String, Vec<String>>, // 额外表头关键词
    pub allow_duplicate_column_mapping: bool,         // 是否允许多字段共用一列
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            extra_keywords: HashMap::new(),
            allow_duplicate_column_mapping: true,
        }
    }
}

impl ImportSettings {
    /// 从配置读取指定导入种类的设置
    pub async fn load<R>(reader: &R, kind: ImportKind) -> ImportResult<Self>
    where
        R: ImportConfigReader + ?Sized,
    {
        let locale = reader
            .get_locale()
            .await
            .map_err(|e| config_error(config_keys::IMPORT_LOCALE, e.to_string()))?;

        let extra_keywords = reader
            .get_extra_keywords(kind)
            .await
            .map_err(|e| config_error(&config_keys::import_keywords(kind), e.to_string()))?;

        let allow_duplicate_column_mapping = reader
            .get_allow_duplicate_column_mapping()
            .await
            .map_err(|e| {
                config_error(
                    config_keys::IMPORT_ALLOW_DUPLICATE_COLUMN_MAPPING,
                    e.to_string(),
                )
            })?;

        debug!(
            kind = %kind,
            locale = %locale,
            extra_keyword_fields = extra_keywords.len(),
            allow_duplicate_column_mapping,
            "导入设置已加载"
        );

        Ok(Self {
            locale,
            extra_keywords,
            allow_duplicate_column_mapping,
        })
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = crate::i18n::resolve_locale(locale).to_string();
        self
    }

    pub fn strict_column_mapping(mut self) -> Self {
        self.allow_duplicate_column_mapping = false;
        self
    }
}

fn config_error(key: &str, message: String) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::error::Error;

    struct FailingReader;

    #[async_trait]
    impl ImportConfigReader for FailingReader {
        async fn get_locale(&self) -> Result<String, Box<dyn Error>> {
            Err("database is locked".into())
        }

        async fn get_extra_keywords(
            &self,
            _kind: ImportKind,
        ) -> Result<HashMap<String, Vec<String>>, Box<dyn Error>> {
            Ok(HashMap::new())
        }

        async fn get_allow_duplicate_column_mapping(&self) -> Result<bool, Box<dyn Error>> {
            Ok(true)
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = ImportSettings::default();
        assert_eq!(settings.locale, "vi");
        assert!(settings.allow_duplicate_column_mapping);
        assert!(!settings.clone().strict_column_mapping().allow_duplicate_column_mapping);
        assert_eq!(settings.with_locale("EN").locale, "en");
    }

    #[tokio::test]
    async fn test_load_propagates_reader_error() {
        let result = ImportSettings::load(&FailingReader, ImportKind::Cost).await;
        match result {
            Err(ImportError::ConfigReadError { key, message }) => {
                assert_eq!(key, "import_locale");
                assert!(message.contains("locked"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
