// ==========================================
// 工程项目管理平台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::types::ImportKind;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 写入额外表头关键词（序列化为 JSON）
    pub fn set_extra_keywords(
        &self,
        kind: ImportKind,
        keywords: &HashMap<String, Vec<String>>,
    ) -> Result<(), Box<dyn Error>> {
        let value = serde_json::to_string(keywords)?;
        self.set_global_config_value(&config_keys::import_keywords(kind), &value)
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::IMPORT_LOCALE, "vi")?;
        Ok(crate::i18n::resolve_locale(&value).to_string())
    }

    async fn get_extra_keywords(
        &self,
        kind: ImportKind,
    ) -> Result<HashMap<String, Vec<String>>, Box<dyn Error>> {
        let key = config_keys::import_keywords(kind);
        let raw = match self.get_config_value(&key)? {
            Some(v) => v,
            None => return Ok(HashMap::new()),
        };

        // 格式错误不阻塞导入，回退为空
        match serde_json::from_str::<HashMap<String, Vec<String>>>(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(key = %key, error = %e, "关键词配置格式错误，已忽略");
                Ok(HashMap::new())
            }
        }
    }

    async fn get_allow_duplicate_column_mapping(&self) -> Result<bool, Box<dyn Error>> {
        let value =
            self.get_config_or_default(config_keys::IMPORT_ALLOW_DUPLICATE_COLUMN_MAPPING, "true")?;
        match value.trim().to_lowercase().as_str() {
            "false" | "0" | "no" => Ok(false),
            _ => Ok(true), // 默认允许
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    use crate::domain::types::ImportKind;

    // 校验消息语言
    pub const IMPORT_LOCALE: &str = "import_locale";

    // 列映射
    pub const IMPORT_ALLOW_DUPLICATE_COLUMN_MAPPING: &str = "import_allow_duplicate_column_mapping";

    // 表头关键词（按导入种类）
    pub const IMPORT_KEYWORDS_PREFIX: &str = "import_keywords";

    pub fn import_keywords(kind: ImportKind) -> String {
        format!("{}/{}", IMPORT_KEYWORDS_PREFIX, kind.as_str())
    }
}
