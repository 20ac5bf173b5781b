// ==========================================
// 工程项目管理平台 - SQLite 连接与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - 统一导入相关表结构（config_kv / import_batch / cost_entry / material_norm）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CONSTRUCTION_IMPORT_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            import_kind TEXT NOT NULL,
            project_id TEXT NOT NULL,
            file_name TEXT,
            total_rows INTEGER NOT NULL,
            success_rows INTEGER NOT NULL,
            error_rows INTEGER NOT NULL,
            imported_at TEXT NOT NULL,
            imported_by TEXT,
            elapsed_ms INTEGER NOT NULL,
            error_report_json TEXT
        );

        CREATE TABLE IF NOT EXISTS cost_entry (
            entry_id TEXT PRIMARY KEY,
            batch_id TEXT NOT NULL REFERENCES import_batch(batch_id) ON DELETE CASCADE,
            project_id TEXT NOT NULL,
            code TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            entry_date TEXT NOT NULL,
            vendor TEXT NOT NULL,
            boq_item TEXT,
            budget REAL NOT NULL,
            actual REAL NOT NULL DEFAULT 0,
            committed REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            invoice_number TEXT,
            payment_method TEXT,
            notes TEXT,
            row_number INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_cost_entry_project ON cost_entry(project_id);

        CREATE TABLE IF NOT EXISTS material_norm (
            norm_id TEXT PRIMARY KEY,
            batch_id TEXT NOT NULL REFERENCES import_batch(batch_id) ON DELETE CASCADE,
            project_id TEXT NOT NULL,
            work_code TEXT NOT NULL,
            work_name TEXT NOT NULL,
            work_unit TEXT NOT NULL,
            material_code TEXT NOT NULL,
            material_name TEXT NOT NULL,
            material_unit TEXT NOT NULL,
            norm_quantity REAL NOT NULL,
            notes TEXT,
            row_number INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_material_norm_project ON material_norm(project_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 默认数据库路径
///
/// 优先级: 环境变量 CONSTRUCTION_IMPORT_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./construction_import.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("construction-import");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("construction_import.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_version_absent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }
}
