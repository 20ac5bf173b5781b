// ==========================================
// 工程项目管理平台 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级校验错误不走此类型（见 domain::ValidationError），
//       此处只包含会中断当前操作的错误
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误（上传失败，会话保持在 Upload）=====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xlsb/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("文件写入失败 ({path}): {message}")]
    FileWriteError { path: String, message: String },

    // ===== 会话状态错误 =====
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("必填字段未完成映射: {}", .missing.join(", "))]
    MappingIncomplete { missing: Vec<String> },

    #[error("未知字段: {0}")]
    UnknownField(String),

    #[error("表头中不存在该列: {0}")]
    UnknownColumn(String),

    #[error("列 {column} 已映射到字段 {field}")]
    DuplicateColumnMapping { column: String, field: String },

    #[error("没有可提交的有效记录")]
    NothingToCommit,

    // ===== 提交 / 配置 / 模板 =====
    #[error("记录持久化失败: {0}")]
    PersistenceError(String),

    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否属于上传阶段的文件错误
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            ImportError::FileNotFound(_)
                | ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
        )
    }

    /// 面向用户的本地化消息（无对应文案时回退到 Display）
    pub fn localized(&self, locale: &str) -> String {
        use crate::i18n::{t_in, t_in_with_args};

        match self {
            ImportError::FileNotFound(path) => {
                t_in_with_args(locale, "import.file_not_found", &[("path", path.as_str())])
            }
            ImportError::UnsupportedFormat(format) => {
                t_in_with_args(locale, "import.unsupported_format", &[("format", format.as_str())])
            }
            ImportError::FileReadError(message) => {
                t_in_with_args(locale, "import.file_read_error", &[("message", message.as_str())])
            }
            ImportError::MappingIncomplete { missing } => {
                let fields = missing.join(", ");
                t_in_with_args(locale, "import.mapping_incomplete", &[("fields", fields.as_str())])
            }
            ImportError::NothingToCommit => t_in(locale, "import.nothing_to_commit"),
            other => other.to_string(),
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::FileReadError(format!("CSV 解析失败: {}", err))
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::FileReadError(format!("工作簿解析失败: {}", err))
    }
}

// 实现 From<RepositoryError>
impl From<crate::repository::RepositoryError> for ImportError {
    fn from(err: crate::repository::RepositoryError) -> Self {
        ImportError::PersistenceError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_incomplete_lists_fields() {
        let err = ImportError::MappingIncomplete {
            missing: vec!["vendor".to_string(), "status".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("vendor"));
        assert!(msg.contains("status"));
    }

    #[test]
    fn test_localized_message() {
        let err = ImportError::FileNotFound("/tmp/chi_phi.xlsx".to_string());
        assert_eq!(err.localized("en"), "File not found: /tmp/chi_phi.xlsx");

        let err = ImportError::UnknownColumn("Cột X".to_string());
        assert_eq!(err.localized("en"), err.to_string());
    }

    #[test]
    fn test_io_error_is_file_error() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err: ImportError = io.into();
        assert!(err.is_file_error());
        assert!(!ImportError::NothingToCommit.is_file_error());
    }
}
