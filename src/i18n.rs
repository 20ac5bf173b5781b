// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持越南语（默认）、英文、中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 导入会话按自身 locale 取消息（t_in / t_in_with_args），
// 不修改全局 locale
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: &[&str] = &["vi", "en", "zh-CN"];

/// 默认语言
pub const DEFAULT_LOCALE: &str = "vi";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"vi" / "en" / "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 规范化语言代码，不支持的语言回退到默认语言
pub fn resolve_locale(locale: &str) -> &'static str {
    let trimmed = locale.trim();
    SUPPORTED_LOCALES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(trimmed))
        .copied()
        .unwrap_or(DEFAULT_LOCALE)
}

/// 翻译消息（无参数，当前语言）
///
/// # 示例
/// ```no_run
/// use construction_import::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，当前语言）
///
/// # 示例
/// ```no_run
/// use construction_import::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/test.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key).to_string(), args)
}

/// 翻译消息（指定语言）
pub fn t_in(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（指定语言，带参数）
pub fn t_in_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill_args(t_in(locale, key), args)
}

fn fill_args(mut result: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
