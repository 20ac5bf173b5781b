// ==========================================
// 工程项目管理平台 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 关键词归一化（小写 + 去声调 + TRIM）
// 说明: 越南语声调字母为预组合字符，"đ" 无法通过分解去除，统一查表折叠
// ==========================================

/// 组合附加符号区间（NFD 输入中的声调 / 变音符号）
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// 基字母 ← 带声调 / 变音符号的小写字母
const FOLD_TABLE: &[(char, &str)] = &[
    ('a', "àáảãạăằắẳẵặâầấẩẫậäåā"),
    ('e', "èéẻẽẹêềếểễệëē"),
    ('i', "ìíỉĩịîïī"),
    ('o', "òóỏõọôồốổỗộơờớởỡợöøō"),
    ('u', "ùúủũụưừứửữựûüū"),
    ('y', "ỳýỷỹỵÿ"),
    ('d', "đ"),
    ('c', "ç"),
    ('n', "ñ"),
];

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗文本字段（TRIM）
    pub fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 标准化 NULL 值（空字符串/空白 → None）
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 关键词归一化: 小写 → 去声调 → TRIM
    ///
    /// "Mã chi phí" 与 "ma chi phi" 归一化后相同
    pub fn normalize_keyword(&self, value: &str) -> String {
        fold_diacritics(&value.to_lowercase()).trim().to_string()
    }
}

/// 去除声调 / 变音符号（输入需已小写）
pub fn fold_diacritics(value: &str) -> String {
    value.chars().filter_map(fold_char).collect()
}

fn fold_char(c: char) -> Option<char> {
    if COMBINING_MARKS.contains(&c) {
        return None;
    }
    if c.is_ascii() {
        return Some(c);
    }
    FOLD_TABLE
        .iter()
        .find(|(_, variants)| variants.contains(c))
        .map(|(base, _)| *base)
        .or(Some(c))
}
