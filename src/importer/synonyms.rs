// ==========================================
// 工程项目管理平台 - 枚举同义词表
// ==========================================
// 覆盖: 越南语（带声调）/ 越南语（无声调）/ 英语
// 查找键: 原始文本小写 + TRIM 后精确匹配
// ==========================================

use crate::domain::types::EnumSet;

/// 成本类别
const COST_CATEGORY: &[(&str, &str)] = &[
    ("vật tư", "material"),
    ("vat tu", "material"),
    ("vật liệu", "material"),
    ("vat lieu", "material"),
    ("material", "material"),
    ("materials", "material"),
    ("nhân công", "labor"),
    ("nhan cong", "labor"),
    ("labor", "labor"),
    ("labour", "labor"),
    ("máy móc", "equipment"),
    ("may moc", "equipment"),
    ("thiết bị", "equipment"),
    ("thiet bi", "equipment"),
    ("máy thi công", "equipment"),
    ("may thi cong", "equipment"),
    ("equipment", "equipment"),
    ("thầu phụ", "subcontractor"),
    ("thau phu", "subcontractor"),
    ("subcontractor", "subcontractor"),
    ("chi phí chung", "overhead"),
    ("chi phi chung", "overhead"),
    ("overhead", "overhead"),
    ("khác", "other"),
    ("khac", "other"),
    ("other", "other"),
];

/// 成本状态
const COST_STATUS: &[(&str, &str)] = &[
    ("chờ duyệt", "pending"),
    ("cho duyet", "pending"),
    ("chờ xử lý", "pending"),
    ("cho xu ly", "pending"),
    ("pending", "pending"),
    ("đã duyệt", "approved"),
    ("da duyet", "approved"),
    ("đã phê duyệt", "approved"),
    ("da phe duyet", "approved"),
    ("approved", "approved"),
    ("đã thanh toán", "paid"),
    ("da thanh toan", "paid"),
    ("paid", "paid"),
    ("từ chối", "rejected"),
    ("tu choi", "rejected"),
    ("rejected", "rejected"),
];

/// 支付方式
const PAYMENT_METHOD: &[(&str, &str)] = &[
    ("chuyển khoản", "bank_transfer"),
    ("chuyen khoan", "bank_transfer"),
    ("bank transfer", "bank_transfer"),
    ("bank_transfer", "bank_transfer"),
    ("transfer", "bank_transfer"),
    ("tiền mặt", "cash"),
    ("tien mat", "cash"),
    ("cash", "cash"),
    ("séc", "check"),
    ("sec", "check"),
    ("cheque", "check"),
    ("check", "check"),
    ("thẻ", "card"),
    ("the", "card"),
    ("card", "card"),
];

fn table(set: EnumSet) -> &'static [(&'static str, &'static str)] {
    match set {
        EnumSet::CostCategory => COST_CATEGORY,
        EnumSet::CostStatus => COST_STATUS,
        EnumSet::PaymentMethod => PAYMENT_METHOD,
    }
}

/// 查找规范枚举码
pub fn lookup(set: EnumSet, raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase();
    table(set)
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, code)| *code)
}
