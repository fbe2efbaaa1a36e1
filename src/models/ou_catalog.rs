// src/models/ou_catalog.rs

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Фиксированный перечень OU внутри контейнера "New".
/// Переносы разрешены только в эти подразделения — произвольный DN
/// с веба/CLI в каталог не попадает.
pub static AVAILABLE_OUS: Lazy<BTreeMap<&'static str, (&'static str, &'static str)>> =
    Lazy::new(|| {
        BTreeMap::from([
            ("Accountant", ("OU=Accountant,OU=New", "المحاسبة")),
            ("Administrative Affairs", ("OU=Administrative Affairs,OU=New", "الشؤون الإدارية")),
            ("Camera", ("OU=Camera,OU=New", "الكاميرات")),
            ("Exhibit", ("OU=Exhibit,OU=New", "المعارض")),
            ("HR", ("OU=HR,OU=New", "الموارد البشرية")),
            ("IT", ("OU=IT,OU=New", "تكنولوجيا المعلومات")),
            ("Audit", ("OU=Audit,OU=New", "المراجعة")),
            ("Out Work", ("OU=Out Work,OU=New", "العمل الخارجي")),
            ("Projects", ("OU=Projects,OU=New", "المشاريع")),
            ("Sales", ("OU=Sales,OU=New", "المبيعات")),
            ("Supplies", ("OU=Supplies,OU=New", "المشتريات")),
            ("Secretarial", ("OU=Secretarial,OU=New", "السكرتارية")),
        ])
    });

/// Фрагмент DN для подразделения, например "OU=IT,OU=New"
pub fn ou_fragment(name: &str) -> Option<&'static str> {
    AVAILABLE_OUS.get(name).map(|(fragment, _)| *fragment)
}

/// Название подразделения на запрошенном языке ("en" | "ar")
pub fn ou_display_name(name: &str, lang: &str) -> Option<&'static str> {
    let (_, arabic) = AVAILABLE_OUS.get(name)?;
    if lang == "ar" {
        Some(arabic)
    } else {
        // Английское имя совпадает с ключом каталога
        AVAILABLE_OUS.get_key_value(name).map(|(k, _)| *k)
    }
}
