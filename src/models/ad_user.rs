// src/models/ad_user.rs

use serde::{Deserialize, Serialize};

use crate::ad::entry::RawEntry;

/// Атрибуты, которые мы читаем у пользователя в AD
pub const AD_USER_ATTRS: &[&str] = &[
    "sAMAccountName",
    "displayName",
    "mail",
    "telephoneNumber",
    "title",
    "department",
    "distinguishedName",
];

/// Снимок пользователя из Active Directory.
///
/// Живёт в пределах одной операции и никогда не сохраняется локально:
/// эти поля всегда читаются из каталога заново.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdUser {
    pub account_key: String,
    pub distinguished_name: String,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    /// OU, выведенный из DN; пусто, если запись лежит вне контейнеров
    pub organizational_unit: String,
}

impl AdUser {
    /// Собрать снимок из сырой записи. Отсутствие необязательного атрибута —
    /// штатная ситуация, а не ошибка.
    pub fn from_entry(entry: &RawEntry) -> Self {
        let dn = entry
            .first("distinguishedName")
            .unwrap_or(entry.dn.as_str())
            .to_string();

        Self {
            account_key: entry.first("sAMAccountName").unwrap_or("").to_string(),
            organizational_unit: container_path(&dn),
            distinguished_name: dn,
            display_name: entry.first("displayName").map(str::to_string),
            mail: entry.first("mail").map(str::to_string),
            phone: entry.first("telephoneNumber").map(str::to_string),
            title: entry.first("title").map(str::to_string),
            department: entry.first("department").map(str::to_string),
        }
    }

    /// Имя и фамилия из displayName: разрез по первому пробелу
    pub fn split_display_name(&self) -> (String, String) {
        let display = self.display_name.as_deref().unwrap_or("");
        match display.split_once(' ') {
            Some((given, surname)) => (given.to_string(), surname.to_string()),
            None => (display.to_string(), String::new()),
        }
    }
}

/// Путь контейнеров из DN: отбрасываем ведущий RDN самой записи, оставляем
/// структурные компоненты. Реальные каталоги кладут объекты и под OU=, и под
/// контейнеры вида CN=Users — учитываем оба.
pub fn container_path(dn: &str) -> String {
    dn.split(',')
        .skip(1)
        .map(str::trim)
        .filter(|part| {
            let upper = part.get(..3).map(|p| p.to_ascii_uppercase());
            matches!(upper.as_deref(), Some("OU=") | Some("CN="))
        })
        .collect::<Vec<_>>()
        .join(",")
}
