// tests/common/mod.rs

// Каждый тестовый бинарь использует свою часть этого модуля
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use staffdomen_backend::ad::{AdError, DirectoryClient, RawEntry, RenameOutcome};
use staffdomen_backend::config::AdConfig;
use staffdomen_backend::employee_service::EmployeeService;

pub const BASE_DN: &str = "DC=eissa,DC=local";

/// Дублёр каталога: хранит записи в памяти и ведёт журнал вызовов,
/// чтобы тесты могли проверять порядок баз и число обращений.
pub struct MockDirectory {
    base: String,
    entries: Mutex<Vec<RawEntry>>,
    /// principal → пароль
    passwords: Mutex<HashMap<String, String>>,
    pub search_log: Mutex<Vec<String>>,
    pub rename_log: Mutex<Vec<(String, String, String)>>,
    pub modify_log: Mutex<Vec<(String, Vec<(String, String)>)>>,
    /// Код, который вернёт следующий rename (0 = успех)
    pub rename_rc: Mutex<(u32, String)>,
    /// Базы, на которых поиск падает с ошибкой каталога
    pub failing_bases: Mutex<Vec<String>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            base: BASE_DN.to_string(),
            entries: Mutex::new(Vec::new()),
            passwords: Mutex::new(HashMap::new()),
            search_log: Mutex::new(Vec::new()),
            rename_log: Mutex::new(Vec::new()),
            modify_log: Mutex::new(Vec::new()),
            rename_rc: Mutex::new((0, String::new())),
            failing_bases: Mutex::new(Vec::new()),
        }
    }

    /// Добавить пользователя под контейнером (например, "OU=HR,OU=New")
    pub fn add_user(&self, sam: &str, display: &str, container: &str) {
        let dn = format!("CN={},{},{}", sam, container, self.base);
        let mut entry = RawEntry::new(dn.clone())
            .with_attr("sAMAccountName", sam)
            .with_attr("distinguishedName", &dn);
        if !display.is_empty() {
            entry = entry.with_attr("displayName", display);
        }
        self.entries.lock().unwrap().push(entry);
    }

    pub fn add_entry(&self, entry: RawEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn set_password(&self, principal: &str, password: &str) {
        self.passwords
            .lock()
            .unwrap()
            .insert(principal.to_string(), password.to_string());
    }

    pub fn search_calls(&self) -> usize {
        self.search_log.lock().unwrap().len()
    }

    pub fn rename_calls(&self) -> usize {
        self.rename_log.lock().unwrap().len()
    }

    pub fn dn_of(&self, sam: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.first("sAMAccountName") == Some(sam))
            .map(|e| e.dn.clone())
    }

    fn dn_under(dn: &str, base: &str) -> bool {
        let dn = dn.to_ascii_lowercase();
        let base = base.to_ascii_lowercase();
        dn == base || dn.ends_with(&format!(",{}", base))
    }

    fn filter_matches(filter: &str, entry: &RawEntry) -> bool {
        // Достаточно двух форм фильтра, которые использует движок
        if filter.contains("sAMAccountName=*") {
            return entry.first("sAMAccountName").is_some();
        }
        if let Some(rest) = filter.strip_prefix("(sAMAccountName=") {
            let value = rest.trim_end_matches(')');
            return entry
                .first("sAMAccountName")
                .map(|s| s.eq_ignore_ascii_case(value))
                .unwrap_or(false);
        }
        false
    }
}

#[async_trait]
impl DirectoryClient for MockDirectory {
    async fn base_dn(&self) -> Result<String, AdError> {
        Ok(self.base.clone())
    }

    async fn search(
        &self,
        base: &str,
        filter: &str,
        _attrs: &[&str],
    ) -> Result<Vec<RawEntry>, AdError> {
        self.search_log.lock().unwrap().push(base.to_string());

        if self.failing_bases.lock().unwrap().iter().any(|b| b == base) {
            return Err(AdError::Operation {
                code: 32,
                message: "noSuchObject".to_string(),
            });
        }

        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| Self::dn_under(&e.dn, base) && Self::filter_matches(filter, e))
            .cloned()
            .collect())
    }

    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        new_superior: &str,
    ) -> Result<RenameOutcome, AdError> {
        self.rename_log.lock().unwrap().push((
            dn.to_string(),
            new_rdn.to_string(),
            new_superior.to_string(),
        ));

        let (code, message) = self.rename_rc.lock().unwrap().clone();
        if code == 0 {
            // Переносим запись, как сделал бы каталог
            let new_dn = format!("{},{}", new_rdn, new_superior);
            let mut entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.iter_mut().find(|e| e.dn == dn) {
                entry.dn = new_dn.clone();
                entry
                    .attrs
                    .insert("distinguishedName".to_string(), vec![new_dn]);
            }
        }

        Ok(RenameOutcome { code, message })
    }

    async fn check_bind(&self, principal: &str, password: &str) -> Result<(), AdError> {
        if principal.is_empty() || password.is_empty() {
            return Err(AdError::Validation("empty credentials".to_string()));
        }
        match self.passwords.lock().unwrap().get(principal) {
            Some(stored) if stored == password => Ok(()),
            _ => Err(AdError::Connection("bind failed: invalidCredentials".to_string())),
        }
    }

    async fn modify_attrs(
        &self,
        dn: &str,
        attrs: Vec<(String, String)>,
    ) -> Result<RenameOutcome, AdError> {
        self.modify_log
            .lock()
            .unwrap()
            .push((dn.to_string(), attrs.clone()));

        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.dn == dn) {
            for (name, value) in attrs {
                entry.attrs.insert(name, vec![value]);
            }
        }

        Ok(RenameOutcome {
            code: 0,
            message: String::new(),
        })
    }
}

/// Конфигурация AD, на которую смотрят движки в тестах
pub fn test_ad_config() -> AdConfig {
    let mut config = AdConfig::default();
    config.server = Some("dc01.eissa.local".to_string());
    config
}

/// Реестр во временном файле; каждый тест получает свой
pub fn temp_registry() -> EmployeeService {
    let path = std::env::temp_dir().join(format!(
        "staffdomen-test-{}.db",
        uuid::Uuid::new_v4()
    ));
    EmployeeService::open(path.to_string_lossy(), &[0u8; 32]).unwrap()
}
