// src/config.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize)]
pub struct AppConfig {
    pub db_path: String,
    pub master_key_hex: String,

    #[serde(default)]
    pub active_directory: AdConfig,

    #[serde(default)]
    pub web_server: ServerConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ServerConfig {
    pub address: Option<String>,
    #[serde(default)]
    pub enable_tls: bool,
}

/// Параметры подключения к Active Directory
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdConfig {
    /// Адрес контроллера домена; пусто = интеграция не настроена
    pub server: Option<String>,
    #[serde(default = "default_ad_port")]
    pub port: u16,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default = "default_base_dn")]
    pub base_dn: String,
    /// Суффикс домена для UPN (user@domain)
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Сервисная учётка для поиска/переноса; нет = анонимный bind
    pub bind_principal: Option<String>,
    pub bind_password: Option<String>,
    /// Контейнер, где живут сотрудники
    #[serde(default = "default_users_container")]
    pub users_container: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AdConfig {
    fn default() -> Self {
        Self {
            server: None,
            port: default_ad_port(),
            use_ssl: false,
            base_dn: default_base_dn(),
            domain: default_domain(),
            bind_principal: None,
            bind_password: None,
            users_container: default_users_container(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_ad_port() -> u16 {
    389
}

fn default_base_dn() -> String {
    "DC=eissa,DC=local".to_string()
}

fn default_domain() -> String {
    "eissa.local".to_string()
}

fn default_users_container() -> String {
    "OU=New".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl AdConfig {
    /// ldap://host:port либо ldaps://host:port
    pub fn url(&self) -> Option<String> {
        let server = self.server.as_deref()?.trim();
        if server.is_empty() {
            return None;
        }
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        Some(format!("{}://{}:{}", scheme, server, self.port))
    }

    /// UPN для bind от имени пользователя
    pub fn principal_for(&self, account: &str) -> String {
        format!("{}@{}", account, self.domain)
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct JwtConfig {
    pub secret_key: Option<String>,
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: u64,
}

fn default_token_expiry_hours() -> u64 {
    24
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub enable_json_output: bool,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
