// src/ad/mod.rs

pub mod auth;
pub mod connection;
pub mod entry;
pub mod lookup;
pub mod sync;
pub mod transfer;

use async_trait::async_trait;

pub use auth::AuthGate;
pub use connection::AdDirectory;
pub use entry::{ldap_escape, AttrState, RawEntry};
pub use lookup::AccountLookup;
pub use sync::{BulkSync, SyncSummary};
pub use transfer::{TransferEngine, TransferResult};

/// Ошибки интеграции с каталогом
#[derive(Debug)]
pub enum AdError {
    /// Не заполнена обязательная настройка — операция не начинается
    Config(String),
    /// Сеть или bind; до каталога не достучались
    Connection(String),
    /// Записи нет ни в каталоге, ни в реестре — штатный исход
    NotFound(String),
    /// Входные данные отклонены до обращения к каталогу
    Validation(String),
    /// Каталог вернул ненулевой код; текст сервера передаём как есть
    Operation { code: u32, message: String },
}

impl std::fmt::Display for AdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdError::Config(e) => write!(f, "AD config error: {}", e),
            AdError::Connection(e) => write!(f, "AD connection error: {}", e),
            AdError::NotFound(e) => write!(f, "Not found: {}", e),
            AdError::Validation(e) => write!(f, "Invalid input: {}", e),
            AdError::Operation { code, message } => {
                write!(f, "AD operation failed (code {}): {}", code, message)
            }
        }
    }
}

impl std::error::Error for AdError {}

impl From<ldap3::LdapError> for AdError {
    fn from(e: ldap3::LdapError) -> Self {
        AdError::Connection(e.to_string())
    }
}

/// Итог операции rename/re-parent: код и сообщение каталога дословно
#[derive(Debug, Clone)]
pub struct RenameOutcome {
    pub code: u32,
    pub message: String,
}

impl RenameOutcome {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Операции над каталогом, которые нужны движкам.
///
/// Движки получают клиента по ссылке, а не через глобальный синглтон —
/// в тестах на его место встаёт дублёр. Каждый вызов у боевой реализации
/// открывает собственную сессию и закрывает её до возврата.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Эффективный корневой DN: defaultNamingContext сервера,
    /// при недоступности — значение из конфигурации
    async fn base_dn(&self) -> Result<String, AdError>;

    /// Поиск по поддереву от указанной базы
    async fn search(
        &self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<RawEntry>, AdError>;

    /// Перенос записи под нового родителя; RDN сохраняется вызывающим
    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        new_superior: &str,
    ) -> Result<RenameOutcome, AdError>;

    /// Проверка пары логин/пароль через bind от имени пользователя
    async fn check_bind(&self, principal: &str, password: &str) -> Result<(), AdError>;

    /// Запись атрибутов (явный push локальных правок в каталог)
    async fn modify_attrs(
        &self,
        dn: &str,
        attrs: Vec<(String, String)>,
    ) -> Result<RenameOutcome, AdError>;
}
