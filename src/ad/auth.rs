// src/ad/auth.rs

use tracing::{debug, warn};

use crate::ad::lookup::AccountLookup;
use crate::ad::DirectoryClient;
use crate::config::AdConfig;
use crate::models::AdUser;

/// Проверка пары логин/пароль через bind от имени пользователя.
///
/// Наружу уходит только Some/None: неверный пароль, несуществующая учётка
/// и недоступный контроллер для вызывающего неразличимы. Причина остаётся
/// в журнале.
pub struct AuthGate<'a> {
    client: &'a dyn DirectoryClient,
    config: &'a AdConfig,
}

impl<'a> AuthGate<'a> {
    pub fn new(client: &'a dyn DirectoryClient, config: &'a AdConfig) -> Self {
        Self { client, config }
    }

    pub async fn authenticate(&self, account: &str, password: &str) -> Option<AdUser> {
        if account.is_empty() || password.is_empty() {
            warn!("authenticate called without account or password");
            return None;
        }

        let principal = self.config.principal_for(account);
        debug!("attempting LDAP bind with UPN: {}", principal);

        if let Err(e) = self.client.check_bind(&principal, password).await {
            debug!("authentication failed for {}: {}", account, e);
            return None;
        }

        // Пароль верен — вычитываем атрибуты штатным поиском
        let lookup = AccountLookup::new(self.client, self.config);
        match lookup.find_by_account(account).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                warn!("{} bound successfully but not found in AD search", account);
                None
            }
            Err(e) => {
                warn!("attribute lookup after bind failed for {}: {}", account, e);
                None
            }
        }
    }
}
