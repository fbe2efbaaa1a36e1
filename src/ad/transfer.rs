// src/ad/transfer.rs

use tracing::{error, info};

use crate::ad::lookup::AccountLookup;
use crate::ad::DirectoryClient;
use crate::config::AdConfig;
use crate::models::ou_catalog;

/// Итог переноса. Не Result: неудача — штатный ответ, а old_ou/new_ou
/// нужны вызывающему для обязательной записи в журнал при любом исходе.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub success: bool,
    pub message: String,
    /// OU до переноса; пусто, если запись не нашли
    pub old_ou: String,
    /// Запрошенный фрагмент DN из каталога OU
    pub new_ou: String,
}

impl TransferResult {
    fn failed(message: String, old_ou: String, new_ou: String) -> Self {
        Self {
            success: false,
            message,
            old_ou,
            new_ou,
        }
    }
}

/// Перенос учётной записи между OU.
///
/// Целевое подразделение обязано состоять в каталоге разрешённых OU;
/// RDN записи (CN=логин) при переносе не меняется никогда.
pub struct TransferEngine<'a> {
    client: &'a dyn DirectoryClient,
    config: &'a AdConfig,
}

impl<'a> TransferEngine<'a> {
    pub fn new(client: &'a dyn DirectoryClient, config: &'a AdConfig) -> Self {
        Self { client, config }
    }

    /// Одна попытка переноса; повторов нет — это забота вызывающего
    pub async fn transfer(&self, account: &str, destination: &str) -> TransferResult {
        // Валидация до любого похода в каталог
        let Some(fragment) = ou_catalog::ou_fragment(destination) else {
            return TransferResult::failed(
                format!("OU '{}' not found in available list", destination),
                String::new(),
                String::new(),
            );
        };
        let new_ou = fragment.to_string();

        let lookup = AccountLookup::new(self.client, self.config);
        let user = match lookup.find_by_account(account).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return TransferResult::failed(
                    format!("User '{}' not found in AD", account),
                    String::new(),
                    new_ou,
                );
            }
            Err(e) => {
                error!("transfer lookup failed for {}: {}", account, e);
                return TransferResult::failed(e.to_string(), String::new(), new_ou);
            }
        };

        let old_ou = user.organizational_unit.clone();
        let current_dn = user.distinguished_name.as_str();

        // RDN берём из текущего DN — логин при переносе сохраняется
        let rdn = current_dn.split(',').next().unwrap_or(current_dn);

        let root = match self.client.base_dn().await {
            Ok(root) => root,
            Err(e) => return TransferResult::failed(e.to_string(), old_ou, new_ou),
        };
        let new_superior = format!("{},{}", fragment, root);
        let new_dn = format!("{},{}", rdn, new_superior);

        info!("transferring {} from {} to {}", account, current_dn, new_dn);

        match self.client.rename(current_dn, rdn, &new_superior).await {
            Ok(outcome) if outcome.is_success() => TransferResult {
                success: true,
                message: format!("User transferred to {}", destination),
                old_ou,
                new_ou,
            },
            // Ненулевой код: сообщение каталога отдаём дословно
            Ok(outcome) => {
                error!(
                    "modifydn for {} rejected (code {}): {}",
                    account, outcome.code, outcome.message
                );
                TransferResult::failed(outcome.message, old_ou, new_ou)
            }
            Err(e) => {
                error!("modifydn for {} failed: {}", account, e);
                TransferResult::failed(e.to_string(), old_ou, new_ou)
            }
        }
    }
}
