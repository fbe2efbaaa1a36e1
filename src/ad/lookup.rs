// src/ad/lookup.rs

use tracing::debug;

use crate::ad::entry::ldap_escape;
use crate::ad::{AdError, DirectoryClient};
use crate::config::AdConfig;
use crate::models::{AdUser, AD_USER_ATTRS};

/// Поиск сотрудника в каталоге по sAMAccountName.
///
/// Базы перебираются по порядку: рабочий контейнер, затем штатный
/// CN=Users, в самом конце — корень домена. Порядок менять нельзя:
/// он бережёт каталог от медленного поиска по всему дереву в типовом
/// случае. Первая база, давшая результат, выигрывает.
pub struct AccountLookup<'a> {
    client: &'a dyn DirectoryClient,
    config: &'a AdConfig,
}

impl<'a> AccountLookup<'a> {
    pub fn new(client: &'a dyn DirectoryClient, config: &'a AdConfig) -> Self {
        Self { client, config }
    }

    /// Упорядоченный список баз поиска от эффективного корня
    pub fn search_bases(&self, root: &str) -> Vec<String> {
        let mut bases = vec![format!("{},{}", self.config.users_container, root)];
        if self.config.users_container != "CN=Users" {
            bases.push(format!("CN=Users,{}", root));
        }
        bases.push(root.to_string());
        bases
    }

    /// Найти запись; Ok(None) — только после того, как исчерпаны все базы
    pub async fn find_by_account(&self, account: &str) -> Result<Option<AdUser>, AdError> {
        let root = self.client.base_dn().await?;
        let filter = format!("(sAMAccountName={})", ldap_escape(account));

        for base in self.search_bases(&root) {
            match self.client.search(&base, &filter, AD_USER_ATTRS).await {
                Ok(entries) => {
                    if let Some(entry) = entries.first() {
                        return Ok(Some(AdUser::from_entry(entry)));
                    }
                    debug!("{} not found under {}", account, base);
                }
                // Сломанная база (нет контейнера и т.п.) — пробуем следующую
                Err(AdError::Operation { code, message }) => {
                    debug!("search base {} failed (code {}): {}", base, code, message);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }
}
