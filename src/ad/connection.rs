// src/ad/connection.rs

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Mod, Scope, SearchEntry};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::ad::entry::RawEntry;
use crate::ad::{AdError, DirectoryClient, RenameOutcome};
use crate::config::AdConfig;

/// Боевой клиент Active Directory.
///
/// Состояния между операциями нет: каждая операция открывает свою сессию
/// и закрывает её до возврата. Кэшируется только удачно определённый
/// корневой DN — он статичен для развёрнутого домена.
pub struct AdDirectory {
    config: AdConfig,
    detected_root: OnceCell<String>,
}

impl AdDirectory {
    pub fn new(config: AdConfig) -> Self {
        Self {
            config,
            detected_root: OnceCell::new(),
        }
    }

    /// Опрос rootDSE: сервер сам сообщает действующий корневой DN,
    /// настроенный base_dn может отставать от живого каталога
    async fn probe_default_naming_context(&self) -> Result<Option<String>, AdError> {
        let mut session = AdSession::open(&self.config, None).await?;
        let result = session
            .ldap
            .with_timeout(Duration::from_secs(self.config.timeout_secs))
            .search("", Scope::Base, "(objectClass=*)", vec!["defaultNamingContext"])
            .await;

        let found = match result {
            Ok(sr) => match sr.success() {
                Ok((rs, _)) => rs
                    .into_iter()
                    .next()
                    .map(SearchEntry::construct)
                    .and_then(|e| e.attrs.get("defaultNamingContext").and_then(|v| v.first().cloned())),
                Err(_) => None,
            },
            Err(_) => None,
        };

        session.close().await;
        Ok(found)
    }
}

#[async_trait]
impl DirectoryClient for AdDirectory {
    async fn base_dn(&self) -> Result<String, AdError> {
        if let Some(root) = self.detected_root.get() {
            return Ok(root.clone());
        }

        match self.probe_default_naming_context().await {
            Ok(Some(root)) => {
                debug!("rootDSE defaultNamingContext: {}", root);
                let _ = self.detected_root.set(root.clone());
                Ok(root)
            }
            Ok(None) => Ok(self.config.base_dn.clone()),
            Err(e) => {
                // Автоопределение не удалось — работаем от настроенного значения
                debug!("rootDSE probe failed ({}), using configured base DN", e);
                Ok(self.config.base_dn.clone())
            }
        }
    }

    async fn search(
        &self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<RawEntry>, AdError> {
        let mut session = AdSession::open(&self.config, None).await?;
        let result = session
            .ldap
            .with_timeout(Duration::from_secs(self.config.timeout_secs))
            .search(base, Scope::Subtree, filter, attrs.to_vec())
            .await;
        session.close().await;

        match result {
            Ok(sr) => match sr.success() {
                Ok((rs, _)) => Ok(rs
                    .into_iter()
                    .map(SearchEntry::construct)
                    .map(RawEntry::from)
                    .collect()),
                Err(LdapError::LdapResult { result }) => Err(AdError::Operation {
                    code: result.rc,
                    message: result.text,
                }),
                Err(e) => Err(AdError::Connection(e.to_string())),
            },
            Err(e) => Err(AdError::Connection(e.to_string())),
        }
    }

    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        new_superior: &str,
    ) -> Result<RenameOutcome, AdError> {
        let mut session = AdSession::open(&self.config, None).await?;
        let result = session
            .ldap
            .with_timeout(Duration::from_secs(self.config.timeout_secs))
            .modifydn(dn, new_rdn, true, Some(new_superior))
            .await;
        session.close().await;

        let ldap_result = result?;
        Ok(RenameOutcome {
            code: ldap_result.rc,
            message: ldap_result.text,
        })
    }

    async fn check_bind(&self, principal: &str, password: &str) -> Result<(), AdError> {
        // Пустой пароль превращает simple bind в анонимный — отсекаем сразу
        if principal.is_empty() || password.is_empty() {
            return Err(AdError::Validation("empty credentials".to_string()));
        }

        let session = AdSession::open(&self.config, Some((principal, password))).await?;
        session.close().await;
        Ok(())
    }

    async fn modify_attrs(
        &self,
        dn: &str,
        attrs: Vec<(String, String)>,
    ) -> Result<RenameOutcome, AdError> {
        let mods: Vec<Mod<String>> = attrs
            .into_iter()
            .map(|(name, value)| Mod::Replace(name, HashSet::from([value])))
            .collect();

        let mut session = AdSession::open(&self.config, None).await?;
        let result = session
            .ldap
            .with_timeout(Duration::from_secs(self.config.timeout_secs))
            .modify(dn, mods)
            .await;
        session.close().await;

        let ldap_result = result?;
        Ok(RenameOutcome {
            code: ldap_result.rc,
            message: ldap_result.text,
        })
    }
}

/// Одна связанная сессия с контроллером домена
struct AdSession {
    ldap: Ldap,
}

impl AdSession {
    /// Открыть и связать сессию.
    ///
    /// `credentials` = None → сервисная учётка из конфигурации, а если её
    /// нет — анонимный bind (журналируется как деградация).
    async fn open(config: &AdConfig, credentials: Option<(&str, &str)>) -> Result<Self, AdError> {
        let url = config
            .url()
            .ok_or_else(|| AdError::Config("AD server address is not configured".to_string()))?;

        let settings =
            LdapConnSettings::new().set_conn_timeout(Duration::from_secs(config.timeout_secs));

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| AdError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection driver error: {}", e);
            }
        });

        let (principal, password) = match credentials {
            Some((p, w)) => (p.to_string(), w.to_string()),
            None => match (&config.bind_principal, &config.bind_password) {
                (Some(p), Some(w)) => (p.clone(), w.clone()),
                _ => {
                    warn!("no AD service credentials configured, falling back to anonymous bind");
                    (String::new(), String::new())
                }
            },
        };

        let bind = ldap
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .simple_bind(&principal, &password)
            .await
            .map_err(|e| AdError::Connection(e.to_string()))?;

        if let Err(e) = bind.success() {
            let _ = ldap.unbind().await;
            return Err(AdError::Connection(format!("bind failed: {}", e)));
        }

        Ok(Self { ldap })
    }

    /// Сессию закрываем на каждом пути, включая ошибочные
    async fn close(mut self) {
        let _ = self.ldap.unbind().await;
    }
}
