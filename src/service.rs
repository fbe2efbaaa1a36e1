// src/service.rs

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::ad::{
    AccountLookup, AdError, AuthGate, BulkSync, DirectoryClient, SyncSummary, TransferEngine,
    TransferResult,
};
use crate::config::AdConfig;
use crate::employee_service::{EmployeeService, RegistryError};
use crate::models::{AdUser, Employee, TransferAuditEntry, TransferStatus};

/// Результат входа: локальная карточка + свежие данные из AD
pub struct LoginOutcome {
    pub employee: Employee,
    pub ad_user: Option<AdUser>,
}

/// Фасад интеграции: это в него ходят веб-слой и CLI.
///
/// Клиент каталога внедряется снаружи — глобального менеджера нет,
/// в тестах на его месте дублёр.
pub struct IntegrationService {
    ad: Arc<dyn DirectoryClient>,
    ad_config: AdConfig,
    employees: Arc<EmployeeService>,
}

impl IntegrationService {
    pub fn new(
        ad: Arc<dyn DirectoryClient>,
        ad_config: AdConfig,
        employees: Arc<EmployeeService>,
    ) -> Self {
        Self {
            ad,
            ad_config,
            employees,
        }
    }

    pub fn employees(&self) -> &EmployeeService {
        &self.employees
    }

    /// Вход по учётке AD. Карточка обязана уже существовать в реестре —
    /// вход сам по себе сотрудников не заводит.
    /// Для локальных админов с паролем есть запасной путь мимо AD.
    pub async fn login(
        &self,
        account: &str,
        password: &str,
    ) -> Result<Option<LoginOutcome>, RegistryError> {
        let gate = AuthGate::new(self.ad.as_ref(), &self.ad_config);

        if let Some(ad_user) = gate.authenticate(account, password).await {
            match self.employees.find_by_account(&ad_user.account_key).await? {
                Some(employee) => {
                    info!("successfully authenticated user: {}", account);
                    return Ok(Some(LoginOutcome {
                        employee,
                        ad_user: Some(ad_user),
                    }));
                }
                None => {
                    warn!("{} authenticated in AD but not found in registry", account);
                    return Ok(None);
                }
            }
        }

        // Запасной путь: локальный администратор
        if let Some(employee) = self.employees.verify_local_password(account, password).await? {
            info!("local admin login: {}", account);
            return Ok(Some(LoginOutcome {
                employee,
                ad_user: None,
            }));
        }

        Ok(None)
    }

    /// Данные сотрудника из AD по требованию; локально не сохраняются
    pub async fn ad_profile(&self, account: &str) -> Result<Option<AdUser>, AdError> {
        let lookup = AccountLookup::new(self.ad.as_ref(), &self.ad_config);
        lookup.find_by_account(account).await
    }

    /// Перенос набора сотрудников в подразделение из каталога OU.
    ///
    /// На каждую попытку с существующей карточкой пишется запись журнала —
    /// и на успех, и на отказ. Учётки без карточки журнал не получают:
    /// записи не на кого сослаться.
    pub async fn transfer_employees(
        &self,
        accounts: &[String],
        destination: &str,
        actor: Option<Uuid>,
    ) -> Result<Vec<(String, TransferResult)>, RegistryError> {
        let engine = TransferEngine::new(self.ad.as_ref(), &self.ad_config);
        let mut results = Vec::with_capacity(accounts.len());

        for account in accounts {
            let employee = self.employees.find_by_account(account).await?;

            let result = match &employee {
                Some(_) => engine.transfer(account, destination).await,
                None => TransferResult {
                    success: false,
                    message: format!("Employee '{}' not found in registry", account),
                    old_ou: String::new(),
                    new_ou: String::new(),
                },
            };

            if let Some(employee) = employee {
                let status = if result.success {
                    TransferStatus::Success
                } else {
                    TransferStatus::Failed
                };
                let error_message = if result.success {
                    String::new()
                } else {
                    result.message.clone()
                };
                let entry = TransferAuditEntry::new(
                    employee.id,
                    result.old_ou.clone(),
                    result.new_ou.clone(),
                    actor,
                    status,
                    error_message,
                );
                self.employees.record_transfer(&entry).await?;
            } else {
                warn!("transfer of {} skipped: no registry record", account);
            }

            results.push((account.clone(), result));
        }

        Ok(results)
    }

    /// Массовый импорт; пустой список контейнеров = типовой набор:
    /// рабочий контейнер, штатный CN=Users и корень домена
    pub async fn bulk_sync(
        &self,
        containers: Option<Vec<String>>,
        update_existing: bool,
    ) -> Result<SyncSummary, AdError> {
        let containers = match containers {
            Some(list) if !list.is_empty() => list,
            _ => vec![
                self.ad_config.users_container.clone(),
                "CN=Users".to_string(),
                self.ad.base_dn().await?,
            ],
        };
        let sync = BulkSync::new(self.ad.as_ref(), &self.employees);
        sync.sync_from_containers(&containers, update_existing).await
    }

    /// Явный push локальных правок карточки в каталог.
    ///
    /// Вызывается сервисным слоем после проверенного обновления — никакая
    /// «магия при сохранении» атрибуты в AD не пишет.
    pub async fn push_profile_to_ad(&self, employee: &Employee) -> Result<(), AdError> {
        let lookup = AccountLookup::new(self.ad.as_ref(), &self.ad_config);
        let Some(ad_user) = lookup.find_by_account(&employee.account_key).await? else {
            return Err(AdError::NotFound(format!(
                "User '{}' not found in AD",
                employee.account_key
            )));
        };

        let attrs = vec![
            ("givenName".to_string(), employee.first_name_en.clone()),
            ("sn".to_string(), employee.last_name_en.clone()),
            ("displayName".to_string(), employee.full_name_en()),
            ("title".to_string(), employee.job_title.clone()),
            ("department".to_string(), employee.department.clone()),
        ];

        let outcome = self
            .ad
            .modify_attrs(&ad_user.distinguished_name, attrs)
            .await?;

        if outcome.is_success() {
            info!("pushed profile of {} to AD", employee.account_key);
            Ok(())
        } else {
            Err(AdError::Operation {
                code: outcome.code,
                message: outcome.message,
            })
        }
    }
}
