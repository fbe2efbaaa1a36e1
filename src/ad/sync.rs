// src/ad/sync.rs

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ad::{AdError, DirectoryClient};
use crate::employee_service::EmployeeService;
use crate::models::{AdUser, Employee, EmployeeUpdate, AD_USER_ATTRS};

/// Фильтр массовой выгрузки: пользовательские объекты с заполненным логином
const SYNC_FILTER: &str = "(&(objectClass=user)(sAMAccountName=*))";

/// Итоги синхронизации по всем контейнерам
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub total_found: usize,
}

/// Массовый импорт сотрудников из каталога в локальный реестр.
///
/// Контейнеры обрабатываются независимо: пустой или сломанный контейнер
/// не прерывает остальные. Счётчики копятся по всем контейнерам и
/// возвращаются один раз в конце.
pub struct BulkSync<'a> {
    client: &'a dyn DirectoryClient,
    employees: &'a EmployeeService,
}

impl<'a> BulkSync<'a> {
    pub fn new(client: &'a dyn DirectoryClient, employees: &'a EmployeeService) -> Self {
        Self { client, employees }
    }

    pub async fn sync_from_containers(
        &self,
        containers: &[String],
        update_existing: bool,
    ) -> Result<SyncSummary, AdError> {
        let root = self.client.base_dn().await?;
        let mut summary = SyncSummary::default();

        for container in containers {
            // "OU=New" — фрагмент от корня, "DC=..." — уже полный DN
            let base = if container.to_ascii_uppercase().contains("DC=") {
                container.clone()
            } else {
                format!("{},{}", container, root)
            };

            info!("🔍 syncing container {}", base);

            let entries = match self.client.search(&base, SYNC_FILTER, AD_USER_ATTRS).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("container {} skipped: {}", base, e);
                    continue;
                }
            };

            if entries.is_empty() {
                warn!("no users found in {}", base);
                continue;
            }

            summary.total_found += entries.len();

            for entry in &entries {
                let ad_user = AdUser::from_entry(entry);
                match self.reconcile(&ad_user, update_existing).await {
                    Ok(Reconciled::Created) => summary.created += 1,
                    Ok(Reconciled::Updated) => summary.updated += 1,
                    Ok(Reconciled::Skipped) => summary.skipped += 1,
                    Err(e) => {
                        warn!("sync of {} failed: {}", ad_user.account_key, e);
                        summary.skipped += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn reconcile(
        &self,
        ad_user: &AdUser,
        update_existing: bool,
    ) -> Result<Reconciled, Box<dyn std::error::Error>> {
        let sam = ad_user.account_key.as_str();
        let disp = ad_user.display_name.as_deref().unwrap_or("");

        // Машинные учётки людям в реестре не место
        if sam.is_empty() || sam.ends_with('$') || disp.contains("Computer") {
            return Ok(Reconciled::Skipped);
        }

        let (given, surname) = ad_user.split_display_name();

        match self.employees.find_by_account(sam).await? {
            None => {
                // Недостающие локальные поля заполняем детерминированным
                // плейсхолдером — создание не падает из-за пустого каталога
                let employee = Employee {
                    id: Uuid::new_v4(),
                    account_key: sam.to_string(),
                    employee_id: format!("AD-{}", sam),
                    national_id: format!("AD-{}", sam),
                    first_name_en: given,
                    last_name_en: surname,
                    first_name_ar: String::new(),
                    last_name_ar: String::new(),
                    job_title: ad_user.title.clone().unwrap_or_default(),
                    department: ad_user.department.clone().unwrap_or_default(),
                    email: ad_user.mail.clone(),
                    hire_date: None,
                    is_admin: false,
                    password_hash: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                };
                self.employees.create_employee(&employee).await?;
                info!("✅ created: {} ({})", sam, disp);
                Ok(Reconciled::Created)
            }
            Some(existing) if update_existing => {
                let update = EmployeeUpdate {
                    first_name_en: Some(given),
                    last_name_en: Some(surname),
                    job_title: Some(ad_user.title.clone().unwrap_or_default()),
                    department: Some(ad_user.department.clone().unwrap_or_default()),
                    email: ad_user.mail.clone(),
                    ..EmployeeUpdate::default()
                };
                self.employees.update_employee(existing.id, update).await?;
                info!("🔄 updated: {}", sam);
                Ok(Reconciled::Updated)
            }
            Some(_) => Ok(Reconciled::Skipped),
        }
    }
}

enum Reconciled {
    Created,
    Updated,
    Skipped,
}
