// src/employee_service.rs

use crate::models::*;
use crate::regdb::RegDB;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Ошибки локального реестра
#[derive(Debug)]
pub enum RegistryError {
    DbError(crate::regdb::RegDbError),
    Serialization(String),
    NotFound(String),
    AlreadyExists(String),
    InvalidInput(String),
}

impl From<crate::regdb::RegDbError> for RegistryError {
    fn from(e: crate::regdb::RegDbError) -> Self {
        RegistryError::DbError(e)
    }
}

impl From<&str> for RegistryError {
    fn from(s: &str) -> Self {
        RegistryError::InvalidInput(s.to_string())
    }
}

impl From<String> for RegistryError {
    fn from(s: String) -> Self {
        RegistryError::InvalidInput(s)
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DbError(e) => write!(f, "DB error: {}", e),
            RegistryError::Serialization(e) => write!(f, "Serialization error: {}", e),
            RegistryError::NotFound(e) => write!(f, "Not found: {}", e),
            RegistryError::AlreadyExists(e) => write!(f, "Already exists: {}", e),
            RegistryError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Сервис кадрового реестра: карточки сотрудников и журнал переносов
pub struct EmployeeService {
    db: Arc<RwLock<RegDB>>,
}

impl EmployeeService {
    /// Открыть реестр по пути к базе с мастер-ключом
    pub fn open<P: AsRef<str>>(path: P, key: &[u8; 32]) -> Result<Self, RegistryError> {
        let db = RegDB::open(path.as_ref(), key)?;
        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    /// Сохранить объект в базу
    async fn store<T: serde::Serialize>(&self, key: String, value: &T) -> Result<(), RegistryError> {
        let data = bincode::serialize(value)
            .map_err(|e| RegistryError::Serialization(e.to_string()))?;
        let db = self.db.read().await;
        db.set(key, data)?;
        Ok(())
    }

    /// Загрузить объект из базы
    async fn load<T: for<'de> serde::Deserialize<'de>>(
        &self,
        key: &str,
    ) -> Result<Option<T>, RegistryError> {
        let db = self.db.read().await;
        if let Some(data) = db.get(key) {
            let obj = bincode::deserialize(&data)
                .map_err(|e| RegistryError::Serialization(e.to_string()))?;
            Ok(Some(obj))
        } else {
            Ok(None)
        }
    }

    // === EMPLOYEE ===

    pub async fn create_employee(&self, employee: &Employee) -> Result<(), RegistryError> {
        if employee.account_key.is_empty() {
            return Err("account_key must be set".into());
        }

        // Уникальность связки с AD и табельных номеров
        if self.find_by_account(&employee.account_key).await?.is_some() {
            return Err(RegistryError::AlreadyExists(format!(
                "Employee with account {} already exists",
                employee.account_key
            )));
        }
        if self.find_by_employee_id(&employee.employee_id).await?.is_some() {
            return Err(RegistryError::AlreadyExists(format!(
                "Employee with employee_id {} already exists",
                employee.employee_id
            )));
        }
        if self.find_by_national_id(&employee.national_id).await?.is_some() {
            return Err(RegistryError::AlreadyExists(format!(
                "Employee with national_id {} already exists",
                employee.national_id
            )));
        }

        let key = format!("employee:{}", employee.id);
        self.store(key, employee).await?;

        // Индексы: account/employee_id/national_id → employee.id
        let account_index_key = account_index(&employee.account_key);
        self.store(account_index_key, &employee.id).await?;

        let employee_id_index_key = format!("employee_id_index:{}", employee.employee_id);
        self.store(employee_id_index_key, &employee.id).await?;

        let national_id_index_key = format!("national_id_index:{}", employee.national_id);
        self.store(national_id_index_key, &employee.id).await?;

        // Общий индекс сотрудников
        let mut all: Vec<Uuid> = self.load("all_employees_index").await?.unwrap_or_default();
        all.push(employee.id);
        self.store("all_employees_index".to_string(), &all).await?;

        Ok(())
    }

    pub async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>, RegistryError> {
        let key = format!("employee:{}", id);
        self.load(&key).await
    }

    /// Найти сотрудника по sAMAccountName (без учёта регистра)
    pub async fn find_by_account(&self, account: &str) -> Result<Option<Employee>, RegistryError> {
        let id: Option<Uuid> = self.load(&account_index(account)).await?;
        match id {
            Some(id) => self.get_employee(id).await,
            None => Ok(None),
        }
    }

    pub async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<Employee>, RegistryError> {
        let index_key = format!("employee_id_index:{}", employee_id);
        let id: Option<Uuid> = self.load(&index_key).await?;
        match id {
            Some(id) => self.get_employee(id).await,
            None => Ok(None),
        }
    }

    pub async fn find_by_national_id(&self, national_id: &str) -> Result<Option<Employee>, RegistryError> {
        let index_key = format!("national_id_index:{}", national_id);
        let id: Option<Uuid> = self.load(&index_key).await?;
        match id {
            Some(id) => self.get_employee(id).await,
            None => Ok(None),
        }
    }

    /// Все сотрудники, отсортированные по фамилии и имени
    pub async fn get_all_employees(&self) -> Result<Vec<Employee>, RegistryError> {
        let ids: Vec<Uuid> = self.load("all_employees_index").await?.unwrap_or_default();
        let mut employees = Vec::new();
        for id in ids {
            if let Some(employee) = self.get_employee(id).await? {
                employees.push(employee);
            }
        }
        employees.sort_by(|a, b| {
            a.last_name_en
                .cmp(&b.last_name_en)
                .then_with(|| a.first_name_en.cmp(&b.first_name_en))
        });
        Ok(employees)
    }

    /// Обновить изменяемые поля карточки. account_key не трогаем:
    /// связка с AD после создания неизменна.
    pub async fn update_employee(&self, id: Uuid, update: EmployeeUpdate) -> Result<(), RegistryError> {
        let mut employee = self.get_employee(id).await?.ok_or("Employee not found")?;

        if let Some(v) = update.first_name_en {
            employee.first_name_en = v;
        }
        if let Some(v) = update.last_name_en {
            employee.last_name_en = v;
        }
        if let Some(v) = update.first_name_ar {
            employee.first_name_ar = v;
        }
        if let Some(v) = update.last_name_ar {
            employee.last_name_ar = v;
        }
        if let Some(v) = update.job_title {
            employee.job_title = v;
        }
        if let Some(v) = update.department {
            employee.department = v;
        }
        if let Some(v) = update.email {
            employee.email = Some(v);
        }
        if let Some(v) = update.hire_date {
            employee.hire_date = Some(v);
        }

        employee.updated_at = chrono::Utc::now();

        let key = format!("employee:{}", id);
        self.store(key, &employee).await?;

        Ok(())
    }

    /// Удалить карточку. Журнал переносов не трогаем — он только на запись.
    pub async fn delete_employee(&self, id: Uuid) -> Result<(), RegistryError> {
        let employee = self.get_employee(id).await?.ok_or("Employee not found")?;

        let mut all: Vec<Uuid> = self.load("all_employees_index").await?.unwrap_or_default();
        all.retain(|x| *x != id);
        self.store("all_employees_index".to_string(), &all).await?;

        let db = self.db.read().await;
        db.remove(&format!("employee:{}", id));
        db.remove(&account_index(&employee.account_key));
        db.remove(&format!("employee_id_index:{}", employee.employee_id));
        db.remove(&format!("national_id_index:{}", employee.national_id));

        Ok(())
    }

    // === LOCAL ADMIN ===

    /// Создать локального администратора с bcrypt-паролем.
    /// Обычные сотрудники пароль в реестре не имеют — они ходят через AD.
    pub async fn create_admin(
        &self,
        account_key: &str,
        employee_id: &str,
        national_id: &str,
        first_name_en: &str,
        last_name_en: &str,
        password: &str,
    ) -> Result<Employee, RegistryError> {
        if password.len() < 8 {
            return Err("Admin password must be at least 8 characters".into());
        }

        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| RegistryError::InvalidInput(e.to_string()))?;

        let employee = Employee {
            id: Uuid::new_v4(),
            account_key: account_key.to_string(),
            employee_id: employee_id.to_string(),
            national_id: national_id.to_string(),
            first_name_en: first_name_en.to_string(),
            last_name_en: last_name_en.to_string(),
            first_name_ar: String::new(),
            last_name_ar: String::new(),
            job_title: String::new(),
            department: String::new(),
            email: None,
            hire_date: None,
            is_admin: true,
            password_hash: Some(hash),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        self.create_employee(&employee).await?;
        Ok(employee)
    }

    /// Проверка локального пароля (только для админов)
    pub async fn verify_local_password(
        &self,
        account: &str,
        password: &str,
    ) -> Result<Option<Employee>, RegistryError> {
        let Some(employee) = self.find_by_account(account).await? else {
            return Ok(None);
        };
        let Some(hash) = employee.password_hash.as_deref() else {
            return Ok(None);
        };
        match bcrypt::verify(password, hash) {
            Ok(true) => Ok(Some(employee)),
            _ => Ok(None),
        }
    }

    // === TRANSFER AUDIT (только добавление) ===

    /// Дописать запись журнала. Изменения и удаления записей не бывает —
    /// методов для этого у сервиса нет.
    pub async fn record_transfer(&self, entry: &TransferAuditEntry) -> Result<(), RegistryError> {
        let key = format!("audit:{}", entry.id);
        self.store(key, entry).await?;

        let mut all: Vec<Uuid> = self.load("all_audits_index").await?.unwrap_or_default();
        all.push(entry.id);
        self.store("all_audits_index".to_string(), &all).await?;

        // Индекс по сотруднику
        let employee_index_key = format!("audit_employee_index:{}", entry.employee_id);
        let mut by_employee: Vec<Uuid> = self.load(&employee_index_key).await?.unwrap_or_default();
        by_employee.push(entry.id);
        self.store(employee_index_key, &by_employee).await?;

        Ok(())
    }

    /// Журнал целиком, свежие записи первыми
    pub async fn all_transfers(&self) -> Result<Vec<TransferAuditEntry>, RegistryError> {
        let ids: Vec<Uuid> = self.load("all_audits_index").await?.unwrap_or_default();
        let mut entries = Vec::new();
        for id in ids {
            if let Some(entry) = self.load::<TransferAuditEntry>(&format!("audit:{}", id)).await? {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(entries)
    }

    pub async fn transfers_for_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<TransferAuditEntry>, RegistryError> {
        let ids: Vec<Uuid> = self
            .load(&format!("audit_employee_index:{}", employee_id))
            .await?
            .unwrap_or_default();
        let mut entries = Vec::new();
        for id in ids {
            if let Some(entry) = self.load::<TransferAuditEntry>(&format!("audit:{}", id)).await? {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(entries)
    }

    pub async fn transfers_with_status(
        &self,
        status: TransferStatus,
    ) -> Result<Vec<TransferAuditEntry>, RegistryError> {
        let all = self.all_transfers().await?;
        Ok(all.into_iter().filter(|e| e.status == status).collect())
    }
}

/// Индекс логина храним в верхнем регистре: sAMAccountName регистронезависим
fn account_index(account: &str) -> String {
    format!("account_index:{}", account.to_uppercase())
}
