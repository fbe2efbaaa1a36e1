// src/models/employee.rs

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Локальная карточка сотрудника.
///
/// Хранится только то, чего нет в Active Directory: табельные данные и имена
/// на двух языках. Почта, телефон, должность и OU читаются из AD по запросу
/// и в базу не пишутся — каталог остаётся единственным источником истины.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Employee {
    pub id: Uuid,

    /// sAMAccountName — связь с Active Directory. После создания не меняется.
    pub account_key: String,

    /// Табельный номер (уникальный)
    pub employee_id: String,
    /// Номер удостоверения личности (уникальный)
    pub national_id: String,

    pub first_name_en: String,
    pub last_name_en: String,
    pub first_name_ar: String,
    pub last_name_ar: String,

    pub job_title: String,
    pub department: String,
    pub email: Option<String>,
    pub hire_date: Option<NaiveDate>,

    /// Локальный администратор: может переносить сотрудников и запускать синк
    pub is_admin: bool,
    /// bcrypt-хэш; есть только у локальных админов, остальные ходят через AD
    #[serde(default)]
    pub password_hash: Option<String>,

    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl Employee {
    /// Полное имя на английском
    pub fn full_name_en(&self) -> String {
        format!("{} {}", self.first_name_en, self.last_name_en)
            .trim()
            .to_string()
    }

    /// Полное имя на арабском; если не заполнено — английское
    pub fn full_name_ar(&self) -> String {
        if !self.first_name_ar.is_empty() && !self.last_name_ar.is_empty() {
            format!("{} {}", self.first_name_ar, self.last_name_ar)
                .trim()
                .to_string()
        } else {
            self.full_name_en()
        }
    }
}

/// Изменяемые поля карточки; account_key сюда не входит намеренно
#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub first_name_en: Option<String>,
    pub last_name_en: Option<String>,
    pub first_name_ar: Option<String>,
    pub last_name_ar: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub hire_date: Option<NaiveDate>,
}
