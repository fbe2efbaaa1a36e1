// src/models/audit.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Статус операции переноса между OU
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    Failed,
    Pending,
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::Success => write!(f, "success"),
            TransferStatus::Failed => write!(f, "failed"),
            TransferStatus::Pending => write!(f, "pending"),
        }
    }
}

/// Запись журнала переносов. Создаётся на каждую попытку, удачную или нет,
/// и после создания не редактируется — API изменения/удаления нет.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransferAuditEntry {
    pub id: Uuid,
    /// Переносимый сотрудник
    pub employee_id: Uuid,
    /// OU до переноса; пусто, если определить не удалось
    pub old_ou: String,
    /// Запрошенное подразделение (фрагмент DN из каталога)
    pub new_ou: String,
    /// Администратор, выполнивший перенос
    pub changed_by: Option<Uuid>,
    pub changed_at: chrono::DateTime<Utc>,
    pub status: TransferStatus,
    /// Текст ошибки каталога; пустой при успехе
    pub error_message: String,
}

impl TransferAuditEntry {
    pub fn new(
        employee_id: Uuid,
        old_ou: String,
        new_ou: String,
        changed_by: Option<Uuid>,
        status: TransferStatus,
        error_message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            old_ou,
            new_ou,
            changed_by,
            changed_at: Utc::now(),
            status,
            error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransferStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(TransferStatus::Failed.to_string(), "failed");
    }
}
