// tests/service.rs

mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{temp_registry, test_ad_config, MockDirectory, BASE_DN};
use staffdomen_backend::employee_service::EmployeeService;
use staffdomen_backend::models::{Employee, TransferStatus};
use staffdomen_backend::service::IntegrationService;
use uuid::Uuid;

fn employee(account: &str) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        account_key: account.to_string(),
        employee_id: format!("E-{}", account),
        national_id: format!("N-{}", account),
        first_name_en: "Test".to_string(),
        last_name_en: "Person".to_string(),
        first_name_ar: String::new(),
        last_name_ar: String::new(),
        job_title: String::new(),
        department: String::new(),
        email: None,
        hire_date: None,
        is_admin: false,
        password_hash: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn build_service(directory: Arc<MockDirectory>) -> (IntegrationService, Arc<EmployeeService>) {
    let registry = Arc::new(temp_registry());
    let service = IntegrationService::new(
        directory,
        test_ad_config(),
        Arc::clone(&registry),
    );
    (service, registry)
}

#[tokio::test]
async fn successful_transfer_writes_one_success_audit_row() {
    let directory = Arc::new(MockDirectory::new());
    directory.add_user("alice", "Alice Brown", "OU=HR,OU=New");
    let (service, registry) = build_service(Arc::clone(&directory));

    let card = employee("alice");
    registry.create_employee(&card).await.unwrap();

    let results = service
        .transfer_employees(&["alice".to_string()], "IT", None)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let (_, result) = &results[0];
    assert!(result.success);

    // Запись реально переехала: CN сохранился, родитель сменился
    assert_eq!(
        directory.dn_of("alice").unwrap(),
        format!("CN=alice,OU=IT,OU=New,{}", BASE_DN)
    );

    let audits = registry.all_transfers().await.unwrap();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].employee_id, card.id);
    assert_eq!(audits[0].old_ou, "OU=HR,OU=New");
    assert_eq!(audits[0].new_ou, "OU=IT,OU=New");
    assert_eq!(audits[0].status, TransferStatus::Success);
    assert_eq!(audits[0].error_message, "");
}

#[tokio::test]
async fn failed_transfer_still_writes_audit_row() {
    let directory = Arc::new(MockDirectory::new());
    let (service, registry) = build_service(Arc::clone(&directory));

    // Карточка есть, а учётки в AD нет
    registry.create_employee(&employee("ghost_user")).await.unwrap();

    let results = service
        .transfer_employees(&["ghost_user".to_string()], "IT", None)
        .await
        .unwrap();

    let (_, result) = &results[0];
    assert!(!result.success);
    assert!(result.message.contains("not found"));

    let audits = registry.all_transfers().await.unwrap();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].status, TransferStatus::Failed);
    assert_eq!(audits[0].new_ou, "OU=IT,OU=New");
    assert!(audits[0].error_message.contains("not found"));
}

#[tokio::test]
async fn invalid_destination_audited_without_directory_error() {
    let directory = Arc::new(MockDirectory::new());
    directory.add_user("alice", "Alice Brown", "OU=HR,OU=New");
    let (service, registry) = build_service(Arc::clone(&directory));
    registry.create_employee(&employee("alice")).await.unwrap();

    let results = service
        .transfer_employees(&["alice".to_string()], "Warehouse", None)
        .await
        .unwrap();

    let (_, result) = &results[0];
    assert!(!result.success);
    // До каталога не дошли
    assert_eq!(directory.search_calls(), 0);
    assert_eq!(directory.rename_calls(), 0);

    let audits = registry.all_transfers().await.unwrap();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].status, TransferStatus::Failed);
    assert!(audits[0].error_message.contains("Warehouse"));
}

#[tokio::test]
async fn transfer_of_batch_records_entry_per_attempt() {
    let directory = Arc::new(MockDirectory::new());
    directory.add_user("alice", "Alice Brown", "OU=HR,OU=New");
    directory.add_user("omar", "Omar Said", "OU=Sales,OU=New");
    let (service, registry) = build_service(Arc::clone(&directory));
    registry.create_employee(&employee("alice")).await.unwrap();
    registry.create_employee(&employee("omar")).await.unwrap();

    let actor = registry
        .create_admin("admin", "E-ADM", "N-ADM", "Root", "Admin", "s3cret-pass")
        .await
        .unwrap();

    let results = service
        .transfer_employees(
            &["alice".to_string(), "omar".to_string()],
            "Projects",
            Some(actor.id),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|(_, r)| r.success));

    let audits = registry.all_transfers().await.unwrap();
    assert_eq!(audits.len(), 2);
    assert!(audits.iter().all(|a| a.changed_by == Some(actor.id)));
    assert!(audits.iter().all(|a| a.new_ou == "OU=Projects,OU=New"));
}

#[tokio::test]
async fn account_without_registry_card_gets_no_audit_row() {
    let directory = Arc::new(MockDirectory::new());
    directory.add_user("stranger", "Stray Account", "OU=HR,OU=New");
    let (service, registry) = build_service(Arc::clone(&directory));

    let results = service
        .transfer_employees(&["stranger".to_string()], "IT", None)
        .await
        .unwrap();

    let (_, result) = &results[0];
    assert!(!result.success);
    assert!(result.message.contains("registry"));
    assert!(registry.all_transfers().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_requires_existing_registry_card() {
    let directory = Arc::new(MockDirectory::new());
    directory.add_user("khaled", "Khaled Hassan", "OU=IT,OU=New");
    directory.set_password("khaled@eissa.local", "secret123");
    let (service, registry) = build_service(Arc::clone(&directory));

    // Учётка AD есть, карточки нет — вход закрыт
    assert!(service.login("khaled", "secret123").await.unwrap().is_none());

    registry.create_employee(&employee("khaled")).await.unwrap();

    let outcome = service.login("khaled", "secret123").await.unwrap().unwrap();
    assert_eq!(outcome.employee.account_key, "khaled");
    let ad_user = outcome.ad_user.unwrap();
    assert_eq!(ad_user.organizational_unit, "OU=IT,OU=New");

    // Неверный пароль — как будто учётки нет
    assert!(service.login("khaled", "wrong").await.unwrap().is_none());
}

#[tokio::test]
async fn local_admin_can_login_without_directory() {
    let directory = Arc::new(MockDirectory::new());
    let (service, registry) = build_service(directory);

    registry
        .create_admin("admin", "E-ADM", "N-ADM", "Root", "Admin", "s3cret-pass")
        .await
        .unwrap();

    let outcome = service.login("admin", "s3cret-pass").await.unwrap().unwrap();
    assert!(outcome.employee.is_admin);
    assert!(outcome.ad_user.is_none());
}

#[tokio::test]
async fn push_profile_writes_attributes_to_directory() {
    let directory = Arc::new(MockDirectory::new());
    directory.add_user("khaled", "Khaled Hassan", "OU=IT,OU=New");
    let (service, registry) = build_service(Arc::clone(&directory));

    let mut card = employee("khaled");
    card.first_name_en = "Khaled".to_string();
    card.last_name_en = "Hassan".to_string();
    card.job_title = "Team Lead".to_string();
    card.department = "Development".to_string();
    registry.create_employee(&card).await.unwrap();

    service.push_profile_to_ad(&card).await.unwrap();

    let log = directory.modify_log.lock().unwrap().clone();
    assert_eq!(log.len(), 1);
    let (dn, attrs) = &log[0];
    assert_eq!(dn, &format!("CN=khaled,OU=IT,OU=New,{}", BASE_DN));
    assert!(attrs.contains(&("title".to_string(), "Team Lead".to_string())));
    assert!(attrs.contains(&("displayName".to_string(), "Khaled Hassan".to_string())));
}
