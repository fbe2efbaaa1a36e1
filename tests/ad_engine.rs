// tests/ad_engine.rs

mod common;

use common::{test_ad_config, MockDirectory, BASE_DN};
use staffdomen_backend::ad::{AccountLookup, AuthGate, TransferEngine};

#[tokio::test]
async fn lookup_finds_user_in_primary_container() {
    let directory = MockDirectory::new();
    directory.add_user("khaled", "Khaled Hassan", "OU=HR,OU=New");
    let config = test_ad_config();

    let lookup = AccountLookup::new(&directory, &config);
    let user = lookup.find_by_account("khaled").await.unwrap().unwrap();

    assert_eq!(user.account_key, "khaled");
    assert_eq!(user.organizational_unit, "OU=HR,OU=New");
    // Первая база дала результат — дальше не ходим
    assert_eq!(directory.search_calls(), 1);
}

#[tokio::test]
async fn lookup_tries_bases_in_declared_order() {
    let directory = MockDirectory::new();
    // Запись лежит вне OU=New и вне CN=Users — найдёт только поиск от корня
    directory.add_user("omar", "Omar Said", "OU=Old");
    let config = test_ad_config();

    let lookup = AccountLookup::new(&directory, &config);
    let user = lookup.find_by_account("omar").await.unwrap().unwrap();

    assert_eq!(user.organizational_unit, "OU=Old");
    let log = directory.search_log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec![
            format!("OU=New,{}", BASE_DN),
            format!("CN=Users,{}", BASE_DN),
            BASE_DN.to_string(),
        ]
    );
}

#[tokio::test]
async fn lookup_swallows_broken_base_and_continues() {
    let directory = MockDirectory::new();
    directory.add_user("ahmed", "Ahmed Ali", "CN=Users");
    directory
        .failing_bases
        .lock()
        .unwrap()
        .push(format!("OU=New,{}", BASE_DN));
    let config = test_ad_config();

    let lookup = AccountLookup::new(&directory, &config);
    let user = lookup.find_by_account("ahmed").await.unwrap().unwrap();

    assert_eq!(user.organizational_unit, "CN=Users");
    assert_eq!(directory.search_calls(), 2);
}

#[tokio::test]
async fn lookup_returns_none_after_all_bases() {
    let directory = MockDirectory::new();
    let config = test_ad_config();

    let lookup = AccountLookup::new(&directory, &config);
    let user = lookup.find_by_account("ghost").await.unwrap();

    assert!(user.is_none());
    assert_eq!(directory.search_calls(), 3);
}

#[tokio::test]
async fn transfer_moves_entry_and_preserves_rdn() {
    let directory = MockDirectory::new();
    directory.add_user("alice", "Alice Brown", "OU=HR,OU=New");
    let config = test_ad_config();

    let engine = TransferEngine::new(&directory, &config);
    let result = engine.transfer("alice", "IT").await;

    assert!(result.success, "{}", result.message);
    assert_eq!(result.old_ou, "OU=HR,OU=New");
    assert_eq!(result.new_ou, "OU=IT,OU=New");

    let renames = directory.rename_log.lock().unwrap().clone();
    assert_eq!(renames.len(), 1);
    let (old_dn, rdn, new_superior) = &renames[0];
    assert_eq!(old_dn, &format!("CN=alice,OU=HR,OU=New,{}", BASE_DN));
    assert_eq!(rdn, "CN=alice");
    assert_eq!(new_superior, &format!("OU=IT,OU=New,{}", BASE_DN));

    // Каталог переложил запись под новый контейнер
    assert_eq!(
        directory.dn_of("alice").unwrap(),
        format!("CN=alice,OU=IT,OU=New,{}", BASE_DN)
    );
}

#[tokio::test]
async fn transfer_rejects_unknown_destination_without_directory_calls() {
    let directory = MockDirectory::new();
    directory.add_user("alice", "Alice Brown", "OU=HR,OU=New");
    let config = test_ad_config();

    let engine = TransferEngine::new(&directory, &config);
    let result = engine.transfer("alice", "Warehouse").await;

    assert!(!result.success);
    assert!(result.message.contains("Warehouse"));
    assert_eq!(directory.search_calls(), 0);
    assert_eq!(directory.rename_calls(), 0);
}

#[tokio::test]
async fn transfer_fails_for_missing_user() {
    let directory = MockDirectory::new();
    let config = test_ad_config();

    let engine = TransferEngine::new(&directory, &config);
    let result = engine.transfer("ghost_user", "IT").await;

    assert!(!result.success);
    assert!(result.message.contains("not found"));
    assert_eq!(directory.rename_calls(), 0);
}

#[tokio::test]
async fn transfer_surfaces_directory_error_verbatim() {
    let directory = MockDirectory::new();
    directory.add_user("alice", "Alice Brown", "OU=HR,OU=New");
    *directory.rename_rc.lock().unwrap() =
        (53, "UNWILLING_TO_PERFORM: insufficient rights".to_string());
    let config = test_ad_config();

    let engine = TransferEngine::new(&directory, &config);
    let result = engine.transfer("alice", "IT").await;

    assert!(!result.success);
    assert_eq!(result.message, "UNWILLING_TO_PERFORM: insufficient rights");
    assert_eq!(result.old_ou, "OU=HR,OU=New");
}

#[tokio::test]
async fn auth_gate_accepts_valid_credentials() {
    let directory = MockDirectory::new();
    directory.add_user("khaled", "Khaled Hassan", "OU=IT,OU=New");
    directory.set_password("khaled@eissa.local", "secret123");
    let config = test_ad_config();

    let gate = AuthGate::new(&directory, &config);
    let user = gate.authenticate("khaled", "secret123").await.unwrap();

    assert_eq!(user.account_key, "khaled");
    assert_eq!(user.organizational_unit, "OU=IT,OU=New");
}

#[tokio::test]
async fn auth_gate_failures_are_indistinguishable() {
    let directory = MockDirectory::new();
    directory.add_user("khaled", "Khaled Hassan", "OU=IT,OU=New");
    directory.set_password("khaled@eissa.local", "secret123");
    let config = test_ad_config();

    let gate = AuthGate::new(&directory, &config);

    // Неверный пароль, несуществующая учётка, пустой ввод — всё None
    assert!(gate.authenticate("khaled", "wrong").await.is_none());
    assert!(gate.authenticate("ghost", "secret123").await.is_none());
    assert!(gate.authenticate("khaled", "").await.is_none());
    assert!(gate.authenticate("", "secret123").await.is_none());
}
