// src/cli.rs

use clap::Parser;
use std::sync::Arc;

use crate::ad::AdDirectory;
use crate::config::AppConfig;
use crate::employee_service::EmployeeService;
use crate::models::{ou_display_name, AVAILABLE_OUS};
use crate::service::IntegrationService;

// === CLI ===

#[derive(Parser)]
#[command(name = "staffdomen")]
#[command(about = "Интеграция кадрового реестра с Active Directory", long_about = None)]
pub struct Cli {
    /// Путь к конфигурации
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Запустить веб-API
    Web {
        /// Адрес (например, 127.0.0.1:8080)
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
    /// Синхронизировать сотрудников из AD в реестр
    Sync {
        /// Конкретный контейнер (например, "CN=Users"); без него — типовой набор
        #[arg(long)]
        ou: Option<String>,
        /// Обновлять уже существующие карточки данными из AD
        #[arg(long)]
        update: bool,
    },
    /// Перенести учётки в другое подразделение
    Transfer {
        /// Логины (sAMAccountName)
        accounts: Vec<String>,
        /// Подразделение из каталога OU
        #[arg(long)]
        ou: String,
    },
    /// Показать сотрудника: карточка + данные из AD
    Lookup { account: String },
    /// Список разрешённых подразделений
    Ous,
    /// Журнал переносов
    Audit {
        #[arg(long)]
        account: Option<String>,
        #[arg(short, long)]
        json: bool,
    },
    /// Создать локального администратора
    CreateAdmin {
        account: String,
        #[arg(long)]
        employee_id: String,
        #[arg(long)]
        national_id: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        password: String,
    },
}

/// Точка входа CLI: собирает сервисы и выполняет команду
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(&cli.config)?;
    let key = decode_key(&config.master_key_hex)?;

    let employees = Arc::new(EmployeeService::open(&config.db_path, &key)?);
    let ad = Arc::new(AdDirectory::new(config.active_directory.clone()));
    let service = Arc::new(IntegrationService::new(
        ad,
        config.active_directory.clone(),
        employees,
    ));

    match cli.command {
        Command::Web { addr } => {
            println!("🚀 Запуск веб-API на http://{}", addr);
            crate::web::run_web_server(service, &addr).await?;
        }
        Command::Sync { ou, update } => {
            println!("🔄 Синхронизация с AD...");
            let containers = ou.map(|c| vec![c]);
            let summary = service.bulk_sync(containers, update).await?;
            println!("{}", "=".repeat(60));
            println!("✅ Синхронизация завершена");
            println!("   Найдено в AD: {}", summary.total_found);
            println!("   Создано:     {}", summary.created);
            println!("   Обновлено:   {}", summary.updated);
            println!("   Пропущено:   {}", summary.skipped);
            println!("{}", "=".repeat(60));
        }
        Command::Transfer { accounts, ou } => {
            if accounts.is_empty() {
                eprintln!("❌ Не указаны логины для переноса");
                return Ok(());
            }
            let results = service.transfer_employees(&accounts, &ou, None).await?;
            for (account, result) in results {
                if result.success {
                    println!("✅ {}: {}", account, result.message);
                } else {
                    eprintln!("❌ {}: {}", account, result.message);
                }
            }
        }
        Command::Lookup { account } => {
            match service.employees().find_by_account(&account).await? {
                Some(employee) => {
                    println!("{:#?}", employee);
                }
                None => eprintln!("❌ Сотрудник не найден в реестре"),
            }
            match service.ad_profile(&account).await {
                Ok(Some(ad_user)) => println!("AD: {:#?}", ad_user),
                Ok(None) => eprintln!("❌ Учётка не найдена в AD"),
                Err(e) => eprintln!("❌ AD недоступен: {}", e),
            }
        }
        Command::Ous => {
            for (name, (fragment, _)) in AVAILABLE_OUS.iter() {
                let arabic = ou_display_name(name, "ar").unwrap_or("");
                println!("{} | {} | {}", name, fragment, arabic);
            }
        }
        Command::Audit { account, json } => {
            let entries = match account {
                Some(account) => {
                    match service.employees().find_by_account(&account).await? {
                        Some(employee) => {
                            service
                                .employees()
                                .transfers_for_employee(employee.id)
                                .await?
                        }
                        None => {
                            eprintln!("❌ Сотрудник не найден: {}", account);
                            return Ok(());
                        }
                    }
                }
                None => service.employees().all_transfers().await?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in entries {
                    println!(
                        "{} | {} | {} → {} | {}",
                        entry.changed_at.format("%Y-%m-%d %H:%M:%S"),
                        entry.status,
                        if entry.old_ou.is_empty() { "?" } else { entry.old_ou.as_str() },
                        entry.new_ou,
                        entry.error_message
                    );
                }
            }
        }
        Command::CreateAdmin {
            account,
            employee_id,
            national_id,
            first_name,
            last_name,
            password,
        } => {
            let admin = service
                .employees()
                .create_admin(
                    &account,
                    &employee_id,
                    &national_id,
                    &first_name,
                    &last_name,
                    &password,
                )
                .await?;
            println!("✅ Администратор создан: {} ({})", admin.account_key, admin.id);
        }
    }

    Ok(())
}

fn decode_key(hex_str: &str) -> Result<[u8; 32], hex::FromHexError> {
    let mut key = [0u8; 32];
    hex::decode_to_slice(hex_str, &mut key)?;
    Ok(key)
}
