// src/web.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::middleware::{current_employee, require_admin, AppState};
use crate::models::{AdUser, Employee, TransferStatus, AVAILABLE_OUS};
use crate::service::IntegrationService;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub account_key: String,
    pub employee_id: String,
    pub national_id: String,
    pub full_name_en: String,
    pub full_name_ar: String,
    pub job_title: String,
    pub department: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            full_name_en: employee.full_name_en(),
            full_name_ar: employee.full_name_ar(),
            id: employee.id,
            account_key: employee.account_key,
            employee_id: employee.employee_id,
            national_id: employee.national_id,
            job_title: employee.job_title,
            department: employee.department,
            email: employee.email,
            is_admin: employee.is_admin,
            created_at: employee.created_at,
        }
    }
}

async fn login(
    State(service): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    if payload.account.is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "account and password required"
            })),
        )
            .into_response();
    }

    match service.login(&payload.account, &payload.password).await {
        Ok(Some(outcome)) => {
            let token = match auth::generate_token(&outcome.employee.id.to_string()) {
                Ok(token) => token,
                Err(_) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({ "error": "Failed to generate token" })),
                    )
                        .into_response();
                }
            };

            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "token": token,
                    "user": EmployeeResponse::from(outcome.employee),
                    "ad": outcome.ad_user,
                })),
            )
                .into_response()
        }
        // Неверный пароль и несуществующая учётка наружу неразличимы
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Invalid credentials" })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Internal error" })),
        )
            .into_response(),
    }
}

async fn profile(claims: Claims, State(service): State<AppState>) -> impl IntoResponse {
    let employee = match current_employee(&claims, &service).await {
        Ok(employee) => employee,
        Err(e) => return e.into_response(),
    };

    // Данные AD читаем по запросу; недоступный каталог профиль не ломает
    let ad: Option<AdUser> = service
        .ad_profile(&employee.account_key)
        .await
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user": EmployeeResponse::from(employee),
            "ad": ad,
        })),
    )
        .into_response()
}

async fn list_employees(claims: Claims, State(service): State<AppState>) -> impl IntoResponse {
    if let Err(e) = current_employee(&claims, &service).await {
        return e.into_response();
    }

    let employees = service
        .employees()
        .get_all_employees()
        .await
        .unwrap_or_default();
    let responses: Vec<EmployeeResponse> =
        employees.into_iter().map(EmployeeResponse::from).collect();
    Json(responses).into_response()
}

#[derive(Deserialize)]
struct AuditQuery {
    account: Option<String>,
    status: Option<String>,
}

async fn list_audit_logs(
    claims: Claims,
    Query(query): Query<AuditQuery>,
    State(service): State<AppState>,
) -> impl IntoResponse {
    if let Err(e) = current_employee(&claims, &service).await {
        return e.into_response();
    }

    let entries = if let Some(account) = query.account.as_deref() {
        match service.employees().find_by_account(account).await {
            Ok(Some(employee)) => service
                .employees()
                .transfers_for_employee(employee.id)
                .await
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    } else {
        service.employees().all_transfers().await.unwrap_or_default()
    };

    let entries: Vec<_> = match query.status.as_deref() {
        Some("success") => entries
            .into_iter()
            .filter(|e| e.status == TransferStatus::Success)
            .collect(),
        Some("failed") => entries
            .into_iter()
            .filter(|e| e.status == TransferStatus::Failed)
            .collect(),
        Some("pending") => entries
            .into_iter()
            .filter(|e| e.status == TransferStatus::Pending)
            .collect(),
        _ => entries,
    };

    Json(entries).into_response()
}

async fn list_ous() -> impl IntoResponse {
    let ous: Vec<_> = AVAILABLE_OUS
        .iter()
        .map(|(name, (fragment, arabic))| {
            serde_json::json!({
                "name": name,
                "path": fragment,
                "display_name_ar": arabic,
            })
        })
        .collect();
    Json(ous)
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub accounts: Vec<String>,
    pub destination: String,
}

async fn transfer(
    claims: Claims,
    State(service): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> impl IntoResponse {
    let admin = match require_admin(&claims, &service).await {
        Ok(admin) => admin,
        Err(e) => return e.into_response(),
    };

    if payload.accounts.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "accounts list is empty" })),
        )
            .into_response();
    }

    match service
        .transfer_employees(&payload.accounts, &payload.destination, Some(admin.id))
        .await
    {
        Ok(results) => {
            let body: Vec<_> = results
                .into_iter()
                .map(|(account, result)| {
                    serde_json::json!({
                        "account": account,
                        "success": result.success,
                        "message": result.message,
                        "old_ou": result.old_ou,
                        "new_ou": result.new_ou,
                    })
                })
                .collect();
            Json(body).into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Internal error" })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub containers: Option<Vec<String>>,
    #[serde(default)]
    pub update: bool,
}

async fn sync(
    claims: Claims,
    State(service): State<AppState>,
    Json(payload): Json<SyncRequest>,
) -> impl IntoResponse {
    if let Err(e) = require_admin(&claims, &service).await {
        return e.into_response();
    }

    match service.bulk_sync(payload.containers, payload.update).await {
        Ok(summary) => Json(serde_json::json!(summary)).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub fn create_router(service: Arc<IntegrationService>) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/employee/profile", get(profile))
        .route("/api/employees", get(list_employees))
        .route("/api/employees/transfer", post(transfer))
        .route("/api/audit-logs", get(list_audit_logs))
        .route("/api/ous", get(list_ous))
        .route("/api/sync", post(sync))
        .with_state(service)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run_web_server(
    service: Arc<IntegrationService>,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("🌐 Web API запущен на http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
