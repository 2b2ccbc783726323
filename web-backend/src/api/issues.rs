use actix_web::{web, HttpResponse, Responder};
use cloudaudit_core::{counts_by_day, IssueStore};

use crate::state::AppState;
use crate::store::SqliteIssueStore;

pub fn configure_issue_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_issues))
        .route("/trend", web::get().to(issue_trend));
}

/// 全部历史发现，时间倒序
pub async fn list_issues(state: web::Data<AppState>) -> impl Responder {
    let store = SqliteIssueStore::new(state.db.clone());

    match store.list_all().await {
        Ok(issues) => HttpResponse::Ok().json(issues),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch issues: {}", e)
        })),
    }
}

/// 按自然日聚合的发现计数，供趋势图渲染
pub async fn issue_trend(state: web::Data<AppState>) -> impl Responder {
    let store = SqliteIssueStore::new(state.db.clone());

    match store.list_all().await {
        Ok(issues) => HttpResponse::Ok().json(counts_by_day(&issues)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to fetch issue trend: {}", e)
        })),
    }
}
