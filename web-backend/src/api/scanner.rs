use actix_web::{web, HttpResponse, Responder};
use cloudaudit_core::error::ScanError;
use cloudaudit_core::{Auditor, CategoryScores};

use crate::state::AppState;
use crate::store::SqliteIssueStore;

pub fn configure_scanner_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/scan", web::post().to(run_scan))
        .route("/scores", web::get().to(get_scores));
}

/// 触发一次同步扫描：拉取 -> 评估 -> 评分 -> 落库 -> 告警，跑完才应答
pub async fn run_scan(state: web::Data<AppState>) -> impl Responder {
    let auditor = Auditor::with_default_rules();
    let store = SqliteIssueStore::new(state.db.clone());

    let result = auditor
        .run_scan(
            state.provider.as_ref(),
            &store,
            state.alerts.as_ref(),
            &state.recipient,
        )
        .await;

    match result {
        Ok(report) => {
            *state.latest_scores.lock().await = Some(report.scores);
            tracing::info!(
                findings = report.findings.len(),
                status = ?report.status,
                "scan finished"
            );
            HttpResponse::Ok().json(report)
        }
        // 落库失败：扫描响应按失败处理，但发现结果仍返回给前端展示或重试
        Err(ScanError::Persistence { source, report }) => {
            *state.latest_scores.lock().await = Some(report.scores);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Findings could not be persisted: {}", source),
                "report": report,
            }))
        }
    }
}

/// 本会话最近一次扫描的评分；还没扫描过时各项都是 100
pub async fn get_scores(state: web::Data<AppState>) -> impl Responder {
    let scores = (*state.latest_scores.lock().await).unwrap_or_else(CategoryScores::perfect);
    HttpResponse::Ok().json(scores)
}
