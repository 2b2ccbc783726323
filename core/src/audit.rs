// Audit module - 聚合管线
// 按固定顺序跑完全部规则，再扇出到评分、落库、告警三个互不阻塞的出口

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ScanError;
use crate::notify::AlertSender;
use crate::provider::CloudProvider;
use crate::report::{format_report, ALERT_SUBJECT};
use crate::rules::{default_rules, Finding, RuleEvaluator};
use crate::scoring::CategoryScores;
use crate::store::IssueStore;

/// 扫描中被恢复的运行期故障（整类拉取失败、单资源畸形跳过）。
/// 与发现列表分开返回，绝不当作"资源合规"，也绝不静默吞掉
#[derive(Debug, Clone, Serialize)]
pub struct OperationalError {
    pub rule: String,
    pub message: String,
}

/// 扫描状态。Partial 表示至少一类资源整体拉取失败，
/// 调用方由此能把"干净"与"没查全"区分开
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Complete,
    Partial,
}

/// 一次扫描的完整结果
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub findings: Vec<Finding>,
    pub scores: CategoryScores,
    pub status: ScanStatus,
    pub errors: Vec<OperationalError>,
}

/// 聚合器：持有有序规则列表，对一个 Provider 跑一轮批量扫描
pub struct Auditor {
    rules: Vec<Box<dyn RuleEvaluator>>,
}

impl Auditor {
    pub fn with_default_rules() -> Self {
        Self { rules: default_rules() }
    }

    pub fn new(rules: Vec<Box<dyn RuleEvaluator>>) -> Self {
        Self { rules }
    }

    /// 依次运行全部规则并拼接发现。单条规则拉取失败只产出一条运行错误，
    /// 该规则本轮贡献零发现，扫描继续
    pub async fn collect(
        &self,
        provider: &dyn CloudProvider,
    ) -> (Vec<Finding>, Vec<OperationalError>, ScanStatus) {
        let mut findings = Vec::new();
        let mut errors = Vec::new();
        let mut status = ScanStatus::Complete;

        for rule in &self.rules {
            info!(rule = rule.name(), "running check");
            match rule.evaluate(provider).await {
                Ok(evaluation) => {
                    info!(
                        rule = rule.name(),
                        findings = evaluation.findings.len(),
                        "check completed"
                    );
                    for bad in evaluation.skipped {
                        errors.push(OperationalError {
                            rule: rule.name().to_string(),
                            message: format!(
                                "skipped malformed resource {}: {}",
                                bad.resource_id, bad.reason
                            ),
                        });
                    }
                    findings.extend(evaluation.findings);
                }
                Err(e) => {
                    warn!(rule = rule.name(), error = %e, "resource fetch failed, rule contributes no findings");
                    errors.push(OperationalError {
                        rule: rule.name().to_string(),
                        message: e.to_string(),
                    });
                    status = ScanStatus::Partial;
                }
            }
        }

        (findings, errors, status)
    }

    /// 完整扫描管线：拉取评估 -> 评分 -> 落库 -> 告警。
    /// 告警失败只记日志；落库失败让整个扫描按失败返回，
    /// 但内存中的发现结果仍随错误带回，调用方可以展示或重试
    pub async fn run_scan(
        &self,
        provider: &dyn CloudProvider,
        store: &dyn IssueStore,
        alerts: &dyn AlertSender,
        recipient: &str,
    ) -> Result<ScanReport, ScanError> {
        info!("starting cloud security misconfiguration scan");

        let (findings, errors, status) = self.collect(provider).await;
        let scores = CategoryScores::from_findings(&findings);

        let mut persistence_failure = None;
        for finding in &findings {
            if let Err(e) = store.record(finding).await {
                error!(error = %e, "failed to persist finding, aborting further writes");
                persistence_failure = Some(e);
                break;
            }
        }

        if findings.is_empty() {
            info!("no misconfigurations detected, no alert sent");
        } else {
            let body = format_report(&findings);
            match alerts.send(ALERT_SUBJECT, &body, recipient).await {
                Ok(()) => info!(findings = findings.len(), "alert dispatched"),
                Err(e) => error!(error = %e, "failed to send alert"),
            }
        }

        let report = ScanReport {
            scan_id: Uuid::new_v4(),
            findings,
            scores,
            status,
            errors,
        };

        match persistence_failure {
            Some(source) => Err(ScanError::Persistence { source, report }),
            None => Ok(report),
        }
    }
}
