use async_trait::async_trait;
use tracing::warn;

use super::{Category, Evaluation, Finding, RuleEvaluator};
use crate::error::FetchError;
use crate::provider::{CloudProvider, ResourceSet};
use crate::resource::TrailDescriptor;

const REMEDIATION: &str = "Start logging on this CloudTrail trail so account activity is audited.";

/// 审计日志检测：每条未在记录日志的 trail 一个发现
pub struct CloudTrailRule;

#[async_trait]
impl RuleEvaluator for CloudTrailRule {
    fn name(&self) -> &'static str {
        "cloudtrail"
    }

    async fn evaluate(&self, provider: &dyn CloudProvider) -> Result<Evaluation, FetchError> {
        let trails = provider.list_trails().await?;
        Ok(evaluate_trails(&trails))
    }
}

pub fn evaluate_trails(trails: &ResourceSet<TrailDescriptor>) -> Evaluation {
    let mut out = Evaluation::default();

    for entry in trails {
        let trail = match entry {
            Ok(trail) => trail,
            Err(bad) => {
                warn!(resource = %bad.resource_id, reason = %bad.reason, "skipping malformed trail");
                out.skipped.push(bad.clone());
                continue;
            }
        };

        if !trail.is_logging {
            let description = format!("CloudTrail {} is not logging.", trail.name);
            warn!("{description}");
            out.findings.push(Finding {
                category: Category::CloudTrail,
                description,
                remediation: REMEDIATION.to_string(),
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail(name: &str, is_logging: bool) -> TrailDescriptor {
        TrailDescriptor { name: name.to_string(), is_logging }
    }

    #[test]
    fn silent_trail_is_flagged() {
        let trails = vec![Ok(trail("main", false)), Ok(trail("backup", true))];

        let out = evaluate_trails(&trails);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].category, Category::CloudTrail);
        assert!(out.findings[0].description.contains("main"));
    }

    #[test]
    fn active_trails_are_clean() {
        let trails = vec![Ok(trail("main", true))];

        assert!(evaluate_trails(&trails).findings.is_empty());
    }
}
