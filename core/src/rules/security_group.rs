use async_trait::async_trait;
use tracing::warn;

use super::{Category, Evaluation, Finding, RuleEvaluator};
use crate::error::FetchError;
use crate::provider::{CloudProvider, ResourceSet};
use crate::resource::{IpPermission, SecurityGroupDescriptor, UNRESTRICTED_CIDR};

/// 暴露时危害最直接的端口：SSH、HTTP、RDP
const HIGH_RISK_PORTS: [i64; 3] = [22, 80, 3389];

const REMEDIATION: &str = "Restrict access to specific IP ranges. Avoid using 0.0.0.0/0.";

/// 开放安全组检测。任何 0.0.0.0/0 的入站规则都算发现，
/// 高危端口只加重描述，不作为放行条件
pub struct SecurityGroupRule;

#[async_trait]
impl RuleEvaluator for SecurityGroupRule {
    fn name(&self) -> &'static str {
        "security_group"
    }

    async fn evaluate(&self, provider: &dyn CloudProvider) -> Result<Evaluation, FetchError> {
        let groups = provider.list_security_groups().await?;
        Ok(evaluate_security_groups(&groups))
    }
}

/// 每个 (入站规则, CIDR) 命中对各产生一个发现
pub fn evaluate_security_groups(groups: &ResourceSet<SecurityGroupDescriptor>) -> Evaluation {
    let mut out = Evaluation::default();

    for entry in groups {
        let group = match entry {
            Ok(group) => group,
            Err(bad) => {
                warn!(resource = %bad.resource_id, reason = %bad.reason, "skipping malformed security group");
                out.skipped.push(bad.clone());
                continue;
            }
        };

        for permission in &group.ip_permissions {
            for ip_range in &permission.ip_ranges {
                if ip_range.cidr_ip.as_deref() != Some(UNRESTRICTED_CIDR) {
                    continue;
                }
                let mut description = format!(
                    "Insecure Security Group detected: {} allows access from everywhere.",
                    group.group_name
                );
                if let Some(port) = covered_high_risk_port(permission) {
                    description.push_str(&format!(" High-risk port {port} is exposed."));
                }
                warn!("{description}");
                out.findings.push(Finding {
                    category: Category::SecurityGroup,
                    description,
                    remediation: REMEDIATION.to_string(),
                });
            }
        }
    }

    out
}

fn covered_high_risk_port(permission: &IpPermission) -> Option<i64> {
    let (Some(from), Some(to)) = (permission.from_port, permission.to_port) else {
        return None;
    };
    HIGH_RISK_PORTS.iter().copied().find(|port| from <= *port && *port <= to)
}
