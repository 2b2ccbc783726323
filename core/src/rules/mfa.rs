use async_trait::async_trait;
use tracing::warn;

use super::{Category, Evaluation, Finding, RuleEvaluator};
use crate::error::FetchError;
use crate::provider::{CloudProvider, ResourceSet};
use crate::resource::UserDescriptor;

const REMEDIATION: &str = "Enable a virtual or hardware MFA device for this IAM user.";

/// MFA 合规检测：没有绑定任何 MFA 设备的用户，每人一个发现
pub struct MfaRule;

#[async_trait]
impl RuleEvaluator for MfaRule {
    fn name(&self) -> &'static str {
        "mfa"
    }

    async fn evaluate(&self, provider: &dyn CloudProvider) -> Result<Evaluation, FetchError> {
        let users = provider.list_users().await?;
        Ok(evaluate_users(&users))
    }
}

pub fn evaluate_users(users: &ResourceSet<UserDescriptor>) -> Evaluation {
    let mut out = Evaluation::default();

    for entry in users {
        let user = match entry {
            Ok(user) => user,
            Err(bad) => {
                warn!(resource = %bad.resource_id, reason = %bad.reason, "skipping malformed IAM user");
                out.skipped.push(bad.clone());
                continue;
            }
        };

        if user.mfa_devices.is_empty() {
            let description = format!("IAM user {} does not have MFA enabled.", user.user_name);
            warn!("{description}");
            out.findings.push(Finding {
                category: Category::Mfa,
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
    use crate::provider::MalformedResource;
    use crate::resource::MfaDevice;

    fn user(name: &str, devices: usize) -> UserDescriptor {
        UserDescriptor {
            user_name: name.to_string(),
            mfa_devices: (0..devices)
                .map(|i| MfaDevice { serial_number: Some(format!("mfa-{i}")) })
                .collect(),
        }
    }

    #[test]
    fn one_finding_per_user_without_mfa() {
        let users = vec![Ok(user("alice", 0)), Ok(user("bob", 1)), Ok(user("carol", 0))];

        let out = evaluate_users(&users);
        assert_eq!(out.findings.len(), 2);
        assert!(out.findings[0].description.contains("alice"));
        assert!(out.findings[1].description.contains("carol"));
        assert!(out.findings.iter().all(|f| f.category == Category::Mfa));
    }

    #[test]
    fn covered_users_are_clean() {
        let users = vec![Ok(user("alice", 2))];

        assert!(evaluate_users(&users).findings.is_empty());
    }

    #[test]
    fn malformed_user_is_skipped_and_surfaced() {
        let users = vec![
            Err(MalformedResource {
                resource_id: "Users[0]".to_string(),
                reason: "missing UserName".to_string(),
            }),
            Ok(user("dave", 0)),
        ];

        let out = evaluate_users(&users);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.skipped.len(), 1);
    }
}
