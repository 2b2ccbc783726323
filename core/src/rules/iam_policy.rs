use async_trait::async_trait;
use tracing::warn;

use super::{Category, Evaluation, Finding, RuleEvaluator};
use crate::error::FetchError;
use crate::provider::{CloudProvider, MalformedResource, ResourceSet};
use crate::resource::{PolicyDescriptor, Statement};

const WILDCARD: &str = "*";

const REMEDIATION: &str =
    "Restrict permissions in the IAM policy. Avoid using '*' for actions or resources.";

/// 过宽 IAM 策略检测：Allow 语句的 Action 或 Resource 出现裸 "*"
pub struct IamPolicyRule;

#[async_trait]
impl RuleEvaluator for IamPolicyRule {
    fn name(&self) -> &'static str {
        "iam_policy"
    }

    async fn evaluate(&self, provider: &dyn CloudProvider) -> Result<Evaluation, FetchError> {
        let policies = provider.list_policies().await?;
        Ok(evaluate_policies(&policies))
    }
}

/// 逐策略、逐语句检查。每条不合规语句各产生一个发现，而不是每个策略一个，
/// 这样评分里的扣分幅度与实际暴露面一致
pub fn evaluate_policies(policies: &ResourceSet<PolicyDescriptor>) -> Evaluation {
    let mut out = Evaluation::default();

    for entry in policies {
        let policy = match entry {
            Ok(policy) => policy,
            Err(bad) => {
                warn!(resource = %bad.resource_id, reason = %bad.reason, "skipping malformed IAM policy");
                out.skipped.push(bad.clone());
                continue;
            }
        };

        let Some(document) = &policy.document else {
            // 取不到生效版本的文档，跳过该策略而不是中断整轮检查
            warn!(policy = %policy.policy_name, "policy document missing, skipping");
            out.skipped.push(MalformedResource {
                resource_id: policy.policy_name.clone(),
                reason: "policy document missing".to_string(),
            });
            continue;
        };

        for statement in &document.statement {
            if statement_is_overly_permissive(statement) {
                let description =
                    format!("Overly permissive IAM policy detected: {}", policy.policy_name);
                warn!("{description}");
                out.findings.push(Finding {
                    category: Category::IamPolicy,
                    description,
                    remediation: REMEDIATION.to_string(),
                });
            }
        }
    }

    out
}

fn statement_is_overly_permissive(statement: &Statement) -> bool {
    if statement.effect.as_deref() != Some("Allow") {
        return false;
    }
    let wildcard_action = statement
        .action
        .as_ref()
        .map_or(false, |action| action.contains(WILDCARD));
    let wildcard_resource = statement
        .resource
        .as_ref()
        .map_or(false, |resource| resource.contains(WILDCARD));
    wildcard_action || wildcard_resource
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{OneOrMany, PolicyDocument};

    fn policy(name: &str, statements: Vec<Statement>) -> PolicyDescriptor {
        PolicyDescriptor {
            policy_name: name.to_string(),
            arn: Some(format!("arn:aws:iam::123456789012:policy/{name}")),
            document: Some(PolicyDocument { statement: statements }),
        }
    }

    fn allow(action: OneOrMany, resource: OneOrMany) -> Statement {
        Statement {
            effect: Some("Allow".to_string()),
            action: Some(action),
            resource: Some(resource),
        }
    }

    #[test]
    fn flags_wildcard_action_given_as_single_string() {
        let policies = vec![Ok(policy(
            "admin",
            vec![allow(
                OneOrMany::One("*".to_string()),
                OneOrMany::One("arn:aws:s3:::logs".to_string()),
            )],
        ))];

        let out = evaluate_policies(&policies);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].category, Category::IamPolicy);
        assert!(out.findings[0].description.contains("admin"));
    }

    #[test]
    fn flags_wildcard_resource_inside_list() {
        let policies = vec![Ok(policy(
            "broad",
            vec![allow(
                OneOrMany::Many(vec!["s3:GetObject".to_string()]),
                OneOrMany::Many(vec!["arn:aws:s3:::data/*".to_string(), "*".to_string()]),
            )],
        ))];

        assert_eq!(evaluate_policies(&policies).findings.len(), 1);
    }

    #[test]
    fn one_finding_per_noncompliant_statement_not_per_policy() {
        let policies = vec![Ok(policy(
            "double",
            vec![
                allow(OneOrMany::One("*".to_string()), OneOrMany::One("*".to_string())),
                allow(
                    OneOrMany::One("ec2:RunInstances".to_string()),
                    OneOrMany::One("*".to_string()),
                ),
                allow(
                    OneOrMany::One("s3:GetObject".to_string()),
                    OneOrMany::One("arn:aws:s3:::data".to_string()),
                ),
            ],
        ))];

        assert_eq!(evaluate_policies(&policies).findings.len(), 2);
    }

    #[test]
    fn deny_statements_never_flag() {
        let policies = vec![Ok(policy(
            "deny-all",
            vec![Statement {
                effect: Some("Deny".to_string()),
                action: Some(OneOrMany::One("*".to_string())),
                resource: Some(OneOrMany::One("*".to_string())),
            }],
        ))];

        assert!(evaluate_policies(&policies).findings.is_empty());
    }

    #[test]
    fn statement_without_action_or_resource_is_tolerated() {
        let policies = vec![Ok(policy(
            "empty",
            vec![Statement { effect: Some("Allow".to_string()), action: None, resource: None }],
        ))];

        let out = evaluate_policies(&policies);
        assert!(out.findings.is_empty());
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn malformed_policy_is_skipped_without_aborting_the_rest() {
        let policies = vec![
            Err(MalformedResource {
                resource_id: "Policies[0]".to_string(),
                reason: "missing PolicyName".to_string(),
            }),
            Ok(policy(
                "admin",
                vec![allow(OneOrMany::One("*".to_string()), OneOrMany::One("*".to_string()))],
            )),
        ];

        let out = evaluate_policies(&policies);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn policy_without_readable_document_is_reported_as_skipped() {
        let policies = vec![Ok(PolicyDescriptor {
            policy_name: "opaque".to_string(),
            arn: None,
            document: None,
        })];

        let out = evaluate_policies(&policies);
        assert!(out.findings.is_empty());
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].resource_id, "opaque");
    }
}
