use async_trait::async_trait;
use tracing::warn;

use super::{Category, Evaluation, Finding, RuleEvaluator};
use crate::error::FetchError;
use crate::provider::{CloudProvider, ResourceSet};
use crate::resource::{BucketDescriptor, Grant, ALL_USERS_URI};

/// 只有实际赋予读写能力的 ACL 授权才算公开，ACP 元数据权限不算
const PUBLIC_PERMISSIONS: [&str; 3] = ["READ", "WRITE", "FULL_CONTROL"];

const POLICY_REMEDIATION: &str =
    "Restrict the bucket policy so it no longer grants public access.";
const ACL_REMEDIATION: &str = "Make this bucket private by modifying the ACL settings.";

/// 公开 S3 桶检测：策略公开状态与 ACL 公共组授权是两个独立信号
pub struct S3ExposureRule;

#[async_trait]
impl RuleEvaluator for S3ExposureRule {
    fn name(&self) -> &'static str {
        "s3_exposure"
    }

    async fn evaluate(&self, provider: &dyn CloudProvider) -> Result<Evaluation, FetchError> {
        let buckets = provider.list_buckets().await?;
        Ok(evaluate_buckets(&buckets))
    }
}

/// 每个桶最多两个发现：策略一个、ACL 一个。
/// 查不到策略状态或 ACL 等于"信号不存在"，不是错误
pub fn evaluate_buckets(buckets: &ResourceSet<BucketDescriptor>) -> Evaluation {
    let mut out = Evaluation::default();

    for entry in buckets {
        let bucket = match entry {
            Ok(bucket) => bucket,
            Err(bad) => {
                warn!(resource = %bad.resource_id, reason = %bad.reason, "skipping malformed bucket");
                out.skipped.push(bad.clone());
                continue;
            }
        };

        if bucket.policy_status.as_ref().map_or(false, |status| status.is_public) {
            let description = format!("Bucket {} has a public bucket policy.", bucket.name);
            warn!("{description}");
            out.findings.push(Finding {
                category: Category::S3Bucket,
                description,
                remediation: POLICY_REMEDIATION.to_string(),
            });
        }

        if bucket.grants.iter().any(grant_is_public) {
            let description = format!("Public S3 bucket detected via ACL: {}", bucket.name);
            warn!("{description}");
            out.findings.push(Finding {
                category: Category::S3Bucket,
                description,
                remediation: ACL_REMEDIATION.to_string(),
            });
        }
    }

    out
}

fn grant_is_public(grant: &Grant) -> bool {
    let to_all_users = grant
        .grantee
        .as_ref()
        .and_then(|grantee| grantee.uri.as_deref())
        .map_or(false, |uri| uri == ALL_USERS_URI);
    let grants_access = grant
        .permission
        .as_deref()
        .map_or(false, |permission| PUBLIC_PERMISSIONS.contains(&permission));
    to_all_users && grants_access
}
