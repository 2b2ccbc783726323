use std::path::PathBuf;

use async_trait::async_trait;
use cloudaudit_core::error::FetchError;
use cloudaudit_core::{
    BucketDescriptor, CloudProvider, MalformedResource, PolicyDescriptor, ResourceSet,
    SecurityGroupDescriptor, TrailDescriptor, UserDescriptor,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 账户快照 Provider：从一个分节的 JSON 快照文件读取各类资源。
/// 真实的云 API 客户端在边界之外，接同一个 CloudProvider trait 即可
pub struct SnapshotProvider {
    path: PathBuf,
}

impl SnapshotProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// 读出一个资源小节。小节缺失等同于一次失败的 list 调用；
    /// 小节里的单个坏元素降级为逐资源的解析失败项
    async fn section<T: DeserializeOwned>(
        &self,
        kind: &'static str,
    ) -> Result<ResourceSet<T>, FetchError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| FetchError {
            kind,
            message: format!("cannot read snapshot {}: {}", self.path.display(), e),
        })?;

        let snapshot: Value = serde_json::from_str(&raw).map_err(|e| FetchError {
            kind,
            message: format!("snapshot is not valid JSON: {e}"),
        })?;

        let Some(items) = snapshot.get(kind).and_then(Value::as_array) else {
            return Err(FetchError {
                kind,
                message: format!("snapshot has no '{kind}' section"),
            });
        };

        Ok(items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<T>(item.clone()).map_err(|e| MalformedResource {
                    resource_id: format!("{kind}[{index}]"),
                    reason: e.to_string(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl CloudProvider for SnapshotProvider {
    async fn list_policies(&self) -> Result<ResourceSet<PolicyDescriptor>, FetchError> {
        self.section("Policies").await
    }

    async fn list_buckets(&self) -> Result<ResourceSet<BucketDescriptor>, FetchError> {
        self.section("Buckets").await
    }

    async fn list_security_groups(
        &self,
    ) -> Result<ResourceSet<SecurityGroupDescriptor>, FetchError> {
        self.section("SecurityGroups").await
    }

    async fn list_users(&self) -> Result<ResourceSet<UserDescriptor>, FetchError> {
        self.section("Users").await
    }

    async fn list_trails(&self) -> Result<ResourceSet<TrailDescriptor>, FetchError> {
        self.section("Trails").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn snapshot_file(contents: &str) -> (tempfile::TempDir, SnapshotProvider) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, SnapshotProvider::new(path))
    }

    #[tokio::test]
    async fn parses_policies_with_single_string_action() {
        let (_dir, provider) = snapshot_file(
            r#"{
                "Policies": [
                    {"PolicyName": "admin",
                     "Document": {"Statement": [
                        {"Effect": "Allow", "Action": "*", "Resource": "*"}
                     ]}}
                ]
            }"#,
        );

        let policies = provider.list_policies().await.unwrap();
        assert_eq!(policies.len(), 1);
        let policy = policies[0].as_ref().unwrap();
        assert_eq!(policy.policy_name, "admin");
        let statement = &policy.document.as_ref().unwrap().statement[0];
        assert!(statement.action.as_ref().unwrap().contains("*"));
    }

    #[tokio::test]
    async fn malformed_element_becomes_a_per_resource_failure() {
        let (_dir, provider) = snapshot_file(
            r#"{
                "Users": [
                    {"UserName": "alice", "MfaDevices": []},
                    {"MfaDevices": "not-a-list"}
                ]
            }"#,
        );

        let users = provider.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].is_ok());
        let bad = users[1].as_ref().unwrap_err();
        assert_eq!(bad.resource_id, "Users[1]");
    }

    #[tokio::test]
    async fn missing_section_is_a_fetch_error() {
        let (_dir, provider) = snapshot_file(r#"{"Policies": []}"#);

        let err = provider.list_trails().await.unwrap_err();
        assert_eq!(err.kind, "Trails");
    }

    #[tokio::test]
    async fn unreadable_snapshot_is_a_fetch_error() {
        let provider = SnapshotProvider::new(PathBuf::from("/nonexistent/snapshot.json"));

        assert!(provider.list_buckets().await.is_err());
    }
}
