// Resource module - 云资源快照模型
// 引擎只读取这些描述，从不修改；字段普遍可缺省以容忍不完整的 API 响应

use serde::{Deserialize, Serialize};

/// S3 ACL 中代表"所有用户"的公共组 URI
pub const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// 不限来源的入站 CIDR
pub const UNRESTRICTED_CIDR: &str = "0.0.0.0/0";

/// 策略文档中单值或列表两种写法都合法的字段（Action / Resource）。
/// 所有规则共用这一个归一化入口，成员判断前先统一成切片
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn values(&self) -> &[String] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values.as_slice(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.values().iter().any(|value| value == needle)
    }
}

/// IAM 策略与其当前生效版本的文档
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDescriptor {
    pub policy_name: String,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub document: Option<PolicyDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    #[serde(default)]
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub action: Option<OneOrMany>,
    #[serde(default)]
    pub resource: Option<OneOrMany>,
}

/// S3 桶快照：策略公开状态 + ACL 授权列表
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketDescriptor {
    pub name: String,
    #[serde(default)]
    pub policy_status: Option<PolicyStatus>,
    #[serde(default)]
    pub grants: Vec<Grant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatus {
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Grant {
    #[serde(default)]
    pub grantee: Option<Grantee>,
    #[serde(default)]
    pub permission: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grantee {
    #[serde(rename = "URI", default)]
    pub uri: Option<String>,
}

/// EC2 安全组及其入站规则
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupDescriptor {
    pub group_id: String,
    pub group_name: String,
    #[serde(default)]
    pub ip_permissions: Vec<IpPermission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpPermission {
    #[serde(default)]
    pub from_port: Option<i64>,
    #[serde(default)]
    pub to_port: Option<i64>,
    #[serde(default)]
    pub ip_protocol: Option<String>,
    #[serde(default)]
    pub ip_ranges: Vec<IpRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpRange {
    #[serde(default)]
    pub cidr_ip: Option<String>,
}

/// IAM 用户与其已绑定的 MFA 设备
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDescriptor {
    pub user_name: String,
    #[serde(default)]
    pub mfa_devices: Vec<MfaDevice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MfaDevice {
    #[serde(default)]
    pub serial_number: Option<String>,
}

/// CloudTrail 审计日志开关状态。状态取不到时按未开启处理
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrailDescriptor {
    pub name: String,
    #[serde(default)]
    pub is_logging: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_accepts_single_string_form() {
        let statement: Statement =
            serde_json::from_str(r#"{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"}"#)
                .unwrap();
        let action = statement.action.unwrap();
        assert_eq!(action.values(), ["s3:GetObject".to_string()]);
        assert!(statement.resource.unwrap().contains("*"));
    }

    #[test]
    fn action_accepts_list_form() {
        let statement: Statement =
            serde_json::from_str(r#"{"Effect": "Allow", "Action": ["s3:*", "ec2:*"]}"#).unwrap();
        let action = statement.action.unwrap();
        assert_eq!(action.values().len(), 2);
        assert!(action.contains("ec2:*"));
        assert!(statement.resource.is_none());
    }

    #[test]
    fn bucket_tolerates_missing_policy_status_and_grants() {
        let bucket: BucketDescriptor = serde_json::from_str(r#"{"Name": "logs"}"#).unwrap();
        assert!(bucket.policy_status.is_none());
        assert!(bucket.grants.is_empty());
    }

    #[test]
    fn security_group_parses_aws_shaped_json() {
        let sg: SecurityGroupDescriptor = serde_json::from_str(
            r#"{
                "GroupId": "sg-1",
                "GroupName": "web",
                "IpPermissions": [
                    {"FromPort": 22, "ToPort": 22, "IpProtocol": "tcp",
                     "IpRanges": [{"CidrIp": "0.0.0.0/0"}]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(sg.ip_permissions.len(), 1);
        assert_eq!(
            sg.ip_permissions[0].ip_ranges[0].cidr_ip.as_deref(),
            Some(UNRESTRICTED_CIDR)
        );
    }
}
