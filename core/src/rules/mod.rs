// Rules module - 规则评估器模块
// 每条规则都是资源集合到发现列表的纯函数，评估器只负责套上拉取这一层

pub mod cloudtrail;
pub mod iam_policy;
pub mod mfa;
pub mod s3_exposure;
pub mod security_group;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::provider::{CloudProvider, MalformedResource};

/// 一项检测到的配置错误。创建后不可变，时间戳在落库时才分配
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub category: Category,
    pub description: String,
    pub remediation: String,
}

/// 发现类别。展示名同时用于报告正文和数据库存储
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "IAM Policy")]
    IamPolicy,
    #[serde(rename = "S3 Bucket")]
    S3Bucket,
    #[serde(rename = "Security Group")]
    SecurityGroup,
    #[serde(rename = "MFA")]
    Mfa,
    #[serde(rename = "CloudTrail")]
    CloudTrail,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::IamPolicy => "IAM Policy",
            Category::S3Bucket => "S3 Bucket",
            Category::SecurityGroup => "Security Group",
            Category::Mfa => "MFA",
            Category::CloudTrail => "CloudTrail",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "IAM Policy" => Ok(Category::IamPolicy),
            "S3 Bucket" => Ok(Category::S3Bucket),
            "Security Group" => Ok(Category::SecurityGroup),
            "MFA" => Ok(Category::Mfa),
            "CloudTrail" => Ok(Category::CloudTrail),
            other => Err(format!("unknown finding category: {other}")),
        }
    }
}

/// 单条规则的评估输出：发现列表 + 被跳过的畸形资源
#[derive(Debug, Default)]
pub struct Evaluation {
    pub findings: Vec<Finding>,
    pub skipped: Vec<MalformedResource>,
}

/// 规则评估器 trait - 所有规则都需要实现此接口
#[async_trait]
pub trait RuleEvaluator: Send + Sync {
    /// 规则名称，用于日志与运行错误定位
    fn name(&self) -> &'static str;

    /// 拉取本规则关心的资源集合并评估
    async fn evaluate(&self, provider: &dyn CloudProvider) -> Result<Evaluation, FetchError>;
}

/// 默认规则集。注册顺序即聚合与报告顺序：IAM、S3、安全组、MFA、CloudTrail
pub fn default_rules() -> Vec<Box<dyn RuleEvaluator>> {
    vec![
        Box::new(iam_policy::IamPolicyRule),
        Box::new(s3_exposure::S3ExposureRule),
        Box::new(security_group::SecurityGroupRule),
        Box::new(mfa::MfaRule),
        Box::new(cloudtrail::CloudTrailRule),
    ]
}
