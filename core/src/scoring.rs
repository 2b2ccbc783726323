use serde::{Deserialize, Serialize};

use crate::rules::{Category, Finding};

/// 一次扫描得出的各面板健康评分，满分 100，每个发现扣 10 分。
/// 只由本次扫描的发现计算，和历史记录无关，也不落库
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryScores {
    pub iam: u32,
    pub s3: u32,
    pub security_group: u32,
    pub cloud_trail: u32,
}

impl CategoryScores {
    /// 还没扫描过时的基线：各项满分
    pub const fn perfect() -> Self {
        Self { iam: 100, s3: 100, security_group: 100, cloud_trail: 100 }
    }

    /// IAM 策略发现与 MFA 发现合入同一个 IAM 评分桶，
    /// 评分粒度比规则粒度粗，这是有意为之的唯一粒度
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut iam = 0usize;
        let mut s3 = 0usize;
        let mut security_group = 0usize;
        let mut cloud_trail = 0usize;

        for finding in findings {
            match finding.category {
                Category::IamPolicy | Category::Mfa => iam += 1,
                Category::S3Bucket => s3 += 1,
                Category::SecurityGroup => security_group += 1,
                Category::CloudTrail => cloud_trail += 1,
            }
        }

        Self {
            iam: score(iam),
            s3: score(s3),
            security_group: score(security_group),
            cloud_trail: score(cloud_trail),
        }
    }
}

impl Default for CategoryScores {
    fn default() -> Self {
        Self::perfect()
    }
}

/// max(100 - 10 * count, 0)
fn score(count: usize) -> u32 {
    100u32.saturating_sub((count as u32).saturating_mul(10))
}
