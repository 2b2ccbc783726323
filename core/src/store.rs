use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::rules::{Category, Finding};

/// 已落库的发现。只追加：同一配置错误在每轮扫描里都会再记一条，历史会累积
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedIssue {
    pub id: i64,
    pub category: Category,
    pub description: String,
    pub remediation: String,
    pub detected_at: DateTime<Utc>,
}

/// 发现持久化边界
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// 追加一条发现，id 与时间戳由存储侧分配。从不更新或合并既有记录
    async fn record(&self, finding: &Finding) -> Result<PersistedIssue, PersistenceError>;

    /// 全部历史记录，时间倒序
    async fn list_all(&self) -> Result<Vec<PersistedIssue>, PersistenceError>;
}

/// 按自然日聚合历史计数，供仪表盘趋势图使用
pub fn counts_by_day(issues: &[PersistedIssue]) -> BTreeMap<NaiveDate, i64> {
    let mut counts = BTreeMap::new();
    for issue in issues {
        *counts.entry(issue.detected_at.date_naive()).or_insert(0) += 1;
    }
    counts
}
