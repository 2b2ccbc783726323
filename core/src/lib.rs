// CloudAudit Core Library
// 核心功能库，包含资源模型、规则评估器、聚合管线、评分和边界 trait

mod audit;
mod notify;
mod provider;
mod report;
mod resource;
mod rules;
mod scoring;
mod store;

// 重新导出常用类型
pub use audit::{Auditor, OperationalError, ScanReport, ScanStatus};
pub use notify::AlertSender;
pub use provider::{CloudProvider, MalformedResource, ResourceSet};
pub use report::{format_report, ALERT_SUBJECT};
pub use resource::{
    BucketDescriptor, Grant, Grantee, IpPermission, IpRange, MfaDevice, OneOrMany,
    PolicyDescriptor, PolicyDocument, PolicyStatus, SecurityGroupDescriptor, Statement,
    TrailDescriptor, UserDescriptor, ALL_USERS_URI, UNRESTRICTED_CIDR,
};
pub use rules::{default_rules, Category, Evaluation, Finding, RuleEvaluator};
pub use scoring::CategoryScores;
pub use store::{counts_by_day, IssueStore, PersistedIssue};

pub mod error {
    use thiserror::Error;

    use crate::audit::ScanReport;

    /// 某类资源的 list 调用整体失败（网络、认证、限流）。
    /// 对应的规则本轮不产出发现，但绝不视为"该类资源合规"
    #[derive(Error, Debug)]
    #[error("failed to fetch {kind}: {message}")]
    pub struct FetchError {
        pub kind: &'static str,
        pub message: String,
    }

    /// 告警投递失败。只记日志，从不向调用方传播
    #[derive(Error, Debug)]
    pub enum NotifyError {
        #[error("alert transport error: {0}")]
        Transport(String),

        #[error("alert delivery rejected with status {0}")]
        Rejected(u16),

        #[error("alerting is not configured")]
        NotConfigured,
    }

    /// 持久化失败。检测到却没落库的发现是正确性缺口，不允许被静默吞掉
    #[derive(Error, Debug)]
    pub enum PersistenceError {
        #[error("database error: {0}")]
        Database(String),

        #[error("corrupt issue record: {0}")]
        Corrupt(String),
    }

    /// 整体扫描失败。内存中的发现结果仍随错误带回，调用方可以展示或重试
    #[derive(Error, Debug)]
    pub enum ScanError {
        #[error("scan completed but findings could not be persisted: {source}")]
        Persistence {
            source: PersistenceError,
            report: ScanReport,
        },
    }
}
