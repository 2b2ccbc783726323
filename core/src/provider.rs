use async_trait::async_trait;

use crate::error::FetchError;
use crate::resource::{
    BucketDescriptor, PolicyDescriptor, SecurityGroupDescriptor, TrailDescriptor, UserDescriptor,
};

/// 单个资源没能解析成预期形状。集合的其余部分照常评估，失败项单独上报
#[derive(Debug, Clone)]
pub struct MalformedResource {
    pub resource_id: String,
    pub reason: String,
}

/// 一次 list 调用的结果：整体成功之后，逐资源给出解析结果
pub type ResourceSet<T> = Vec<Result<T, MalformedResource>>;

/// 云端资源获取边界。构造一次、显式注入，不搞进程级单例客户端。
/// 真实 SDK 客户端与快照文件实现的是同一个接口
#[async_trait]
pub trait CloudProvider: Send + Sync {
    async fn list_policies(&self) -> Result<ResourceSet<PolicyDescriptor>, FetchError>;

    async fn list_buckets(&self) -> Result<ResourceSet<BucketDescriptor>, FetchError>;

    async fn list_security_groups(&self)
        -> Result<ResourceSet<SecurityGroupDescriptor>, FetchError>;

    async fn list_users(&self) -> Result<ResourceSet<UserDescriptor>, FetchError>;

    async fn list_trails(&self) -> Result<ResourceSet<TrailDescriptor>, FetchError>;
}
