use async_trait::async_trait;

use crate::error::NotifyError;

/// 出站告警边界：一次 send 即一封邮件。投递失败由调用方记日志，不会让扫描失败
#[async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError>;
}
