use async_trait::async_trait;
use cloudaudit_core::error::NotifyError;
use cloudaudit_core::AlertSender;
use serde_json::json;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// 经 SendGrid v3 API 发送纯文本告警邮件
pub struct SendGridSender {
    client: reqwest::Client,
    api_key: String,
    sender: String,
}

impl SendGridSender {
    pub fn new(api_key: String, sender: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            sender,
        }
    }
}

#[async_trait]
impl AlertSender for SendGridSender {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": recipient }] }],
            "from": { "email": self.sender },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if response.status().is_success() {
            tracing::info!(status = %response.status(), "alert email sent");
            Ok(())
        } else {
            Err(NotifyError::Rejected(response.status().as_u16()))
        }
    }
}

/// 未配置 API key 时的降级实现。发送动作只留下一条日志记录
pub struct DisabledSender;

#[async_trait]
impl AlertSender for DisabledSender {
    async fn send(&self, subject: &str, _body: &str, _recipient: &str) -> Result<(), NotifyError> {
        tracing::warn!(subject, "alert suppressed, sender is not configured");
        Err(NotifyError::NotConfigured)
    }
}
