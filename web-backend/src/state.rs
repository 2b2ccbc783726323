use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use cloudaudit_core::{AlertSender, CategoryScores};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tokio::sync::Mutex;

use crate::email::{DisabledSender, SendGridSender};
use crate::provider::SnapshotProvider;
use crate::store::init_schema;

/// 应用状态：所有外部协作方在启动时构造一次并显式注入，
/// 不搞进程级单例客户端
#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub provider: Arc<SnapshotProvider>,
    pub alerts: Arc<dyn AlertSender>,
    pub recipient: String,
    /// 本会话最近一次扫描的评分。还没扫描过时各项按 100 展示
    pub latest_scores: Arc<Mutex<Option<CategoryScores>>>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        // 账户快照路径。接真实云 SDK 时换一个 CloudProvider 实现即可
        let snapshot_path = std::env::var("SNAPSHOT_PATH")
            .unwrap_or_else(|_| "account_snapshot.json".to_string());
        let provider = Arc::new(SnapshotProvider::new(PathBuf::from(snapshot_path)));

        // 告警通道：没配 API key 时降级为只记日志，不拦启动
        let alerts: Arc<dyn AlertSender> = match std::env::var("SENDGRID_API_KEY") {
            Ok(key) if !key.is_empty() => {
                let sender = std::env::var("SENDER_EMAIL").unwrap_or_default();
                Arc::new(SendGridSender::new(key, sender))
            }
            _ => {
                tracing::warn!("SENDGRID_API_KEY not set, email alerts disabled");
                Arc::new(DisabledSender)
            }
        };
        let recipient = std::env::var("RECIPIENT_EMAIL").unwrap_or_default();

        let db = init_db().await?;

        Ok(Self {
            db,
            provider,
            alerts,
            recipient,
            latest_scores: Arc::new(Mutex::new(None)),
        })
    }
}

async fn init_db() -> anyhow::Result<Pool<Sqlite>> {
    let current_dir = std::env::current_dir()?;
    let db_path = current_dir.join("cloudaudit_web.db");

    tracing::info!("Database path: {}", db_path.display());

    // 使用 SqliteConnectOptions 来确保数据库文件可以被创建
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    init_schema(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create tables: {}", e))?;

    tracing::info!("Database initialized successfully");

    Ok(pool)
}
