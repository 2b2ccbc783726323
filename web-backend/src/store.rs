use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudaudit_core::error::PersistenceError;
use cloudaudit_core::{Category, Finding, IssueStore, PersistedIssue};
use sqlx::{Pool, Sqlite};

/// 建表。幂等，启动与测试共用
pub async fn init_schema(db: &Pool<Sqlite>) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS issues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            remediation TEXT NOT NULL,
            detected_at DATETIME NOT NULL
        );
        "#,
    )
    .execute(db)
    .await?;
    Ok(())
}

/// SQLite 发现存储。只追加，detected_at 在写入时分配，从不更新或删除
pub struct SqliteIssueStore {
    db: Pool<Sqlite>,
}

impl SqliteIssueStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IssueStore for SqliteIssueStore {
    async fn record(&self, finding: &Finding) -> Result<PersistedIssue, PersistenceError> {
        let detected_at = Utc::now();

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO issues (category, description, remediation, detected_at)
             VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(finding.category.as_str())
        .bind(&finding.description)
        .bind(&finding.remediation)
        .bind(detected_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| PersistenceError::Database(e.to_string()))?;

        Ok(PersistedIssue {
            id,
            category: finding.category,
            description: finding.description.clone(),
            remediation: finding.remediation.clone(),
            detected_at,
        })
    }

    async fn list_all(&self) -> Result<Vec<PersistedIssue>, PersistenceError> {
        let rows = sqlx::query_as::<_, (i64, String, String, String, DateTime<Utc>)>(
            "SELECT id, category, description, remediation, detected_at
             FROM issues
             ORDER BY detected_at DESC, id DESC",
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| PersistenceError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|(id, category, description, remediation, detected_at)| {
                let category = Category::try_from(category.as_str())
                    .map_err(PersistenceError::Corrupt)?;
                Ok(PersistedIssue { id, category, description, remediation, detected_at })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudaudit_core::counts_by_day;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SqliteIssueStore {
        // 内存库必须钉在单连接上，否则每个连接各有一份空库
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        SqliteIssueStore::new(pool)
    }

    fn finding(category: Category, description: &str) -> Finding {
        Finding {
            category,
            description: description.to_string(),
            remediation: "Fix it.".to_string(),
        }
    }

    #[tokio::test]
    async fn record_assigns_id_and_timestamp_and_round_trips() {
        let store = memory_store().await;

        let issue = store
            .record(&finding(Category::Mfa, "IAM user alice does not have MFA enabled."))
            .await
            .unwrap();
        assert!(issue.id >= 1);

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].category, Category::Mfa);
        assert_eq!(all[0].description, "IAM user alice does not have MFA enabled.");
        assert_eq!(all[0].detected_at.timestamp(), issue.detected_at.timestamp());
    }

    #[tokio::test]
    async fn list_all_returns_newest_first() {
        let store = memory_store().await;

        let first = store.record(&finding(Category::S3Bucket, "first")).await.unwrap();
        let second = store.record(&finding(Category::CloudTrail, "second")).await.unwrap();
        assert!(second.id > first.id);

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].description, "second");
        assert_eq!(all[1].description, "first");
    }

    #[tokio::test]
    async fn repeated_findings_append_instead_of_merging() {
        let store = memory_store().await;
        let same = finding(Category::SecurityGroup, "sg-web open to the world");

        store.record(&same).await.unwrap();
        store.record(&same).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_ne!(all[0].id, all[1].id);
    }

    #[tokio::test]
    async fn trend_groups_persisted_rows_by_day() {
        let store = memory_store().await;
        store.record(&finding(Category::S3Bucket, "a")).await.unwrap();
        store.record(&finding(Category::S3Bucket, "b")).await.unwrap();

        let counts = counts_by_day(&store.list_all().await.unwrap());
        assert_eq!(counts.len(), 1);
        assert_eq!(*counts.values().next().unwrap(), 2);
    }
}
