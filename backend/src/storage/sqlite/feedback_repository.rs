use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use sqlx::Row;

use super::connection::DbConnection;
use crate::storage::records::{FacilityUsageRecord, FeedbackRecord};
use crate::storage::traits::FeedbackStorage;

/// Repository for post-visit feedback and facility usage
#[derive(Clone)]
pub struct FeedbackRepository {
    db: DbConnection,
}

impl FeedbackRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeedbackStorage for FeedbackRepository {
    async fn has_feedback(&self, visit_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM feedback WHERE visit_id = ?")
            .bind(visit_id)
            .fetch_one(self.db.pool())
            .await?;
        let count: i64 = row.try_get("n")?;
        Ok(count > 0)
    }

    async fn store_feedback(
        &self,
        feedback: &FeedbackRecord,
        usages: &[FacilityUsageRecord],
    ) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO feedback (id, visit_id, rating, comments, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&feedback.id)
        .bind(&feedback.visit_id)
        .bind(feedback.rating)
        .bind(&feedback.comments)
        .bind(&feedback.created_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!("Visit {} already has feedback", feedback.visit_id);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        for usage in usages {
            sqlx::query(
                r#"
                INSERT INTO facility_usage (id, visit_id, facility_name, created_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&usage.id)
            .bind(&usage.visit_id)
            .bind(&usage.facility_name)
            .bind(&usage.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::VisitRecord;
    use crate::storage::sqlite::VisitRepository;
    use crate::storage::traits::VisitStorage;

    async fn setup_test() -> FeedbackRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        VisitRepository::new(db.clone())
            .create_visit(&VisitRecord {
                id: "visit::1".to_string(),
                user_id: "user::1".to_string(),
                check_in_time: "2024-01-01T01:00:00.000Z".to_string(),
                check_out_time: None,
                duration: None,
                created_at: "2024-01-01T01:00:00.000Z".to_string(),
            })
            .await
            .expect("Failed to create visit");
        FeedbackRepository::new(db)
    }

    fn feedback(id: &str, rating: i64) -> FeedbackRecord {
        FeedbackRecord {
            id: id.to_string(),
            visit_id: "visit::1".to_string(),
            rating,
            comments: String::new(),
            created_at: "2024-01-01T03:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_feedback() {
        let repo = setup_test().await;
        assert!(!repo.has_feedback("visit::1").await.unwrap());

        assert!(repo.store_feedback(&feedback("feedback::1", 5), &[]).await.unwrap());
        assert!(repo.has_feedback("visit::1").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_usage_insert_rolls_back_feedback() {
        let repo = setup_test().await;
        let usage = FacilityUsageRecord {
            id: "usage::1".to_string(),
            visit_id: "visit::1".to_string(),
            facility_name: "Robotics".to_string(),
            created_at: "2024-01-01T03:00:00.000Z".to_string(),
        };

        // Duplicate usage ids violate the primary key on the second insert
        let result = repo
            .store_feedback(&feedback("feedback::1", 4), &[usage.clone(), usage])
            .await;
        assert!(result.is_err());
        assert!(!repo.has_feedback("visit::1").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_feedback_for_visit_is_rejected() {
        let repo = setup_test().await;
        assert!(repo.store_feedback(&feedback("feedback::1", 5), &[]).await.unwrap());
        let usage = FacilityUsageRecord {
            id: "usage::2".to_string(),
            visit_id: "visit::1".to_string(),
            facility_name: "Robotics".to_string(),
            created_at: "2024-01-01T03:05:00.000Z".to_string(),
        };
        assert!(!repo
            .store_feedback(&feedback("feedback::2", 3), &[usage])
            .await
            .unwrap());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM facility_usage")
            .fetch_one(repo.db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
