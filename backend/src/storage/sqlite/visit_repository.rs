use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use sqlx::{sqlite::SqliteRow, Row};
use std::collections::HashMap;

use super::connection::DbConnection;
use crate::storage::records::{
    ActiveVisitRecord, FeedbackRecord, UserRecord, VisitDetailRecord, VisitRecord,
};
use crate::storage::traits::VisitStorage;

/// Repository for visits
#[derive(Clone)]
pub struct VisitRepository {
    db: DbConnection,
}

impl VisitRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn visit_from_row(row: &SqliteRow) -> Result<VisitRecord> {
        Ok(VisitRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            check_in_time: row.try_get("check_in_time")?,
            check_out_time: row.try_get("check_out_time")?,
            duration: row.try_get("duration")?,
            created_at: row.try_get("created_at")?,
        })
    }

    /// User columns from a LEFT JOIN, prefixed with `u_`
    fn joined_user_from_row(row: &SqliteRow) -> Result<Option<UserRecord>> {
        let id: Option<String> = row.try_get("u_id")?;
        let Some(id) = id else {
            return Ok(None);
        };
        Ok(Some(UserRecord {
            id,
            name: row.try_get("u_name")?,
            birthdate: row.try_get("u_birthdate")?,
            guardian_name: row.try_get("u_guardian_name")?,
            guardian_contact: row.try_get("u_guardian_contact")?,
            emergency_contact: row.try_get("u_emergency_contact")?,
            photo_url: row.try_get("u_photo_url")?,
            created_at: row.try_get("u_created_at")?,
        }))
    }

    /// Feedback columns from a LEFT JOIN, prefixed with `f_`
    fn joined_feedback_from_row(row: &SqliteRow, visit_id: &str) -> Result<Option<FeedbackRecord>> {
        let id: Option<String> = row.try_get("f_id")?;
        let Some(id) = id else {
            return Ok(None);
        };
        Ok(Some(FeedbackRecord {
            id,
            visit_id: visit_id.to_string(),
            rating: row.try_get("f_rating")?,
            comments: row.try_get("f_comments")?,
            created_at: row.try_get("f_created_at")?,
        }))
    }
}

#[async_trait]
impl VisitStorage for VisitRepository {
    async fn create_visit(&self, visit: &VisitRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO visits (id, user_id, check_in_time, check_out_time, duration, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&visit.id)
        .bind(&visit.user_id)
        .bind(&visit.check_in_time)
        .bind(&visit.check_out_time)
        .bind(visit.duration)
        .bind(&visit.created_at)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!("User {} already has an open visit", visit.user_id);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_visit(&self, visit_id: &str) -> Result<Option<VisitRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, check_in_time, check_out_time, duration, created_at
            FROM visits
            WHERE id = ?
            "#,
        )
        .bind(visit_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::visit_from_row).transpose()
    }

    async fn get_open_visit_for_user(&self, user_id: &str) -> Result<Option<VisitRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, check_in_time, check_out_time, duration, created_at
            FROM visits
            WHERE user_id = ? AND check_out_time IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::visit_from_row).transpose()
    }

    async fn close_visit(&self, visit_id: &str, check_out_time: &str, duration: f64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE visits
            SET check_out_time = ?, duration = ?
            WHERE id = ? AND check_out_time IS NULL
            "#,
        )
        .bind(check_out_time)
        .bind(duration)
        .bind(visit_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_open_visits(&self) -> Result<Vec<ActiveVisitRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT v.id, v.user_id, v.check_in_time, v.check_out_time, v.duration,
                   v.created_at, u.name AS user_name
            FROM visits v
            INNER JOIN users u ON u.id = v.user_id
            WHERE v.check_out_time IS NULL
            ORDER BY v.check_in_time ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ActiveVisitRecord {
                    visit: Self::visit_from_row(row)?,
                    user_name: row.try_get("user_name")?,
                })
            })
            .collect()
    }

    async fn count_open_visits(&self) -> Result<u64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS open_visits
            FROM visits v
            INNER JOIN users u ON u.id = v.user_id
            WHERE v.check_out_time IS NULL
            "#,
        )
        .fetch_one(self.db.pool())
        .await?;

        let count: i64 = row.try_get("open_visits")?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn list_visit_details(&self, start: &str, end: &str) -> Result<Vec<VisitDetailRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT v.id, v.user_id, v.check_in_time, v.check_out_time, v.duration, v.created_at,
                   u.id AS u_id, u.name AS u_name, u.birthdate AS u_birthdate,
                   u.guardian_name AS u_guardian_name, u.guardian_contact AS u_guardian_contact,
                   u.emergency_contact AS u_emergency_contact, u.photo_url AS u_photo_url,
                   u.created_at AS u_created_at,
                   f.id AS f_id, f.rating AS f_rating, f.comments AS f_comments,
                   f.created_at AS f_created_at
            FROM visits v
            LEFT JOIN users u ON u.id = v.user_id
            LEFT JOIN feedback f ON f.visit_id = v.id
            WHERE v.check_in_time >= ? AND v.check_in_time < ?
            ORDER BY v.check_in_time ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.db.pool())
        .await?;

        let usage_rows = sqlx::query(
            r#"
            SELECT fu.visit_id, fu.facility_name
            FROM facility_usage fu
            INNER JOIN visits v ON v.id = fu.visit_id
            WHERE v.check_in_time >= ? AND v.check_in_time < ?
            ORDER BY fu.created_at ASC, fu.rowid ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.db.pool())
        .await?;

        let mut facilities_by_visit: HashMap<String, Vec<String>> = HashMap::new();
        for row in &usage_rows {
            let visit_id: String = row.try_get("visit_id")?;
            let facility: String = row.try_get("facility_name")?;
            facilities_by_visit.entry(visit_id).or_default().push(facility);
        }

        let mut details = Vec::with_capacity(rows.len());
        for row in &rows {
            let visit = Self::visit_from_row(row)?;
            let user = Self::joined_user_from_row(row)?;
            let feedback = Self::joined_feedback_from_row(row, &visit.id)?;
            let facilities = facilities_by_visit.remove(&visit.id).unwrap_or_default();
            details.push(VisitDetailRecord {
                visit,
                user,
                feedback,
                facilities,
            });
        }

        info!("Loaded {} visits checked in between {} and {}", details.len(), start, end);
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::FacilityUsageRecord;
    use crate::storage::sqlite::{FeedbackRepository, UserRepository};
    use crate::storage::traits::{FeedbackStorage, UserStorage};

    async fn setup_test() -> (DbConnection, VisitRepository) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = VisitRepository::new(db.clone());
        (db, repo)
    }

    fn open_visit(id: &str, user_id: &str, check_in_time: &str) -> VisitRecord {
        VisitRecord {
            id: id.to_string(),
            user_id: user_id.to_string(),
            check_in_time: check_in_time.to_string(),
            check_out_time: None,
            duration: None,
            created_at: check_in_time.to_string(),
        }
    }

    async fn store_user(db: &DbConnection, id: &str, name: &str) {
        UserRepository::new(db.clone())
            .store_user(&UserRecord {
                id: id.to_string(),
                name: name.to_string(),
                birthdate: "2012-04-01".to_string(),
                guardian_name: "Guardian".to_string(),
                guardian_contact: "0917 555 0101".to_string(),
                emergency_contact: None,
                photo_url: None,
                created_at: "2024-01-01T00:00:00.000Z".to_string(),
            })
            .await
            .expect("Failed to store user");
    }

    #[tokio::test]
    async fn test_one_open_visit_per_user() {
        let (db, repo) = setup_test().await;
        store_user(&db, "user::1", "Ana").await;

        let first = open_visit("visit::1", "user::1", "2024-01-01T01:00:00.000Z");
        assert!(repo.create_visit(&first).await.unwrap());

        let second = open_visit("visit::2", "user::1", "2024-01-01T02:00:00.000Z");
        assert!(!repo.create_visit(&second).await.unwrap());

        let open = repo.get_open_visit_for_user("user::1").await.unwrap().unwrap();
        assert_eq!(open.id, "visit::1");
    }

    #[tokio::test]
    async fn test_close_visit_only_once() {
        let (db, repo) = setup_test().await;
        store_user(&db, "user::1", "Ana").await;
        repo.create_visit(&open_visit("visit::1", "user::1", "2024-01-01T01:00:00.000Z"))
            .await
            .unwrap();

        assert!(repo.close_visit("visit::1", "2024-01-01T03:30:00.000Z", 2.5).await.unwrap());
        assert!(!repo.close_visit("visit::1", "2024-01-01T05:00:00.000Z", 4.0).await.unwrap());
        assert!(!repo.close_visit("visit::missing", "2024-01-01T05:00:00.000Z", 4.0).await.unwrap());

        let closed = repo.get_visit("visit::1").await.unwrap().unwrap();
        assert_eq!(closed.check_out_time.as_deref(), Some("2024-01-01T03:30:00.000Z"));
        assert_eq!(closed.duration, Some(2.5));

        // A closed visit frees the user to check in again
        assert!(repo
            .create_visit(&open_visit("visit::2", "user::1", "2024-01-02T01:00:00.000Z"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_open_visits_skip_deleted_users() {
        let (db, repo) = setup_test().await;
        store_user(&db, "user::1", "Ana").await;
        store_user(&db, "user::2", "Bea").await;
        repo.create_visit(&open_visit("visit::2", "user::2", "2024-01-01T02:00:00.000Z"))
            .await
            .unwrap();
        repo.create_visit(&open_visit("visit::1", "user::1", "2024-01-01T01:00:00.000Z"))
            .await
            .unwrap();

        let open = repo.list_open_visits().await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].user_name, "Ana");
        assert_eq!(repo.count_open_visits().await.unwrap(), 2);

        UserRepository::new(db.clone()).delete_user("user::2").await.unwrap();
        assert_eq!(repo.list_open_visits().await.unwrap().len(), 1);
        assert_eq!(repo.count_open_visits().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_visit_details_join() {
        let (db, repo) = setup_test().await;
        store_user(&db, "user::1", "Ana").await;

        repo.create_visit(&open_visit("visit::1", "user::1", "2024-01-01T01:00:00.000Z"))
            .await
            .unwrap();
        repo.close_visit("visit::1", "2024-01-01T02:00:00.000Z", 1.0).await.unwrap();
        repo.create_visit(&open_visit("visit::2", "user::ghost", "2024-01-01T03:00:00.000Z"))
            .await
            .unwrap();
        // Outside the range
        repo.create_visit(&open_visit("visit::3", "user::1", "2024-01-05T03:00:00.000Z"))
            .await
            .unwrap();

        FeedbackRepository::new(db.clone())
            .store_feedback(
                &FeedbackRecord {
                    id: "feedback::1".to_string(),
                    visit_id: "visit::1".to_string(),
                    rating: 4,
                    comments: "Fun".to_string(),
                    created_at: "2024-01-01T02:01:00.000Z".to_string(),
                },
                &[
                    FacilityUsageRecord {
                        id: "usage::1".to_string(),
                        visit_id: "visit::1".to_string(),
                        facility_name: "Robotics".to_string(),
                        created_at: "2024-01-01T02:01:00.000Z".to_string(),
                    },
                    FacilityUsageRecord {
                        id: "usage::2".to_string(),
                        visit_id: "visit::1".to_string(),
                        facility_name: "Cricut".to_string(),
                        created_at: "2024-01-01T02:01:00.000Z".to_string(),
                    },
                ],
            )
            .await
            .unwrap();

        let details = repo
            .list_visit_details("2024-01-01T00:00:00.000Z", "2024-01-02T00:00:00.000Z")
            .await
            .unwrap();
        assert_eq!(details.len(), 2);

        let first = &details[0];
        assert_eq!(first.visit.id, "visit::1");
        assert_eq!(first.user.as_ref().unwrap().name, "Ana");
        assert_eq!(first.feedback.as_ref().unwrap().rating, 4);
        assert_eq!(first.facilities, vec!["Robotics", "Cricut"]);

        let second = &details[1];
        assert!(second.user.is_none());
        assert!(second.feedback.is_none());
        assert!(second.facilities.is_empty());
    }
}
