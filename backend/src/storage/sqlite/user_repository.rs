use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use sqlx::{sqlite::SqliteRow, Row};

use super::connection::DbConnection;
use crate::storage::records::UserRecord;
use crate::storage::traits::UserStorage;

/// Repository for registered users
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn user_from_row(row: &SqliteRow) -> Result<UserRecord> {
        Ok(UserRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            birthdate: row.try_get("birthdate")?,
            guardian_name: row.try_get("guardian_name")?,
            guardian_contact: row.try_get("guardian_contact")?,
            emergency_contact: row.try_get("emergency_contact")?,
            photo_url: row.try_get("photo_url")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Escape LIKE wildcards so user input only ever matches literally
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn store_user(&self, user: &UserRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, birthdate, guardian_name, guardian_contact,
                               emergency_contact, photo_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.birthdate)
        .bind(&user.guardian_name)
        .bind(&user.guardian_contact)
        .bind(&user.emergency_contact)
        .bind(&user.photo_url)
        .bind(&user.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, birthdate, guardian_name, guardian_contact,
                   emergency_contact, photo_url, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, birthdate, guardian_name, guardian_contact,
                   emergency_contact, photo_url, created_at
            FROM users
            ORDER BY name ASC, created_at ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::user_from_row).collect()
    }

    async fn search_users(&self, fragment: &str) -> Result<Vec<UserRecord>> {
        let pattern = like_pattern(fragment);
        debug!("Searching users with pattern {}", pattern);

        let rows = sqlx::query(
            r#"
            SELECT id, name, birthdate, guardian_name, guardian_contact,
                   emergency_contact, photo_url, created_at
            FROM users
            WHERE name LIKE ? ESCAPE '\'
            ORDER BY name ASC, created_at ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::user_from_row).collect()
    }

    async fn update_user(&self, user: &UserRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, guardian_name = ?, guardian_contact = ?,
                emergency_contact = ?, photo_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.guardian_name)
        .bind(&user.guardian_contact)
        .bind(&user.emergency_contact)
        .bind(&user.photo_url)
        .bind(&user.id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> UserRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        UserRepository::new(db)
    }

    fn user(id: &str, name: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: name.to_string(),
            birthdate: "2012-04-01".to_string(),
            guardian_name: "Guardian".to_string(),
            guardian_contact: "0917 555 0101".to_string(),
            emergency_contact: None,
            photo_url: None,
            created_at: "2024-01-01T01:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_and_get_user() {
        let repo = setup_test().await;
        let mut record = user("user::1", "Ana Cruz");
        record.emergency_contact = Some("0918 000 1111".to_string());

        repo.store_user(&record).await.expect("Failed to store user");

        let loaded = repo.get_user("user::1").await.expect("Failed to get user");
        assert_eq!(loaded, Some(record));
        assert!(repo.get_user("user::missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_ordered_by_name() {
        let repo = setup_test().await;
        repo.store_user(&user("user::1", "Carlo")).await.unwrap();
        repo.store_user(&user("user::2", "Ana")).await.unwrap();
        repo.store_user(&user("user::3", "Bea")).await.unwrap();

        let names: Vec<String> = repo
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bea", "Carlo"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let repo = setup_test().await;
        repo.store_user(&user("user::1", "Ana Cruz")).await.unwrap();
        repo.store_user(&user("user::2", "Juan dela Cruz")).await.unwrap();
        repo.store_user(&user("user::3", "Bea Santos")).await.unwrap();

        let hits = repo.search_users("cruz").await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = repo.search_users("SANTOS").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "user::3");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let repo = setup_test().await;
        repo.store_user(&user("user::1", "Ana Cruz")).await.unwrap();
        repo.store_user(&user("user::2", "100% Maker")).await.unwrap();

        assert!(repo.search_users("_").await.unwrap().is_empty());
        let hits = repo.search_users("%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "user::2");
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let repo = setup_test().await;
        repo.store_user(&user("user::1", "Ana Cruz")).await.unwrap();

        let mut changed = user("user::1", "Ana Reyes");
        changed.birthdate = "1999-01-01".to_string();
        assert!(repo.update_user(&changed).await.unwrap());

        let loaded = repo.get_user("user::1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Ana Reyes");
        // Birthdate is never rewritten by an update
        assert_eq!(loaded.birthdate, "2012-04-01");

        assert!(repo.delete_user("user::1").await.unwrap());
        assert!(!repo.delete_user("user::1").await.unwrap());
        assert!(!repo.update_user(&changed).await.unwrap());
    }
}
