//! Registration and maintenance of makerspace users.
//!
//! Age is never stored; it is derived from the birthdate against the site's
//! current date whenever a user is shown.

use chrono::{Datelike, NaiveDate, Utc};
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::calculations::calculate_age;
use crate::domain::clock::{SiteClock, DATE_FORMAT};
use crate::domain::commands::user::{RegisterUserCommand, UpdateUserCommand, UserSearchHit};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{non_blank, User};
use crate::storage::{Connection, UserStorage, VisitStorage};

pub const DEFAULT_MIN_AGE: i32 = 5;
pub const MAX_NAME_LENGTH: usize = 100;
const EARLIEST_BIRTH_YEAR: i32 = 1920;

#[derive(Clone)]
pub struct UserService<C: Connection> {
    user_repository: C::UserRepository,
    visit_repository: C::VisitRepository,
    clock: SiteClock,
    min_age: i32,
}

impl<C: Connection> UserService<C> {
    pub fn new(connection: Arc<C>, clock: SiteClock, min_age: i32) -> Self {
        Self {
            user_repository: connection.create_user_repository(),
            visit_repository: connection.create_visit_repository(),
            clock,
            min_age,
        }
    }

    /// Register a new user after validating the form
    pub async fn register_user(&self, command: RegisterUserCommand) -> DomainResult<User> {
        info!(
            "Registering user: name={}, birthdate={}",
            command.name, command.birthdate
        );

        let name = validate_name(&command.name)?;
        let guardian_name = required("Guardian name", &command.guardian_name)?;
        let guardian_contact = required("Guardian contact", &command.guardian_contact)?;
        let birthdate = self.validate_birthdate(&command.birthdate)?;

        let user = User {
            id: User::generate_id(),
            name,
            birthdate,
            guardian_name,
            guardian_contact,
            emergency_contact: non_blank(command.emergency_contact),
            photo_url: non_blank(command.photo_url),
            created_at: self.clock.now().with_timezone(&Utc),
        };

        self.user_repository.store_user(&user.to_record()).await?;

        info!("Registered user: {} with ID: {}", user.name, user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> DomainResult<User> {
        info!("Getting user: {}", user_id);

        match self.user_repository.get_user(user_id).await? {
            Some(record) => Ok(User::try_from(record)?),
            None => {
                warn!("User not found: {}", user_id);
                Err(DomainError::not_found("User", user_id))
            }
        }
    }

    /// All users ordered by name
    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        let users = self
            .user_repository
            .list_users()
            .await?
            .into_iter()
            .map(User::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;

        info!("Found {} users", users.len());
        Ok(users)
    }

    /// Case-insensitive name search. A blank query matches nobody.
    pub async fn search_users(&self, query: &str) -> DomainResult<Vec<UserSearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.user_repository.search_users(query).await?;
        let checked_in: HashSet<String> = self
            .visit_repository
            .list_open_visits()
            .await?
            .into_iter()
            .map(|open| open.visit.user_id)
            .collect();

        let mut hits = Vec::with_capacity(records.len());
        for record in records {
            let user = User::try_from(record)?;
            let is_checked_in = checked_in.contains(&user.id);
            hits.push(UserSearchHit {
                user,
                is_checked_in,
            });
        }

        info!("Search for '{}' matched {} users", query, hits.len());
        Ok(hits)
    }

    /// Update editable fields. The birthdate cannot be changed.
    pub async fn update_user(
        &self,
        user_id: &str,
        command: UpdateUserCommand,
    ) -> DomainResult<User> {
        info!("Updating user: {}", user_id);

        let mut user = self.get_user(user_id).await?;

        if let Some(name) = command.name {
            user.name = validate_name(&name)?;
        }
        if let Some(guardian_name) = command.guardian_name {
            user.guardian_name = required("Guardian name", &guardian_name)?;
        }
        if let Some(guardian_contact) = command.guardian_contact {
            user.guardian_contact = required("Guardian contact", &guardian_contact)?;
        }
        if command.emergency_contact.is_some() {
            user.emergency_contact = non_blank(command.emergency_contact);
        }
        if command.photo_url.is_some() {
            user.photo_url = non_blank(command.photo_url);
        }

        if !self.user_repository.update_user(&user.to_record()).await? {
            return Err(DomainError::not_found("User", user_id));
        }

        info!("Updated user: {} with ID: {}", user.name, user.id);
        Ok(user)
    }

    /// Remove a user. Their past visits stay in the records.
    pub async fn delete_user(&self, user_id: &str) -> DomainResult<()> {
        info!("Deleting user: {}", user_id);

        if !self.user_repository.delete_user(user_id).await? {
            warn!("User not found: {}", user_id);
            return Err(DomainError::not_found("User", user_id));
        }

        info!("Deleted user: {}", user_id);
        Ok(())
    }

    /// Age of `user` as of the site's current date
    pub fn age_of(&self, user: &User) -> i32 {
        user.age_on(self.clock.today())
    }

    fn validate_birthdate(&self, value: &str) -> DomainResult<NaiveDate> {
        let birthdate = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
            DomainError::validation(format!(
                "Invalid birthdate '{}', expected YYYY-MM-DD",
                value
            ))
        })?;

        let today = self.clock.today();
        if birthdate.year() < EARLIEST_BIRTH_YEAR || birthdate > today {
            return Err(DomainError::validation(format!(
                "Birthdate must be between {}-01-01 and {}",
                EARLIEST_BIRTH_YEAR,
                today.format(DATE_FORMAT)
            )));
        }

        let age = calculate_age(birthdate, today);
        if age < self.min_age {
            return Err(DomainError::validation(format!(
                "User must be at least {} years old",
                self.min_age
            )));
        }

        Ok(birthdate)
    }
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn validate_name(value: &str) -> DomainResult<String> {
    let name = required("Name", value)?;
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "Name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use chrono::{DateTime, FixedOffset};

    fn clock() -> SiteClock {
        let instant = DateTime::parse_from_rfc3339("2024-06-15T02:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        SiteClock::fixed(FixedOffset::east_opt(8 * 3600).unwrap(), instant)
    }

    async fn create_test_service() -> (UserService<DbConnection>, DbConnection) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = UserService::new(Arc::new(db.clone()), clock(), DEFAULT_MIN_AGE);
        (service, db)
    }

    fn command(name: &str, birthdate: &str) -> RegisterUserCommand {
        RegisterUserCommand {
            name: name.to_string(),
            birthdate: birthdate.to_string(),
            guardian_name: "Maria Cruz".to_string(),
            guardian_contact: "0917 555 0101".to_string(),
            emergency_contact: Some("   ".to_string()),
            photo_url: None,
        }
    }

    fn assert_validation(result: DomainResult<User>, expected: &str) {
        match result {
            Err(DomainError::Validation(message)) => assert!(
                message.contains(expected),
                "unexpected message: {}",
                message
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_user() {
        let (service, _db) = create_test_service().await;

        let user = service
            .register_user(command("  Ana Cruz ", "2012-06-16"))
            .await
            .expect("Failed to register user");

        assert!(user.id.starts_with("user::"));
        assert_eq!(user.name, "Ana Cruz");
        assert_eq!(user.emergency_contact, None);
        assert_eq!(service.age_of(&user), 11);

        let loaded = service.get_user(&user.id).await.unwrap();
        assert_eq!(loaded, user);
    }

    #[tokio::test]
    async fn test_register_rejects_missing_fields() {
        let (service, _db) = create_test_service().await;

        assert_validation(service.register_user(command("  ", "2012-01-01")).await, "Name");

        let mut missing_guardian = command("Ana", "2012-01-01");
        missing_guardian.guardian_contact = String::new();
        assert_validation(
            service.register_user(missing_guardian).await,
            "Guardian contact is required",
        );

        let long_name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert_validation(service.register_user(command(&long_name, "2012-01-01")).await, "exceed");
    }

    #[tokio::test]
    async fn test_register_rejects_bad_birthdates() {
        let (service, _db) = create_test_service().await;

        assert_validation(service.register_user(command("Ana", "06/15/2012")).await, "YYYY-MM-DD");
        assert_validation(service.register_user(command("Ana", "1919-12-31")).await, "between");
        assert_validation(service.register_user(command("Ana", "2024-06-16")).await, "between");
    }

    #[tokio::test]
    async fn test_register_enforces_minimum_age() {
        let (service, _db) = create_test_service().await;

        // Turns five tomorrow in site time
        assert_validation(
            service.register_user(command("Ana", "2019-06-16")).await,
            "User must be at least 5 years old",
        );
        assert!(service.register_user(command("Ana", "2019-06-15")).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let (service, _db) = create_test_service().await;
        assert!(matches!(
            service.get_user("user::missing").await,
            Err(DomainError::NotFound { entity: "User", .. })
        ));
    }

    #[tokio::test]
    async fn test_search_flags_checked_in_users() {
        let (service, db) = create_test_service().await;
        let ana = service.register_user(command("Ana Cruz", "2012-01-01")).await.unwrap();
        service.register_user(command("Juan dela Cruz", "2010-01-01")).await.unwrap();
        service.register_user(command("Bea Santos", "2011-01-01")).await.unwrap();

        let open = crate::domain::models::Visit::open(&ana.id, clock().now());
        db.create_visit_repository()
            .create_visit(&open.to_record())
            .await
            .unwrap();

        let hits = service.search_users("cruz").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].user.name, "Ana Cruz");
        assert!(hits[0].is_checked_in);
        assert!(!hits[1].is_checked_in);

        assert!(service.search_users("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_user() {
        let (service, _db) = create_test_service().await;
        let mut registration = command("Ana Cruz", "2012-01-01");
        registration.photo_url = Some("https://example.org/ana.png".to_string());
        let user = service.register_user(registration).await.unwrap();

        let updated = service
            .update_user(
                &user.id,
                UpdateUserCommand {
                    name: Some("Ana Reyes".to_string()),
                    emergency_contact: Some("0918 000 1111".to_string()),
                    photo_url: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ana Reyes");
        assert_eq!(updated.guardian_name, "Maria Cruz");
        assert_eq!(updated.emergency_contact.as_deref(), Some("0918 000 1111"));
        assert_eq!(updated.photo_url, None);
        assert_eq!(updated.birthdate, user.birthdate);

        let blank_name = UpdateUserCommand {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert_validation(service.update_user(&user.id, blank_name).await, "Name");
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (service, _db) = create_test_service().await;
        let user = service.register_user(command("Ana Cruz", "2012-01-01")).await.unwrap();

        service.delete_user(&user.id).await.unwrap();
        assert!(service.list_users().await.unwrap().is_empty());
        assert!(matches!(
            service.delete_user(&user.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
