use chrono::NaiveDate;

use crate::domain::clock::DATE_FORMAT;
use crate::domain::commands::user::{RegisterUserCommand, UpdateUserCommand, UserSearchHit};
use crate::domain::models::{to_storage_timestamp, User as DomainUser};
use shared::{
    RegisterUserRequest, UpdateUserRequest, User as SharedUser, UserListResponse,
    UserSearchResponse, UserSearchResult,
};

/// Mapper between shared user DTOs and domain users.
///
/// Age is computed against `today` at mapping time.
pub struct UserMapper;

impl UserMapper {
    pub fn to_register_command(dto: RegisterUserRequest) -> RegisterUserCommand {
        RegisterUserCommand {
            name: dto.name,
            birthdate: dto.birthdate,
            guardian_name: dto.guardian_name,
            guardian_contact: dto.guardian_contact,
            emergency_contact: dto.emergency_contact,
            photo_url: dto.photo_url,
        }
    }

    pub fn to_update_command(dto: UpdateUserRequest) -> UpdateUserCommand {
        UpdateUserCommand {
            name: dto.name,
            guardian_name: dto.guardian_name,
            guardian_contact: dto.guardian_contact,
            emergency_contact: dto.emergency_contact,
            photo_url: dto.photo_url,
        }
    }

    pub fn to_dto(domain: DomainUser, today: NaiveDate) -> SharedUser {
        SharedUser {
            age: domain.age_on(today),
            birthdate: domain.birthdate.format(DATE_FORMAT).to_string(),
            created_at: to_storage_timestamp(&domain.created_at),
            id: domain.id,
            name: domain.name,
            guardian_name: domain.guardian_name,
            guardian_contact: domain.guardian_contact,
            emergency_contact: domain.emergency_contact,
            photo_url: domain.photo_url,
        }
    }

    pub fn to_user_list_dto(users: Vec<DomainUser>, today: NaiveDate) -> UserListResponse {
        UserListResponse {
            users: users.into_iter().map(|u| Self::to_dto(u, today)).collect(),
        }
    }

    pub fn to_search_dto(query: &str, hits: Vec<UserSearchHit>, today: NaiveDate) -> UserSearchResponse {
        UserSearchResponse {
            query: query.to_string(),
            results: hits
                .into_iter()
                .map(|hit| UserSearchResult {
                    user: Self::to_dto(hit.user, today),
                    is_checked_in: hit.is_checked_in,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_to_dto_derives_age() {
        let user = DomainUser {
            id: "user::1".to_string(),
            name: "Ana Cruz".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            guardian_name: "Maria Cruz".to_string(),
            guardian_contact: "0917 555 0101".to_string(),
            emergency_contact: None,
            photo_url: None,
            created_at: DateTime::parse_from_rfc3339("2024-01-01T01:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let dto = UserMapper::to_dto(user.clone(), NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
        assert_eq!(dto.age, 33);
        assert_eq!(dto.birthdate, "1990-06-15");
        assert_eq!(dto.created_at, "2024-01-01T01:00:00.000Z");

        let dto = UserMapper::to_dto(user, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(dto.age, 34);
    }
}
