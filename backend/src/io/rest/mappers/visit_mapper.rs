use chrono::{DateTime, FixedOffset};

use crate::domain::clock::{format_time, SiteClock};
use crate::domain::commands::visit::{ActiveVisit as DomainActiveVisit, CheckInResult};
use crate::domain::models::Visit as DomainVisit;
use shared::{
    ActiveVisit as SharedActiveVisit, ActiveVisitsResponse, CheckInResponse, CheckOutResponse,
    Visit as SharedVisit,
};

/// Mapper from domain visits to shared DTOs. Instants are rendered in site time.
pub struct VisitMapper;

impl VisitMapper {
    fn site_rfc3339(clock: &SiteClock, instant: &DateTime<FixedOffset>) -> String {
        clock.to_site(instant).to_rfc3339()
    }

    pub fn to_dto(domain: DomainVisit, clock: &SiteClock) -> SharedVisit {
        SharedVisit {
            check_in_time: Self::site_rfc3339(clock, &domain.check_in_time),
            check_out_time: domain
                .check_out
                .as_ref()
                .map(|c| Self::site_rfc3339(clock, &c.time)),
            duration: domain.check_out.as_ref().map(|c| c.duration_hours),
            id: domain.id,
            user_id: domain.user_id,
        }
    }

    pub fn to_check_in_dto(result: CheckInResult, clock: &SiteClock) -> CheckInResponse {
        let at = format_time(&clock.to_site(&result.visit.check_in_time));
        CheckInResponse {
            success_message: format!("{} checked in at {}", result.user_name, at),
            visit: Self::to_dto(result.visit, clock),
        }
    }

    pub fn to_check_out_dto(domain: DomainVisit, clock: &SiteClock) -> CheckOutResponse {
        let hours = domain
            .check_out
            .as_ref()
            .map(|c| c.duration_hours)
            .unwrap_or_default();
        let formatted_duration = format_duration(hours);
        CheckOutResponse {
            success_message: format!("Checked out after {}", formatted_duration),
            formatted_duration,
            visit: Self::to_dto(domain, clock),
        }
    }

    pub fn to_active_visits_dto(active: Vec<DomainActiveVisit>, clock: &SiteClock) -> ActiveVisitsResponse {
        ActiveVisitsResponse {
            visits: active
                .into_iter()
                .map(|a| {
                    let check_in = clock.to_site(&a.visit.check_in_time);
                    SharedActiveVisit {
                        visit_id: a.visit.id,
                        user_id: a.visit.user_id,
                        user_name: a.user_name,
                        check_in_time: check_in.to_rfc3339(),
                        formatted_check_in: format_time(&check_in),
                    }
                })
                .collect(),
        }
    }
}

/// e.g. `2.50 hrs`
pub fn format_duration(hours: f64) -> String {
    format!("{:.2} hrs", hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_visit_times_render_in_site_offset() {
        let instant = DateTime::parse_from_rfc3339("2024-01-01T01:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = SiteClock::fixed(FixedOffset::east_opt(8 * 3600).unwrap(), instant);

        // As read back from storage, in UTC
        let mut visit = DomainVisit::open("user::1", instant.fixed_offset());
        visit.check_out = Some(visit.check_out_at((instant + Duration::minutes(90)).fixed_offset()));

        let dto = VisitMapper::to_check_out_dto(visit, &clock);
        assert_eq!(dto.visit.check_in_time, "2024-01-01T09:00:00+08:00");
        assert_eq!(dto.visit.check_out_time.as_deref(), Some("2024-01-01T10:30:00+08:00"));
        assert_eq!(dto.visit.duration, Some(1.5));
        assert_eq!(dto.formatted_duration, "1.50 hrs");
    }
}
