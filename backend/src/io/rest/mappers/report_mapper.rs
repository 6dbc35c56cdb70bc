use crate::domain::commands::report::DashboardQuery;
use shared::DashboardRequest;

pub struct ReportMapper;

impl ReportMapper {
    pub fn to_query(dto: DashboardRequest) -> DashboardQuery {
        DashboardQuery {
            start_date: dto.start_date,
            end_date: dto.end_date,
        }
    }
}
