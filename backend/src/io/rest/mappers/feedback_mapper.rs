use crate::domain::commands::feedback::{SubmitFeedbackCommand, SubmitFeedbackResult};
use crate::domain::models::to_storage_timestamp;
use shared::{Feedback as SharedFeedback, SubmitFeedbackRequest, SubmitFeedbackResponse};

pub struct FeedbackMapper;

impl FeedbackMapper {
    pub fn to_submit_command(visit_id: String, dto: SubmitFeedbackRequest) -> SubmitFeedbackCommand {
        SubmitFeedbackCommand {
            visit_id,
            rating: dto.rating,
            comments: dto.comments,
            facilities_used: dto.facilities_used,
        }
    }

    pub fn to_submit_dto(result: SubmitFeedbackResult) -> SubmitFeedbackResponse {
        let feedback = result.feedback;
        SubmitFeedbackResponse {
            feedback: SharedFeedback {
                created_at: to_storage_timestamp(&feedback.created_at),
                id: feedback.id,
                visit_id: feedback.visit_id,
                rating: feedback.rating,
                comments: feedback.comments,
            },
            facilities_recorded: result.facilities.iter().map(|f| f.to_string()).collect(),
            success_message: "Thank you for your feedback!".to_string(),
        }
    }
}
