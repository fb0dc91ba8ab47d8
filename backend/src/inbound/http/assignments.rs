//! Submission handler.
//!
//! ```text
//! POST /api/v1/assignments/{id}/submissions {"fileReference":"essays/s0042.pdf"}
//! ```

use actix_web::{HttpResponse, post, web};

use super::ApiResult;
use super::dto::{SubmissionDto, SubmissionRequest};
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{AssignmentId, Error, UserId};

/// Record one submission per student and assignment. Callers submit as
/// themselves unless an administrator names the student.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/submissions",
    params(("id" = i64, Path, description = "Assignment id")),
    request_body = SubmissionRequest,
    responses(
        (status = 201, description = "Recorded", body = SubmissionDto),
        (status = 403, description = "Not enrolled or not permitted", body = Error),
        (status = 404, description = "No such assignment", body = Error),
        (status = 409, description = "Already submitted", body = Error)
    ),
    tags = ["assignments"],
    operation_id = "submitAssignment"
)]
#[post("/assignments/{id}/submissions")]
pub async fn submit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<SubmissionRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let SubmissionRequest {
        student_id,
        file_reference,
    } = payload.into_inner();
    let student = student_id.map_or(caller.subject(), UserId::new);
    let submission = state
        .enrollments
        .submit_assignment(
            &caller,
            AssignmentId::new(path.into_inner()),
            student,
            file_reference,
        )
        .await?;
    Ok(HttpResponse::Created().json(SubmissionDto::from(submission)))
}
