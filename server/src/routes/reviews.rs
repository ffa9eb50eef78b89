use axum::extract::{Path, State};
use entity::performance_review;
use platform_api::{ApiError, ApiResult, Reply, required};
use platform_db::{NewReview, create_review, list_reviews};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::{company_scope, db_error};
use crate::{
    auth::AdminSession,
    extract::{JsonBody, optional_object},
    http::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    employee_id: Option<String>,
    cycle: Option<String>,
    ratings: Option<Value>,
}

#[instrument(name = "aurora.reviews.create", skip_all, fields(admin = %session.admin_id))]
pub async fn create(
    State(state): State<AppState>,
    session: AdminSession,
    JsonBody(body): JsonBody<CreateReview>,
) -> ApiResult<Reply<performance_review::Model>> {
    let company_id = company_scope(&state, &session).await?;
    let (Some(employee_id), Some(cycle)) = (required(body.employee_id), required(body.cycle))
    else {
        return Err(ApiError::validation("employeeId and cycle are required"));
    };
    let ratings = optional_object(body.ratings, "ratings")?.unwrap_or_default();

    let input = NewReview {
        employee_id,
        cycle,
        ratings: Value::Object(ratings),
    };
    let review = create_review(&state.documents, company_id, input)
        .await
        .map_err(db_error)?;
    Ok(Reply::created(review, "Performance review saved"))
}

#[instrument(name = "aurora.reviews.list", skip_all, fields(admin = %session.admin_id))]
pub async fn list(
    State(state): State<AppState>,
    session: AdminSession,
    Path(employee_id): Path<String>,
) -> ApiResult<Reply<Vec<performance_review::Model>>> {
    let company_id = company_scope(&state, &session).await?;
    let reviews = list_reviews(&state.documents, company_id, &employee_id)
        .await
        .map_err(db_error)?;
    Ok(Reply::ok(reviews, "Performance reviews fetched"))
}
