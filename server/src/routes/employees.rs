use axum::extract::State;
use entity::employee;
use platform_api::{ApiError, ApiResult, Reply, required};
use platform_db::{NewEmployee, create_employee, list_employees};
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
pub struct CreateEmployee {
    status: Option<String>,
    wallet_address: Option<String>,
    name: Option<String>,
    metadata: Option<Value>,
}

#[instrument(name = "aurora.employees.create", skip_all, fields(admin = %session.admin_id))]
pub async fn create(
    State(state): State<AppState>,
    session: AdminSession,
    JsonBody(body): JsonBody<CreateEmployee>,
) -> ApiResult<Reply<employee::Model>> {
    let company_id = company_scope(&state, &session).await?;

    let status = required(body.status).ok_or_else(|| ApiError::validation("status is required"))?;
    let status = employee::Status::parse(&status).ok_or_else(|| {
        ApiError::validation("status must be one of ACTIVE, INACTIVE, ONBOARDING")
    })?;

    let mut metadata = optional_object(body.metadata, "metadata")?.unwrap_or_default();
    if let Some(name) = required(body.name) {
        metadata.insert("name".into(), Value::String(name));
    }

    let input = NewEmployee {
        wallet_address: required(body.wallet_address),
        status,
        metadata: Value::Object(metadata),
    };
    let employee = create_employee(&state.db, company_id, input)
        .await
        .map_err(db_error)?;
    Ok(Reply::created(
        employee,
        "AuroraHR employee created successfully",
    ))
}

#[instrument(name = "aurora.employees.list", skip_all, fields(admin = %session.admin_id))]
pub async fn list(
    State(state): State<AppState>,
    session: AdminSession,
) -> ApiResult<Reply<Vec<employee::Model>>> {
    let company_id = company_scope(&state, &session).await?;
    let employees = list_employees(&state.db, company_id)
        .await
        .map_err(db_error)?;
    Ok(Reply::ok(
        employees,
        "AuroraHR employees list fetched successfully",
    ))
}
