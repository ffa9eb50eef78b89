use axum::{
    body::Bytes,
    extract::{Path, State},
};
use entity::onboarding_checklist;
use platform_api::{ApiError, ApiResult, Reply, required};
use platform_db::{NewTask, append_task, find_checklist, find_or_create_checklist, set_task_completed};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::{company_scope, db_error};
use crate::{
    auth::AdminSession,
    extract::{JsonBody, optional_json},
    http::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOrCreate {
    employee_id: Option<String>,
    #[serde(default)]
    tasks: Vec<InitialTask>,
}

#[derive(Debug, Deserialize)]
pub struct InitialTask {
    name: Option<String>,
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddTask {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleTask {
    completed: Option<bool>,
}

#[instrument(name = "aurora.onboarding.fetch_or_create", skip_all, fields(admin = %session.admin_id))]
pub async fn fetch_or_create(
    State(state): State<AppState>,
    session: AdminSession,
    JsonBody(body): JsonBody<FetchOrCreate>,
) -> ApiResult<Reply<onboarding_checklist::Model>> {
    let company_id = company_scope(&state, &session).await?;
    let employee_id =
        required(body.employee_id).ok_or_else(|| ApiError::validation("employeeId is required"))?;
    let initial = body
        .tasks
        .into_iter()
        .map(|task| {
            required(task.name)
                .map(|name| NewTask {
                    name,
                    completed: task.completed,
                })
                .ok_or_else(|| ApiError::validation("task name is required"))
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let checklist = find_or_create_checklist(&state.documents, company_id, &employee_id, initial)
        .await
        .map_err(db_error)?;
    Ok(Reply::created(
        checklist,
        "Onboarding checklist created or fetched",
    ))
}

#[instrument(name = "aurora.onboarding.fetch", skip_all, fields(admin = %session.admin_id))]
pub async fn fetch(
    State(state): State<AppState>,
    session: AdminSession,
    Path(employee_id): Path<String>,
) -> ApiResult<Reply<Option<onboarding_checklist::Model>>> {
    let company_id = company_scope(&state, &session).await?;
    let checklist = find_checklist(&state.documents, company_id, &employee_id)
        .await
        .map_err(db_error)?;
    Ok(Reply::ok(checklist, "Onboarding checklist fetched"))
}

#[instrument(name = "aurora.onboarding.add_task", skip_all, fields(admin = %session.admin_id, checklist = %checklist_id))]
pub async fn add_task(
    State(state): State<AppState>,
    session: AdminSession,
    Path(checklist_id): Path<String>,
    JsonBody(body): JsonBody<AddTask>,
) -> ApiResult<Reply<onboarding_checklist::Model>> {
    let name = required(body.name).ok_or_else(|| ApiError::validation("task name is required"))?;
    let company_id = company_scope(&state, &session).await?;
    let checklist_id = parse_id(&checklist_id, "Checklist not found")?;

    let checklist = append_task(&state.documents, company_id, checklist_id, name)
        .await
        .map_err(db_error)?;
    Ok(Reply::ok(checklist, "Task added"))
}

#[instrument(name = "aurora.onboarding.toggle_task", skip_all, fields(admin = %session.admin_id, checklist = %checklist_id, task = %task_id))]
pub async fn toggle_task(
    State(state): State<AppState>,
    session: AdminSession,
    Path((checklist_id, task_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Reply<onboarding_checklist::Model>> {
    let toggle: ToggleTask = optional_json(&body)?;
    let company_id = company_scope(&state, &session).await?;
    let checklist_id = parse_id(&checklist_id, "Checklist not found")?;
    let task_id = parse_id(&task_id, "Task not found")?;

    let checklist = set_task_completed(
        &state.documents,
        company_id,
        checklist_id,
        task_id,
        toggle.completed,
    )
    .await
    .map_err(db_error)?;
    Ok(Reply::ok(checklist, "Task updated"))
}

/// Identifiers that cannot exist read as missing records.
fn parse_id(raw: &str, missing: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found(missing))
}
