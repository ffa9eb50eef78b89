use axum::{
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
};
use chrono::{DateTime, FixedOffset};
use entity::hr_document;
use platform_api::{ApiError, ApiResult, Reply, required};
use platform_db::{NewDocument, create_document, list_documents};
use platform_storage::UploadFile;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{company_scope, db_error};
use crate::{auth::AdminSession, extract::JsonBody, http::AppState};

const UPLOAD_FAILED: &str = "Failed to upload document to content storage";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    employee_id: Option<String>,
    #[serde(rename = "type")]
    doc_type: Option<String>,
    #[serde(rename = "ipfs_hash")]
    content_id: Option<String>,
    #[serde(rename = "signed_at")]
    signed_at: Option<String>,
}

#[instrument(name = "aurora.documents.create", skip_all, fields(admin = %session.admin_id))]
pub async fn create(
    State(state): State<AppState>,
    session: AdminSession,
    JsonBody(body): JsonBody<CreateDocument>,
) -> ApiResult<Reply<hr_document::Model>> {
    let company_id = company_scope(&state, &session).await?;
    let (Some(employee_id), Some(doc_type)) = (required(body.employee_id), required(body.doc_type))
    else {
        return Err(ApiError::validation("employeeId and type are required"));
    };
    let signed_at = required(body.signed_at)
        .map(|raw| parse_timestamp(&raw))
        .transpose()?;

    let input = NewDocument {
        employee_id,
        doc_type,
        content_id: required(body.content_id),
        signed_at,
    };
    let document = create_document(&state.documents, company_id, input)
        .await
        .map_err(db_error)?;
    Ok(Reply::created(document, "HR document saved"))
}

#[derive(Default)]
struct UploadForm {
    employee_id: Option<String>,
    doc_type: Option<String>,
    file: Option<UploadFile>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::validation(err.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "employeeId" => form.employee_id = Some(text(field).await?),
                "type" => form.doc_type = Some(text(field).await?),
                "file" => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes: Bytes = field
                        .bytes()
                        .await
                        .map_err(|err| ApiError::validation(err.body_text()))?;
                    form.file = Some(UploadFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

async fn text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|err| ApiError::validation(err.body_text()))
}

#[instrument(name = "aurora.documents.upload", skip_all, fields(admin = %session.admin_id))]
pub async fn upload(
    State(state): State<AppState>,
    session: AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Reply<hr_document::Model>> {
    let company_id = company_scope(&state, &session).await?;
    let form = match multipart {
        Ok(multipart) => UploadForm::read(multipart).await?,
        Err(_) => UploadForm::default(),
    };
    let (Some(employee_id), Some(doc_type), Some(file)) = (
        required(form.employee_id),
        required(form.doc_type),
        form.file,
    ) else {
        return Err(ApiError::validation(
            "employeeId, type and file are required",
        ));
    };

    let size = file.bytes.len();
    let content_id = state
        .storage
        .upload(file)
        .await
        .map_err(|err| ApiError::upstream(UPLOAD_FAILED, err))?;
    info!(%company_id, cid = %content_id, size, "document uploaded to content storage");

    let input = NewDocument {
        employee_id,
        doc_type,
        content_id: Some(content_id.into_string()),
        signed_at: None,
    };
    let document = create_document(&state.documents, company_id, input)
        .await
        .map_err(db_error)?;
    Ok(Reply::created(document, "HR document uploaded and saved"))
}

#[instrument(name = "aurora.documents.list", skip_all, fields(admin = %session.admin_id))]
pub async fn list(
    State(state): State<AppState>,
    session: AdminSession,
    Path(employee_id): Path<String>,
) -> ApiResult<Reply<Vec<hr_document::Model>>> {
    let company_id = company_scope(&state, &session).await?;
    let documents = list_documents(&state.documents, company_id, &employee_id)
        .await
        .map_err(db_error)?;
    Ok(Reply::ok(documents, "HR documents fetched"))
}

fn parse_timestamp(raw: &str) -> ApiResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|_| ApiError::validation("signed_at must be an RFC 3339 timestamp"))
}
