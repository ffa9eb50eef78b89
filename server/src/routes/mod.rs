//! AuroraHR HTTP routes.
//!
//! Every handler follows the same shape: authenticate the admin, resolve the
//! admin's company, validate the few required fields, do one store call, and
//! answer with the envelope.

mod company;
mod documents;
mod employees;
mod health;
mod onboarding;
mod reviews;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use platform_api::{ApiError, ApiResult};
use platform_db::{DbError, resolve_company_id};
use uuid::Uuid;

use crate::{auth::AdminSession, http::AppState};

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/health/postgres", get(health::postgres))
        .route("/health/mongo", get(health::documents))
        .route("/aurora/company", post(company::create))
        .route("/aurora/employees", post(employees::create))
        .route("/aurora/employees/list", get(employees::list))
        .route("/aurora/onboarding", post(onboarding::fetch_or_create))
        .route("/aurora/onboarding/{id}", get(onboarding::fetch))
        .route("/aurora/onboarding/{id}/tasks", post(onboarding::add_task))
        .route(
            "/aurora/onboarding/{id}/tasks/{task_id}",
            patch(onboarding::toggle_task),
        )
        .route("/aurora/documents", post(documents::create))
        .route(
            "/aurora/documents/upload",
            post(documents::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/aurora/documents/{employee_id}", get(documents::list))
        .route("/aurora/reviews", post(reviews::create))
        .route("/aurora/reviews/{employee_id}", get(reviews::list))
}

/// Company the session's admin is mapped to.
async fn company_scope(state: &AppState, session: &AdminSession) -> ApiResult<Uuid> {
    resolve_company_id(&state.db, &session.email)
        .await
        .map_err(db_error)?
        .ok_or(ApiError::NotConfigured)
}

fn db_error(err: DbError) -> ApiError {
    match err {
        DbError::ChecklistNotFound => ApiError::not_found("Checklist not found"),
        DbError::TaskNotFound => ApiError::not_found("Task not found"),
        other => ApiError::internal(other.into()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use migration::{DocumentMigrator, Migrator, MigratorTrait};
    use platform_db::{DatabaseSettings, DocumentStore, connect};
    use platform_storage::{
        ContentId, ContentStore, SharedContentStore, StorageError, StorageSettings, UploadFile,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        auth::{AuthConfig, issue_token},
        config::AppConfig,
        http::{AppState, build_router},
    };

    /// Content store that answers with a fixed identifier, or fails.
    pub struct FakeStore {
        cid: Option<&'static str>,
    }

    impl FakeStore {
        pub fn returning(cid: &'static str) -> Arc<Self> {
            Arc::new(Self { cid: Some(cid) })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self { cid: None })
        }
    }

    #[async_trait]
    impl ContentStore for FakeStore {
        async fn upload(&self, _file: UploadFile) -> Result<ContentId, StorageError> {
            match self.cid {
                Some(cid) => ContentId::parse(cid),
                None => Err(StorageError::Rejected {
                    status: 503,
                    body: "network unreachable".into(),
                }),
            }
        }
    }

    pub struct TestApp {
        pub router: Router,
        pub state: AppState,
    }

    impl TestApp {
        pub async fn new() -> Self {
            Self::with_store(FakeStore::returning("bafytestcid")).await
        }

        pub async fn with_store(store: Arc<dyn ContentStore>) -> Self {
            let memory = DatabaseSettings::new("sqlite::memory:");
            let db = connect(&memory).await.unwrap();
            Migrator::up(&db, None).await.unwrap();
            let documents = DocumentStore::connect(&memory).await.unwrap();
            DocumentMigrator::up(documents.connection(), None)
                .await
                .unwrap();

            let config = AppConfig {
                database: memory.clone(),
                documents: memory,
                auth_secret: "route-test-secret".into(),
                session_ttl_minutes: 5,
                cors_allowed_origins: vec!["http://localhost:3000".into()],
                storage: StorageSettings::new("http://127.0.0.1:9"),
                max_upload_bytes: 1024 * 1024,
            };
            let state = AppState {
                db,
                documents,
                storage: SharedContentStore::ready(store),
                auth: Arc::new(AuthConfig {
                    jwt_secret: config.auth_secret.clone(),
                    session_ttl_minutes: config.session_ttl_minutes,
                }),
                config: Arc::new(config),
            };
            Self {
                router: build_router(state.clone()),
                state,
            }
        }

        pub fn token(&self, email: &str) -> String {
            issue_token("admin", email, None, &self.state.auth).unwrap()
        }

        /// Create a company for `email` and return its session token and id.
        pub async fn onboard(&self, email: &str, company: &str) -> (String, Uuid) {
            let token = self.token(email);
            let (status, body) = self
                .post_json(
                    Some(&token),
                    "/aurora/company",
                    json!({"name": company, "country": "NG"}),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            let id = body["result"]["company"]["id"].as_str().unwrap();
            (token, Uuid::parse_str(id).unwrap())
        }

        pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        pub async fn get(&self, token: Option<&str>, uri: &str) -> (StatusCode, Value) {
            let request = authorized(Request::get(uri), token)
                .body(Body::empty())
                .unwrap();
            self.send(request).await
        }

        pub async fn post_json(
            &self,
            token: Option<&str>,
            uri: &str,
            body: Value,
        ) -> (StatusCode, Value) {
            self.json_request("POST", token, uri, body).await
        }

        pub async fn patch_json(
            &self,
            token: Option<&str>,
            uri: &str,
            body: Value,
        ) -> (StatusCode, Value) {
            self.json_request("PATCH", token, uri, body).await
        }

        async fn json_request(
            &self,
            method: &str,
            token: Option<&str>,
            uri: &str,
            body: Value,
        ) -> (StatusCode, Value) {
            let request = authorized(Request::builder().method(method).uri(uri), token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }
    }

    fn authorized(
        builder: axum::http::request::Builder,
        token: Option<&str>,
    ) -> axum::http::request::Builder {
        match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }
}
