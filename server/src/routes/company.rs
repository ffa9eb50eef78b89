use axum::extract::State;
use platform_api::{ApiError, ApiResult, Reply, required};
use platform_db::{CompanyOnboarding, NewCompany, create_company_for_admin};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::db_error;
use crate::{auth::AdminSession, extract::JsonBody, extract::optional_object, http::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompany {
    name: Option<String>,
    country: Option<String>,
    treasury_safe_address: Option<String>,
    settings: Option<Value>,
}

#[instrument(name = "aurora.company.create", skip_all, fields(admin = %session.admin_id))]
pub async fn create(
    State(state): State<AppState>,
    session: AdminSession,
    JsonBody(body): JsonBody<CreateCompany>,
) -> ApiResult<Reply<CompanyOnboarding>> {
    let (Some(name), Some(country)) = (required(body.name), required(body.country)) else {
        return Err(ApiError::validation("name and country are required"));
    };
    let settings = optional_object(body.settings, "settings")?.map(Value::Object);

    let input = NewCompany {
        name,
        country,
        treasury_safe_address: required(body.treasury_safe_address),
        settings,
    };
    let onboarding = create_company_for_admin(&state.db, &session.email, input)
        .await
        .map_err(db_error)?;
    Ok(Reply::created(
        onboarding,
        "AuroraHR company created successfully",
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn creates_company_and_owner() {
        let app = TestApp::new().await;
        let token = app.token("Owner@Acme.test");
        let (status, body) = app
            .post_json(
                Some(&token),
                "/aurora/company",
                json!({
                    "name": "Acme",
                    "country": "NG",
                    "treasurySafeAddress": "0xsafe",
                    "settings": {"currency": "USDC"}
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "AuroraHR company created successfully");
        let company = &body["result"]["company"];
        let user = &body["result"]["user"];
        assert_eq!(company["name"], "Acme");
        assert_eq!(company["treasurySafeAddress"], "0xsafe");
        assert_eq!(company["settings"]["currency"], "USDC");
        assert_eq!(user["role"], "OWNER");
        assert_eq!(user["email"], "owner@acme.test");
        assert_eq!(user["companyId"], company["id"]);
    }

    #[tokio::test]
    async fn second_company_repoints_the_admin() {
        let app = TestApp::new().await;
        let (token, first) = app.onboard("owner@acme.test", "Acme").await;
        let (status, body) = app
            .post_json(
                Some(&token),
                "/aurora/company",
                json!({"name": "Acme Two", "country": "GH"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let second = body["result"]["company"]["id"].as_str().unwrap();
        assert_ne!(second, first.to_string());
        assert_eq!(body["result"]["user"]["companyId"], second);

        let (_, health) = app.get(Some(&token), "/health/postgres").await;
        assert_eq!(health["result"]["companiesCount"], 2);
        assert_eq!(health["result"]["usersCount"], 1);
    }

    #[tokio::test]
    async fn name_and_country_are_required() {
        let app = TestApp::new().await;
        let token = app.token("owner@acme.test");
        let (status, body) = app
            .post_json(Some(&token), "/aurora/company", json!({"name": "Acme", "country": " "}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"success": false, "result": null, "message": "name and country are required"})
        );
    }

    #[tokio::test]
    async fn settings_must_be_an_object() {
        let app = TestApp::new().await;
        let token = app.token("owner@acme.test");
        let (status, body) = app
            .post_json(
                Some(&token),
                "/aurora/company",
                json!({"name": "Acme", "country": "NG", "settings": "dark"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "settings must be a JSON object");
    }

    #[tokio::test]
    async fn rejects_missing_session() {
        let app = TestApp::new().await;
        let (status, _) = app
            .post_json(None, "/aurora/company", json!({"name": "Acme", "country": "NG"}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
