use axum::extract::State;
use platform_api::{ApiResult, Reply};
use platform_db::{ConnectionState, count_companies, count_users};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::{auth::AdminSession, http::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationalHealth {
    ok: bool,
    postgres: bool,
    companies_count: Option<u64>,
    users_count: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHealth {
    ok: bool,
    status: ConnectionState,
    ping_ok: bool,
}

#[instrument(name = "health.postgres", skip_all)]
pub async fn postgres(
    State(state): State<AppState>,
    _session: AdminSession,
) -> ApiResult<Reply<RelationalHealth>> {
    let counts = async {
        let companies = count_companies(&state.db).await?;
        let users = count_users(&state.db).await?;
        Ok::<_, platform_db::DbError>((companies, users))
    }
    .await;

    let health = match counts {
        Ok((companies, users)) => RelationalHealth {
            ok: true,
            postgres: true,
            companies_count: Some(companies),
            users_count: Some(users),
        },
        Err(err) => {
            warn!(error = %err, "relational store health check failed");
            RelationalHealth {
                ok: false,
                postgres: false,
                companies_count: None,
                users_count: None,
            }
        }
    };
    Ok(Reply::ok(health, "Postgres health check"))
}

#[instrument(name = "health.documents", skip_all)]
pub async fn documents(
    State(state): State<AppState>,
    _session: AdminSession,
) -> ApiResult<Reply<DocumentHealth>> {
    let status = state.documents.state();
    let ping_ok = state.documents.ping().await;
    let health = DocumentHealth {
        ok: status == ConnectionState::Connected && ping_ok,
        status,
        ping_ok,
    };
    Ok(Reply::ok(health, "Document store health check"))
}
