use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use platform_api::ApiError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::AppState;

pub const SESSION_COOKIE: &str = "aurora_session";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// The authenticated dashboard admin. Extracting it rejects the request with
/// 401 when no valid session is presented.
#[derive(Clone, Debug)]
pub struct AdminSession {
    pub admin_id: String,
    pub email: String,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let claims = decode_token(&token, &state.auth).map_err(|err| {
            debug!(error = %err, "session token rejected");
            ApiError::Unauthorized
        })?;
        if claims.email.trim().is_empty() {
            return Err(ApiError::Unauthorized);
        }
        Ok(AdminSession {
            admin_id: claims.sub,
            email: claims.email,
        })
    }
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|text| text.strip_prefix("Bearer "))
        .map(|rest| rest.trim().to_string())
        .filter(|token| !token.is_empty());
    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

pub fn issue_token(
    admin_id: &str,
    email: &str,
    name: Option<&str>,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: admin_id.to_string(),
        email: email.to_string(),
        name: name.map(str::to_string),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}
