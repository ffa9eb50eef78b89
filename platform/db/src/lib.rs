//! Store access for AuroraHR.
//!
//! The relational store holds companies, users and employees. The document
//! store holds loosely structured per-employee records. Every operation that
//! touches a per-company record takes the company id explicitly; callers
//! resolve it from the authenticated admin via [`resolve_company_id`].

mod documents;
mod relational;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;

pub use documents::{
    ConnectionState, DocumentStore, NewDocument, NewReview, NewTask, append_task,
    create_document, create_review, find_checklist, find_or_create_checklist, list_documents,
    list_reviews, set_task_completed,
};
pub use relational::{
    CompanyOnboarding, NewCompany, NewEmployee, count_companies, count_users,
    create_company_for_admin, create_employee, find_user_by_email, list_employees,
    normalize_email, resolve_company_id,
};

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing: set {0}")]
    MissingUrl(String),
    #[error("checklist not found")]
    ChecklistNotFound,
    #[error("task not found")]
    TaskNotFound,
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Connection settings for one store.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    /// Left unset for SQLite so the driver keeps a single shared connection.
    pub max_connections: Option<u32>,
    pub connect_timeout: Duration,
    pub sqlx_logging: bool,
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: None,
            connect_timeout: Duration::from_secs(8),
            sqlx_logging: false,
        }
    }

    /// Read the url from `key`, falling back to `fallback_key` when given.
    pub fn from_env(key: &str, fallback_key: Option<&str>) -> DbResult<Self> {
        let url = std::env::var(key)
            .ok()
            .or_else(|| fallback_key.and_then(|fallback| std::env::var(fallback).ok()))
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| DbError::MissingUrl(key.to_string()))?;
        let mut settings = Self::new(url);
        if let Some(max) = std::env::var(format!("{key}_MAX_CONNECTIONS"))
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            settings.max_connections = Some(max);
        }
        Ok(settings)
    }
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .connect_timeout(settings.connect_timeout)
        .sqlx_logging(settings.sqlx_logging);
    if let Some(max) = settings.max_connections {
        options.max_connections(max);
    }
    Ok(Database::connect(options).await?)
}
