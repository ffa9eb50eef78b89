use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use chrono::{DateTime, FixedOffset, Utc};
use entity::{
    hr_document,
    onboarding_checklist::{self, ChecklistTask, ChecklistTasks},
    performance_review,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, SqlErr,
    prelude::Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{DatabaseSettings, DbError, DbPool, DbResult, connect};

/// Lifecycle of the document store connection as reported by health checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Connecting,
    Disconnecting,
    Unknown,
}

impl ConnectionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Disconnected,
            1 => Self::Connected,
            2 => Self::Connecting,
            3 => Self::Disconnecting,
            _ => Self::Unknown,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connected => 1,
            Self::Connecting => 2,
            Self::Disconnecting => 3,
            Self::Unknown => u8::MAX,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnecting => "disconnecting",
            Self::Unknown => "unknown",
        }
    }
}

/// Handle to the document store. Clones share the pool and the state.
#[derive(Clone, Debug)]
pub struct DocumentStore {
    conn: DbPool,
    state: Arc<AtomicU8>,
}

impl DocumentStore {
    pub async fn connect(settings: &DatabaseSettings) -> DbResult<Self> {
        let conn = connect(settings).await?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: DbPool) -> Self {
        Self {
            conn,
            state: Arc::new(AtomicU8::new(ConnectionState::Connected.as_u8())),
        }
    }

    pub fn connection(&self) -> &DbPool {
        &self.conn
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Lightweight round trip. Only `connect` and `close` move the lifecycle
    /// state; a ping never does.
    pub async fn ping(&self) -> bool {
        if self.state() != ConnectionState::Connected {
            return false;
        }
        match self.conn.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "document store ping failed");
                false
            }
        }
    }

    pub async fn close(self) -> DbResult<()> {
        self.set_state(ConnectionState::Disconnecting);
        let state = self.state.clone();
        let result = self.conn.close().await;
        state.store(ConnectionState::Disconnected.as_u8(), Ordering::Release);
        Ok(result?)
    }
}

#[derive(Clone, Debug)]
pub struct NewTask {
    pub name: String,
    pub completed: bool,
}

#[derive(Clone, Debug)]
pub struct NewDocument {
    pub employee_id: String,
    pub doc_type: String,
    pub content_id: Option<String>,
    pub signed_at: Option<DateTime<FixedOffset>>,
}

#[derive(Clone, Debug)]
pub struct NewReview {
    pub employee_id: String,
    pub cycle: String,
    pub ratings: Json,
}

pub async fn find_checklist(
    store: &DocumentStore,
    company_id: Uuid,
    employee_id: &str,
) -> DbResult<Option<onboarding_checklist::Model>> {
    Ok(onboarding_checklist::Entity::find()
        .filter(onboarding_checklist::Column::CompanyId.eq(company_id))
        .filter(onboarding_checklist::Column::EmployeeId.eq(employee_id))
        .one(store.connection())
        .await?)
}

/// Return the employee's checklist, creating it with `initial` tasks when
/// none exists yet. A concurrent creator wins through the unique index and
/// the loser reads back the winner's document.
pub async fn find_or_create_checklist(
    store: &DocumentStore,
    company_id: Uuid,
    employee_id: &str,
    initial: Vec<NewTask>,
) -> DbResult<onboarding_checklist::Model> {
    if let Some(existing) = find_checklist(store, company_id, employee_id).await? {
        return Ok(existing);
    }

    let now = Utc::now();
    let tasks = initial
        .into_iter()
        .map(|task| ChecklistTask::new(task.name, task.completed))
        .collect();
    let inserted = onboarding_checklist::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        employee_id: Set(employee_id.to_string()),
        tasks: Set(ChecklistTasks(tasks)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(store.connection())
    .await;

    match inserted {
        Ok(model) => {
            info!(%company_id, checklist_id = %model.id, "onboarding checklist created");
            Ok(model)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_checklist(store, company_id, employee_id)
                .await?
                .ok_or(DbError::Db(err))
        }
        Err(err) => Err(err.into()),
    }
}

async fn load_checklist(
    store: &DocumentStore,
    company_id: Uuid,
    checklist_id: Uuid,
) -> DbResult<onboarding_checklist::Model> {
    onboarding_checklist::Entity::find_by_id(checklist_id)
        .filter(onboarding_checklist::Column::CompanyId.eq(company_id))
        .one(store.connection())
        .await?
        .ok_or(DbError::ChecklistNotFound)
}

async fn save_tasks(
    store: &DocumentStore,
    checklist: onboarding_checklist::Model,
    tasks: ChecklistTasks,
) -> DbResult<onboarding_checklist::Model> {
    let mut active: onboarding_checklist::ActiveModel = checklist.into();
    active.tasks = Set(tasks);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(store.connection()).await?)
}

pub async fn append_task(
    store: &DocumentStore,
    company_id: Uuid,
    checklist_id: Uuid,
    name: String,
) -> DbResult<onboarding_checklist::Model> {
    let checklist = load_checklist(store, company_id, checklist_id).await?;
    let mut tasks = checklist.tasks.clone();
    tasks.push(ChecklistTask::new(name, false));
    save_tasks(store, checklist, tasks).await
}

/// Set a task's completion flag, or flip it when `completed` is `None`.
pub async fn set_task_completed(
    store: &DocumentStore,
    company_id: Uuid,
    checklist_id: Uuid,
    task_id: Uuid,
    completed: Option<bool>,
) -> DbResult<onboarding_checklist::Model> {
    let checklist = load_checklist(store, company_id, checklist_id).await?;
    let mut tasks = checklist.tasks.clone();
    let task = tasks.find_mut(task_id).ok_or(DbError::TaskNotFound)?;
    task.completed = completed.unwrap_or(!task.completed);
    save_tasks(store, checklist, tasks).await
}

pub async fn create_document(
    store: &DocumentStore,
    company_id: Uuid,
    input: NewDocument,
) -> DbResult<hr_document::Model> {
    let now = Utc::now();
    let model = hr_document::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        employee_id: Set(input.employee_id),
        doc_type: Set(input.doc_type),
        content_id: Set(input.content_id),
        signed_at: Set(input.signed_at),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(store.connection())
    .await?;
    info!(%company_id, document_id = %model.id, "hr document saved");
    Ok(model)
}

/// Newest first.
pub async fn list_documents(
    store: &DocumentStore,
    company_id: Uuid,
    employee_id: &str,
) -> DbResult<Vec<hr_document::Model>> {
    Ok(hr_document::Entity::find()
        .filter(hr_document::Column::CompanyId.eq(company_id))
        .filter(hr_document::Column::EmployeeId.eq(employee_id))
        .order_by_desc(hr_document::Column::CreatedAt)
        .all(store.connection())
        .await?)
}

pub async fn create_review(
    store: &DocumentStore,
    company_id: Uuid,
    input: NewReview,
) -> DbResult<performance_review::Model> {
    let now = Utc::now();
    let model = performance_review::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        employee_id: Set(input.employee_id),
        cycle: Set(input.cycle),
        ratings: Set(input.ratings),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(store.connection())
    .await?;
    info!(%company_id, review_id = %model.id, "performance review saved");
    Ok(model)
}

/// Newest first.
pub async fn list_reviews(
    store: &DocumentStore,
    company_id: Uuid,
    employee_id: &str,
) -> DbResult<Vec<performance_review::Model>> {
    Ok(performance_review::Entity::find()
        .filter(performance_review::Column::CompanyId.eq(company_id))
        .filter(performance_review::Column::EmployeeId.eq(employee_id))
        .order_by_desc(performance_review::Column::CreatedAt)
        .all(store.connection())
        .await?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support;
    use serde_json::json;

    fn task(name: &str) -> NewTask {
        NewTask {
            name: name.into(),
            completed: false,
        }
    }

    #[tokio::test]
    async fn fetch_or_create_is_idempotent() {
        let store = test_support::documents().await;
        let company = Uuid::new_v4();
        let first = find_or_create_checklist(&store, company, "emp-1", vec![task("Laptop")])
            .await
            .unwrap();
        let second = find_or_create_checklist(&store, company, "emp-1", vec![task("Other")])
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.tasks.len(), 1);
        assert_eq!(second.tasks.0[0].name, "Laptop");
    }

    #[tokio::test]
    async fn missing_checklist_reads_as_none() {
        let store = test_support::documents().await;
        let found = find_checklist(&store, Uuid::new_v4(), "emp-1").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn toggling_twice_restores_completion() {
        let store = test_support::documents().await;
        let company = Uuid::new_v4();
        let checklist = find_or_create_checklist(&store, company, "emp-1", vec![])
            .await
            .unwrap();
        let checklist = append_task(&store, company, checklist.id, "Badge".into())
            .await
            .unwrap();
        let task_id = checklist.tasks.0[0].id;
        assert!(!checklist.tasks.0[0].completed);

        let flipped = set_task_completed(&store, company, checklist.id, task_id, None)
            .await
            .unwrap();
        assert!(flipped.tasks.0[0].completed);
        let restored = set_task_completed(&store, company, checklist.id, task_id, None)
            .await
            .unwrap();
        assert!(!restored.tasks.0[0].completed);

        let explicit = set_task_completed(&store, company, checklist.id, task_id, Some(false))
            .await
            .unwrap();
        assert!(!explicit.tasks.0[0].completed);
    }

    #[tokio::test]
    async fn checklist_mutations_are_company_scoped() {
        let store = test_support::documents().await;
        let owner = Uuid::new_v4();
        let checklist = find_or_create_checklist(&store, owner, "emp-1", vec![task("Laptop")])
            .await
            .unwrap();
        let task_id = checklist.tasks.0[0].id;

        let intruder = Uuid::new_v4();
        assert!(matches!(
            append_task(&store, intruder, checklist.id, "Sneaky".into()).await,
            Err(DbError::ChecklistNotFound)
        ));
        assert!(matches!(
            set_task_completed(&store, intruder, checklist.id, task_id, Some(true)).await,
            Err(DbError::ChecklistNotFound)
        ));
        assert!(matches!(
            set_task_completed(&store, owner, checklist.id, Uuid::new_v4(), None).await,
            Err(DbError::TaskNotFound)
        ));
    }

    #[tokio::test]
    async fn documents_list_newest_first_within_company() {
        let store = test_support::documents().await;
        let acme = Uuid::new_v4();
        let globex = Uuid::new_v4();
        let doc = |doc_type: &str| NewDocument {
            employee_id: "emp-1".into(),
            doc_type: doc_type.into(),
            content_id: None,
            signed_at: None,
        };

        create_document(&store, acme, doc("contract")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        create_document(&store, globex, doc("foreign")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        create_document(&store, acme, doc("nda")).await.unwrap();

        let listed = list_documents(&store, acme, "emp-1").await.unwrap();
        let types: Vec<_> = listed.iter().map(|d| d.doc_type.as_str()).collect();
        assert_eq!(types, vec!["nda", "contract"]);
    }

    #[tokio::test]
    async fn duplicate_reviews_for_a_cycle_are_kept() {
        let store = test_support::documents().await;
        let company = Uuid::new_v4();
        for score in [3, 4] {
            create_review(
                &store,
                company,
                NewReview {
                    employee_id: "emp-1".into(),
                    cycle: "2025-H1".into(),
                    ratings: json!({"delivery": score}),
                },
            )
            .await
            .unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let reviews = list_reviews(&store, company, "emp-1").await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].ratings["delivery"], 4);
        assert!(list_reviews(&store, Uuid::new_v4(), "emp-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ping_reports_connected_until_closed() {
        let store = test_support::documents().await;
        assert_eq!(store.state(), ConnectionState::Connected);
        assert!(store.ping().await);

        let observer = store.clone();
        store.close().await.unwrap();
        assert_eq!(observer.state(), ConnectionState::Disconnected);
        assert!(!observer.ping().await);
        assert_eq!(observer.state().as_str(), "disconnected");
    }

    #[tokio::test]
    async fn failed_ping_leaves_lifecycle_state_alone() {
        let conn = connect(&DatabaseSettings::new("sqlite::memory:"))
            .await
            .unwrap();
        let store = DocumentStore::from_connection(conn.clone());
        conn.close().await.unwrap();

        assert!(!store.ping().await);
        assert_eq!(store.state(), ConnectionState::Connected);
        assert!(!store.ping().await);
        assert_eq!(store.state(), ConnectionState::Connected);
    }
}
