use chrono::Utc;
use entity::{company, employee, user};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{DbPool, DbResult};

#[derive(Clone, Debug)]
pub struct NewCompany {
    pub name: String,
    pub country: String,
    pub treasury_safe_address: Option<String>,
    pub settings: Option<Json>,
}

/// The company created during onboarding and the user now pointing at it.
#[derive(Clone, Debug, Serialize)]
pub struct CompanyOnboarding {
    pub company: company::Model,
    pub user: user::Model,
}

#[derive(Clone, Debug)]
pub struct NewEmployee {
    pub wallet_address: Option<String>,
    pub status: employee::Status,
    pub metadata: Json,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> DbResult<Option<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

/// Company the admin with `email` belongs to, if the mapping exists.
pub async fn resolve_company_id(db: &DbPool, email: &str) -> DbResult<Option<Uuid>> {
    Ok(find_user_by_email(db, email)
        .await?
        .and_then(|user| user.company_id))
}

/// Create a company and bind the admin's user record to it.
///
/// A missing user is created as `OWNER`; an existing one is re-pointed. Both
/// writes commit together.
pub async fn create_company_for_admin(
    db: &DbPool,
    admin_email: &str,
    input: NewCompany,
) -> DbResult<CompanyOnboarding> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let company = company::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        country: Set(input.country),
        treasury_safe_address: Set(input.treasury_safe_address),
        settings: Set(input.settings),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let user = match find_user_by_email(&txn, admin_email).await? {
        Some(existing) => {
            let mut active: user::ActiveModel = existing.into();
            active.company_id = Set(Some(company.id));
            active.updated_at = Set(now.into());
            active.update(&txn).await?
        }
        None => {
            user::ActiveModel {
                id: Set(Uuid::new_v4()),
                email: Set(normalize_email(admin_email)),
                role: Set(user::Role::Owner),
                company_id: Set(Some(company.id)),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;
    info!(company_id = %company.id, user_id = %user.id, "company onboarded");
    Ok(CompanyOnboarding { company, user })
}

pub async fn create_employee(
    db: &DbPool,
    company_id: Uuid,
    input: NewEmployee,
) -> DbResult<employee::Model> {
    let now = Utc::now();
    let model = employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        wallet_address: Set(input.wallet_address),
        status: Set(input.status),
        metadata: Set(input.metadata),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    info!(%company_id, employee_id = %model.id, "employee created");
    Ok(model)
}

pub async fn list_employees(db: &DbPool, company_id: Uuid) -> DbResult<Vec<employee::Model>> {
    Ok(employee::Entity::find()
        .filter(employee::Column::CompanyId.eq(company_id))
        .order_by_asc(employee::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn count_companies(db: &DbPool) -> DbResult<u64> {
    Ok(company::Entity::find().count(db).await?)
}

pub async fn count_users(db: &DbPool) -> DbResult<u64> {
    Ok(user::Entity::find().count(db).await?)
}
