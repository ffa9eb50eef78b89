use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum OnboardingChecklist {
    Table,
    Id,
    CompanyId,
    EmployeeId,
    Tasks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum HrDocument {
    Table,
    Id,
    CompanyId,
    EmployeeId,
    DocType,
    ContentId,
    SignedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PerformanceReview {
    Table,
    Id,
    CompanyId,
    EmployeeId,
    Cycle,
    Ratings,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OnboardingChecklist::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OnboardingChecklist::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OnboardingChecklist::CompanyId).uuid().not_null())
                    .col(
                        ColumnDef::new(OnboardingChecklist::EmployeeId)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OnboardingChecklist::Tasks).json().not_null())
                    .col(
                        ColumnDef::new(OnboardingChecklist::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OnboardingChecklist::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Fetch-or-create relies on this to converge concurrent first calls.
        manager
            .create_index(
                Index::create()
                    .name("uq_onboarding_checklist_company_employee")
                    .table(OnboardingChecklist::Table)
                    .col(OnboardingChecklist::CompanyId)
                    .col(OnboardingChecklist::EmployeeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HrDocument::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(HrDocument::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(HrDocument::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(HrDocument::EmployeeId).text().not_null())
                    .col(ColumnDef::new(HrDocument::DocType).text().not_null())
                    .col(ColumnDef::new(HrDocument::ContentId).text())
                    .col(ColumnDef::new(HrDocument::SignedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(HrDocument::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HrDocument::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hr_document_company_employee")
                    .table(HrDocument::Table)
                    .col(HrDocument::CompanyId)
                    .col(HrDocument::EmployeeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PerformanceReview::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PerformanceReview::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PerformanceReview::CompanyId).uuid().not_null())
                    .col(
                        ColumnDef::new(PerformanceReview::EmployeeId)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PerformanceReview::Cycle).text().not_null())
                    .col(ColumnDef::new(PerformanceReview::Ratings).json().not_null())
                    .col(
                        ColumnDef::new(PerformanceReview::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PerformanceReview::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_performance_review_company_employee")
                    .table(PerformanceReview::Table)
                    .col(PerformanceReview::CompanyId)
                    .col(PerformanceReview::EmployeeId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            PerformanceReview::Table.into_iden(),
            HrDocument::Table.into_iden(),
            OnboardingChecklist::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
