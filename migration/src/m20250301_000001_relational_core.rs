use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Company {
    Table,
    Id,
    Name,
    Country,
    TreasurySafeAddress,
    Settings,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AppUser {
    Table,
    Id,
    Email,
    Role,
    CompanyId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Employee {
    Table,
    Id,
    CompanyId,
    WalletAddress,
    Status,
    Metadata,
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
                    .table(Company::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Company::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Company::Name).text().not_null())
                    .col(ColumnDef::new(Company::Country).text().not_null())
                    .col(ColumnDef::new(Company::TreasurySafeAddress).text())
                    .col(ColumnDef::new(Company::Settings).json())
                    .col(
                        ColumnDef::new(Company::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Company::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AppUser::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AppUser::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(AppUser::Email)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AppUser::Role).string_len(16).not_null())
                    .col(ColumnDef::new(AppUser::CompanyId).uuid())
                    .col(
                        ColumnDef::new(AppUser::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppUser::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_user_company")
                            .from(AppUser::Table, AppUser::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Employee::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employee::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employee::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Employee::WalletAddress).text())
                    .col(ColumnDef::new(Employee::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Employee::Metadata).json().not_null())
                    .col(
                        ColumnDef::new(Employee::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employee::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_company")
                            .from(Employee::Table, Employee::CompanyId)
                            .to(Company::Table, Company::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employee_company")
                    .table(Employee::Table)
                    .col(Employee::CompanyId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employee::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppUser::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Company::Table).if_exists().to_owned())
            .await
    }
}
