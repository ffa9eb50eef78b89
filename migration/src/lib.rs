pub use sea_orm_migration::prelude::*;

mod m20250301_000001_relational_core;
mod m20250301_000002_document_collections;

/// Schema for the relational store (companies, users, employees).
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_relational_core::Migration)]
    }
}

/// Schema for the document store (checklists, HR documents, reviews).
///
/// Tracked separately because the document store may live on its own
/// connection.
pub struct DocumentMigrator;

#[async_trait::async_trait]
impl MigratorTrait for DocumentMigrator {
    fn migration_table_name() -> DynIden {
        Alias::new("seaql_document_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000002_document_collections::Migration)]
    }
}
