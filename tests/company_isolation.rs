use std::collections::HashSet;

use anyhow::Result;
use aurora_tests::{POSTGRES_PORT, postgres_image, postgres_url};
use entity::employee;
use migration::{DocumentMigrator, Migrator, MigratorTrait};
use platform_db::{
    DatabaseSettings, DocumentStore, NewCompany, NewDocument, NewEmployee, NewReview, NewTask,
    connect, create_company_for_admin, create_document, create_employee, create_review,
    find_checklist, find_or_create_checklist, list_documents, list_employees, list_reviews,
    resolve_company_id, set_task_completed,
};
use serde_json::json;
use testcontainers::clients::Cli;

fn company(name: &str) -> NewCompany {
    NewCompany {
        name: name.into(),
        country: "NG".into(),
        treasury_safe_address: None,
        settings: None,
    }
}

#[tokio::test]
async fn companies_never_see_each_others_records() -> Result<()> {
    let docker = Cli::default();
    let container = docker.run(postgres_image());
    let url = postgres_url(container.get_host_port_ipv4(POSTGRES_PORT));

    let mut settings = DatabaseSettings::new(url);
    settings.max_connections = Some(8);
    let db = connect(&settings).await?;
    Migrator::up(&db, None).await?;
    let documents = DocumentStore::connect(&settings).await?;
    DocumentMigrator::up(documents.connection(), None).await?;

    let acme = create_company_for_admin(&db, "owner@acme.test", company("Acme"))
        .await?
        .company;
    let globex = create_company_for_admin(&db, "owner@globex.test", company("Globex"))
        .await?
        .company;
    assert_eq!(
        resolve_company_id(&db, "OWNER@acme.test").await?,
        Some(acme.id)
    );

    create_employee(
        &db,
        acme.id,
        NewEmployee {
            wallet_address: None,
            status: employee::Status::Active,
            metadata: json!({"name": "Ada"}),
        },
    )
    .await?;
    assert_eq!(list_employees(&db, acme.id).await?.len(), 1);
    assert!(list_employees(&db, globex.id).await?.is_empty());

    // Both companies use the same external employee id.
    let checklist = find_or_create_checklist(
        &documents,
        acme.id,
        "emp-1",
        vec![NewTask {
            name: "Laptop".into(),
            completed: false,
        }],
    )
    .await?;
    assert!(find_checklist(&documents, globex.id, "emp-1").await?.is_none());
    let task_id = checklist.tasks.0[0].id;
    assert!(
        set_task_completed(&documents, globex.id, checklist.id, task_id, Some(true))
            .await
            .is_err()
    );

    create_document(
        &documents,
        acme.id,
        NewDocument {
            employee_id: "emp-1".into(),
            doc_type: "CONTRACT".into(),
            content_id: Some("bafyacme".into()),
            signed_at: None,
        },
    )
    .await?;
    create_review(
        &documents,
        globex.id,
        NewReview {
            employee_id: "emp-1".into(),
            cycle: "2025-H1".into(),
            ratings: json!({}),
        },
    )
    .await?;

    assert_eq!(list_documents(&documents, acme.id, "emp-1").await?.len(), 1);
    assert!(list_documents(&documents, globex.id, "emp-1").await?.is_empty());
    assert!(list_reviews(&documents, acme.id, "emp-1").await?.is_empty());
    assert_eq!(list_reviews(&documents, globex.id, "emp-1").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_checklist_creation_converges() -> Result<()> {
    let docker = Cli::default();
    let container = docker.run(postgres_image());
    let url = postgres_url(container.get_host_port_ipv4(POSTGRES_PORT));

    let mut settings = DatabaseSettings::new(url);
    settings.max_connections = Some(8);
    let db = connect(&settings).await?;
    Migrator::up(&db, None).await?;
    let documents = DocumentStore::connect(&settings).await?;
    DocumentMigrator::up(documents.connection(), None).await?;

    let acme = create_company_for_admin(&db, "owner@acme.test", company("Acme"))
        .await?
        .company;

    let mut handles = Vec::new();
    for _ in 0..6 {
        let store = documents.clone();
        handles.push(tokio::spawn(async move {
            find_or_create_checklist(&store, acme.id, "emp-race", Vec::new()).await
        }));
    }
    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await??.id);
    }
    assert_eq!(ids.len(), 1);
    Ok(())
}

#[tokio::test]
async fn long_labels_are_stored_verbatim() -> Result<()> {
    let docker = Cli::default();
    let container = docker.run(postgres_image());
    let url = postgres_url(container.get_host_port_ipv4(POSTGRES_PORT));

    let settings = DatabaseSettings::new(url);
    let db = connect(&settings).await?;
    Migrator::up(&db, None).await?;
    let documents = DocumentStore::connect(&settings).await?;
    DocumentMigrator::up(documents.connection(), None).await?;

    let long_name = "Acme Holdings ".repeat(40);
    let acme = create_company_for_admin(
        &db,
        "owner@acme.test",
        NewCompany {
            name: long_name.clone(),
            country: "Federal Republic of ".repeat(10),
            treasury_safe_address: Some(format!("0x{}", "ab".repeat(100))),
            settings: None,
        },
    )
    .await?
    .company;
    assert_eq!(acme.name, long_name);

    let employee = create_employee(
        &db,
        acme.id,
        NewEmployee {
            wallet_address: Some(format!("0x{}", "cd".repeat(100))),
            status: employee::Status::Onboarding,
            metadata: json!({}),
        },
    )
    .await?;
    assert_eq!(employee.wallet_address.map(|w| w.len()), Some(202));

    let employee_id = format!("hris-{}", "7".repeat(200));
    let cycle = format!("{} annual calibration", "2025 H1 engineering ".repeat(5));
    let review = create_review(
        &documents,
        acme.id,
        NewReview {
            employee_id: employee_id.clone(),
            cycle: cycle.clone(),
            ratings: json!({"delivery": 4}),
        },
    )
    .await?;
    assert_eq!(review.cycle, cycle);

    create_document(
        &documents,
        acme.id,
        NewDocument {
            employee_id: employee_id.clone(),
            doc_type: "Mutual non-disclosure agreement ".repeat(6),
            content_id: Some(format!("bafy{}", "x".repeat(300))),
            signed_at: None,
        },
    )
    .await?;
    find_or_create_checklist(&documents, acme.id, &employee_id, Vec::new()).await?;

    assert_eq!(list_reviews(&documents, acme.id, &employee_id).await?.len(), 1);
    assert_eq!(list_documents(&documents, acme.id, &employee_id).await?.len(), 1);
    assert!(find_checklist(&documents, acme.id, &employee_id).await?.is_some());
    Ok(())
}
