mod auth;
mod config;
mod extract;
mod http;
mod routes;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use migration::{DocumentMigrator, Migrator, MigratorTrait};
use platform_db::{DbPool, DocumentStore, connect};
use platform_obs::{ObsConfig, init_tracing, shutdown_tracing};
use platform_storage::SharedContentStore;
use tracing::info;

use crate::{
    auth::AuthConfig,
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "aurora-hr", version, about = "AuroraHR administration backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run migrations for both stores.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Mint a session token for an admin (local development).
    #[command(name = "token:issue")]
    IssueToken {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "dev-admin")]
        admin_id: String,
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration of each store.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::from_env())?;
    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load()?);
    let outcome = match cli.command {
        Command::Serve(cmd) => run_server(cmd, config).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up(&config).await,
            MigrateCommand::Down => migrate_down(&config).await,
        },
        Command::IssueToken {
            email,
            admin_id,
            name,
        } => issue_token(&config, &admin_id, &email, name.as_deref()),
    };
    shutdown_tracing();
    outcome
}

fn auth_config(config: &AppConfig) -> AuthConfig {
    AuthConfig {
        jwt_secret: config.auth_secret.clone(),
        session_ttl_minutes: config.session_ttl_minutes,
    }
}

fn issue_token(config: &AppConfig, admin_id: &str, email: &str, name: Option<&str>) -> Result<()> {
    let token = auth::issue_token(admin_id, email, name, &auth_config(config))?;
    println!("{token}");
    Ok(())
}

async fn setup_stores(config: &AppConfig) -> Result<(DbPool, DocumentStore)> {
    let db = connect(&config.database).await?;
    let documents = DocumentStore::connect(&config.documents).await?;
    Ok((db, documents))
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let (db, documents) = setup_stores(&config).await?;
    ensure_migrations(&db, &documents, cmd.allow_dirty).await?;
    let state = AppState {
        db,
        documents,
        storage: SharedContentStore::new(config.storage.clone()),
        auth: Arc::new(auth_config(&config)),
        config: config.clone(),
    };
    http::serve((&cmd).into(), state).await
}

async fn ensure_migrations(db: &DbPool, documents: &DocumentStore, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(db).await?.len()
        + DocumentMigrator::get_pending_migrations(documents.connection())
            .await?
            .len();
    if pending > 0 && !allow_dirty {
        return Err(anyhow!(
            "{pending} pending migrations detected; run `aurora-hr migrate up` or pass --allow-dirty"
        ));
    }
    Ok(())
}

async fn migrate_up(config: &AppConfig) -> Result<()> {
    let (db, documents) = setup_stores(config).await?;
    Migrator::up(&db, None).await?;
    DocumentMigrator::up(documents.connection(), None).await?;
    info!("migrations applied");
    Ok(())
}

async fn migrate_down(config: &AppConfig) -> Result<()> {
    let (db, documents) = setup_stores(config).await?;
    DocumentMigrator::down(documents.connection(), Some(1)).await?;
    Migrator::down(&db, Some(1)).await?;
    info!("most recent migrations rolled back");
    Ok(())
}
