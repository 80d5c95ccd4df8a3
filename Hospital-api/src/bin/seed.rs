//! Seed a hospital database with its initial credential, admin user and
//! sample patients. Safe to run repeatedly.

use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hospital_domain::database::initialize_database_pool;
use hospital_domain::seed::{seed_database, SeedConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pool = initialize_database_pool().context("failed to open database")?;
    info!("Seeding {}", pool.describe());

    let report = seed_database(&pool, SeedConfig::from_env())
        .await
        .context("seeding failed")?;

    if report.is_noop() {
        println!("Database already seeded; nothing changed.");
    } else {
        println!(
            "Seeded: credential created: {}, admin created: {}, patients inserted: {}",
            report.credential_created, report.admin_created, report.patients_inserted
        );
    }

    Ok(())
}
