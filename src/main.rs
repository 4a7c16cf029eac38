use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use strum::IntoEnumIterator;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use license_server::config::Config;
use license_server::db::{DbPool, backup_to, create_pool, init_audit_db, init_db, queries, restore_from};
use license_server::engine::{LicenseEngine, insert_new_license};
use license_server::handlers;
use license_server::keygen::KeyGenerator;
use license_server::models::{LicensePage, ListLicensesQuery, MAX_LIST_LIMIT, Plan};
use license_server::state::AppState;

type BoxResult<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "license-server")]
#[command(about = "Issue, activate and verify software license keys")]
struct Cli {
    /// Seed an empty database with one sample license per plan (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Print the license table and exit
    #[arg(long)]
    list: bool,

    /// Write an online backup of the license database to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with = "restore")]
    backup: Option<PathBuf>,

    /// Replace the license database with the backup at PATH and exit
    #[arg(long, value_name = "PATH")]
    restore: Option<PathBuf>,
}

/// Insert one sample license for every plan when the store is empty.
fn seed_dev_data(db: &DbPool, keygen: &KeyGenerator) -> BoxResult<()> {
    let conn = db.get()?;

    if queries::count_licenses(&conn)? > 0 {
        tracing::info!("Database already has licenses, skipping seed");
        return Ok(());
    }

    tracing::info!("============================================");
    tracing::info!("SEEDING DEV DATA");
    tracing::info!("============================================");

    println!();
    println!("--- SAMPLE LICENSES ---");
    for plan in Plan::iter() {
        let email = format!("{}@example.com", plan.as_ref());
        let license = insert_new_license(&conn, keygen, &email, plan, plan.max_activations())?;
        println!(
            "  {:<20} {}  (max {}, {})",
            plan.as_ref(),
            license.id,
            license.max_activations,
            plan.billing().as_ref()
        );
    }
    println!("--- END ---");
    println!();

    Ok(())
}

fn print_licenses(db: &DbPool) -> BoxResult<()> {
    let conn = db.get()?;
    let mut query = ListLicensesQuery::new(MAX_LIST_LIMIT, 0);

    println!(
        "{:<40} {:<28} {:<20} {:<12} {:>5}",
        "LICENSE", "EMAIL", "PLAN", "STATUS", "SEATS"
    );
    loop {
        let (limit, offset) = (query.limit(), query.offset());
        let (licenses, total) = queries::list_licenses_paginated(&conn, limit, offset)?;
        let page = LicensePage {
            licenses,
            total,
            limit,
            offset,
        };
        for row in &page.licenses {
            let l = &row.license;
            println!(
                "{:<40} {:<28} {:<20} {:<12} {:>2}/{:<2}",
                l.id,
                l.email,
                l.plan.as_ref(),
                l.status.as_ref(),
                row.activation_count,
                l.max_activations
            );
        }
        if page.licenses.is_empty() || !page.has_more() {
            println!("\n{} license(s)", page.total);
            return Ok(());
        }
        query = ListLicensesQuery::new(limit, offset + page.licenses.len() as i64);
    }
}

fn purge_verification_logs(audit: &DbPool, retention_days: i64) {
    let purged = audit
        .get()
        .map_err(Into::into)
        .and_then(|conn| queries::purge_old_verification_logs(&conn, retention_days));

    match purged {
        Ok(count) if count > 0 => {
            tracing::info!(
                "Purged {} verification log entries older than {} days",
                count,
                retention_days
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("Failed to purge old verification logs: {}", e);
        }
    }
}

#[tokio::main]
async fn main() -> BoxResult<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "license_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path)?;
    let audit_pool = create_pool(&config.audit_database_path)?;

    init_db(&*db_pool.get()?)?;
    init_audit_db(&*audit_pool.get()?)?;

    // One-shot maintenance commands
    if let Some(path) = &cli.backup {
        backup_to(&db_pool, path)?;
        println!("Backed up {} to {}", config.database_path, path.display());
        return Ok(());
    }
    if let Some(path) = &cli.restore {
        restore_from(&db_pool, path)?;
        println!("Restored {} from {}", config.database_path, path.display());
        return Ok(());
    }
    if cli.list {
        return print_licenses(&db_pool);
    }

    // 0 = keep forever
    if config.verification_log_enabled && config.verification_log_retention_days > 0 {
        purge_verification_logs(&audit_pool, config.verification_log_retention_days);
    }

    let engine = LicenseEngine::from_config(&config, db_pool.clone(), audit_pool);

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set LICENSE_SERVER_ENV=dev)");
        } else {
            seed_dev_data(&db_pool, engine.key_generator())?;
        }
    }

    match engine.admin().fingerprint() {
        Some(fp) => tracing::info!(fingerprint = %fp, "Admin secret configured"),
        None => {
            tracing::warn!("ADMIN_SECRET is not set: admin endpoints will reject every request")
        }
    }
    tracing::info!(policy = config.deactivate_auth.as_ref(), "Deactivation policy");

    let app = handlers::router(AppState::new(engine)).layer(TraceLayer::new_for_http());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("License server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
