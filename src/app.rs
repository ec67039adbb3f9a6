//! Process lifecycle: connect, bootstrap, serve, shut down.

use std::sync::Arc;

use anyhow::Context;
use bookstore_db::Database;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Registry with the `db` core module and every custom module.
fn build_registry(db: &Arc<Database>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(bookstore_db::create_module(db.clone()));
    modules::register_all(&mut registry, db);
    registry
}

/// Run the service until Ctrl+C or SIGTERM.
///
/// Any failure before the listener is up aborts startup.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let db = Arc::new(
        Database::connect(&settings.database)
            .await
            .context("failed to set up database")?,
    );
    let registry = build_registry(&db);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;

    db.apply_migrations(&registry.collect_migrations())
        .await
        .context("failed to bootstrap schema")?;

    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;

    let served = bookstore_http::start_server(&registry, &settings.server, shutdown_signal()).await;

    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;

    served?;
    tracing::info!("bookstore-app going off, graceful shutdown complete");
    Ok(())
}

/// Connect, apply the schema bootstrap, and close again.
pub async fn migrate(settings: Settings) -> anyhow::Result<()> {
    let db = Arc::new(
        Database::connect(&settings.database)
            .await
            .context("failed to set up database")?,
    );
    let registry = build_registry(&db);

    let applied = db.apply_migrations(&registry.collect_migrations()).await;
    db.close().await;
    applied.context("failed to bootstrap schema")?;

    tracing::info!("schema is up to date");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("ctrl+c signal received, preparing to shutdown"),
        _ = terminate => tracing::info!("SIGTERM received, preparing to shutdown"),
    }
}
