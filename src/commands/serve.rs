//! Serve command - Starts the admin web server.

use std::sync::Arc;

use tera::Tera;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    tracing::info!(?config, "Starting server...");

    // Initialize database (applies pending migrations)
    let db = Database::connect(&config).await?;
    let db = Arc::new(db);

    let templates = Tera::new(&config.template_glob())?;
    tracing::info!(
        count = templates.get_template_names().count(),
        dir = %config.template_dir,
        "View templates loaded"
    );

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| AppError::internal(format!("Cannot create {}: {}", config.upload_dir, e)))?;

    let app_state = AppState::from_config(db, Arc::new(templates), &config);

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
