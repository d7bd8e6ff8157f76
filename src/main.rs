use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use wallet_service::api::{create_router, AppState};
use wallet_service::config::Settings;
use wallet_service::observability::{init_logging, LogConfig, LogFormat};
use wallet_service::services::bootstrap;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Load configuration first (needed for log directives)
    let settings = Settings::new()?;

    let log_config = LogConfig {
        directives: settings.log_directives(),
        format: LogFormat::from(
            std::env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str(),
        ),
        include_target: true,
    };
    init_logging(&log_config);

    info!(service = %settings.app_name, version = %settings.app_version, "starting");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.database_url)
        .await?;
    info!("Database connection established");

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied");

    // The engine resolves counterparties by username at request time; a
    // missing system account or wallet is a configuration error the server
    // must not start with.
    if let Err(e) = bootstrap::verify_system_accounts(&pool).await {
        return Err(format!("system account verification failed: {e}").into());
    }
    info!("System accounts verified");

    let addr = settings.bind_addr();
    let state = AppState::new(pool, settings);
    let app = create_router(state);

    info!("Starting HTTP server on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
