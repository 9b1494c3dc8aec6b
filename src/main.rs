use dotenvy::dotenv;
use geolab_bootstrap::{
    bootstrap,
    config::{self, database},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the bootstrap configuration
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    // 5. Run the bootstrap; any failure is fatal
    let report = bootstrap::run(&db, &app_config)
        .await
        .inspect_err(|e| error!("Bootstrap failed: {}", e))?;

    for key in &report.skipped_keys {
        info!("Kept existing metadata key '{}'", key);
    }
    info!("{}", report.summary());

    db.close().await?;
    Ok(())
}
