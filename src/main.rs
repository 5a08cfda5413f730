use clinic_api::config::ApiConfig;
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Connect the configured storage backend
    let storage = clinic_api::connect_storage(&config).await?;

    // Start API server
    clinic_api::start_server(config, storage).await?;

    Ok(())
}
