use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use clinic_db::schema::initialize_database;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let database_url = std::env::var("DATABASE_URL").wrap_err("DATABASE_URL must be set")?;

    info!("Connecting to database...");
    let db_pool = clinic_db::create_pool(&database_url, 1).await?;

    info!("Initializing database schema...");
    initialize_database(&db_pool).await?;
    info!("Database schema initialized successfully.");

    Ok(())
}
