//! Catalog store maintenance entry point.
//!
//! Loads configuration, prepares the database schema and reports the current
//! state of the catalog. Management front-ends consume the repository layer
//! directly.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_catalog::{config::AppConfig, db, repository::Repository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("library_catalog={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting catalog store v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = db::connect(&config.database).await?;
    tracing::info!("Connected to database");

    // Apply the schema
    db::init_schema(&pool).await?;
    tracing::info!("Schema ready");

    // Report the catalog state
    let repository = Repository::new(pool);
    let counts = repository.counts().await?;
    tracing::info!(
        genres = counts.genres,
        languages = counts.languages,
        authors = counts.authors,
        books = counts.books,
        book_instances = counts.book_instances,
        "Catalog state"
    );

    Ok(())
}
