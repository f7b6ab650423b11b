use plantsafe::inference::InferenceService;
use plantsafe::labels::LabelTable;
use plantsafe::users::store::CredentialStore;
use plantsafe::{config, model, server};

use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::sqlite::SqlitePoolOptions;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. Init
    model::loader::init_ort()?;

    // 2. Load Config
    let config_content = fs::read_to_string("config.yaml")?;
    let config: config::AppConfig = serde_yaml::from_str(&config_content)?;

    // 3. Model and label table load before anything binds. A failure in
    // either is fatal; no request can be served without them.
    let session = model::loader::load_model(&config.model.path)?;
    let classifier = Arc::new(model::classifier::OnnxClassifier::new(session)?);
    let labels = Arc::new(LabelTable::load(&config.model.labels_path)?);
    info!(
        model = %config.model.path,
        classes = labels.len(),
        "model ready"
    );

    // 4. Database pool + migrations
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let inference = InferenceService::new(
        classifier,
        labels,
        Duration::from_millis(config.model.timeout_ms),
    );
    let users = CredentialStore::new(pool, config.auth.bcrypt_cost)?;

    // 5. Create Router
    let metrics_handle = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(server::types::AppState { inference, users });
    let app = server::routes::create_router(state, metrics_handle);

    // 6. Bind & Serve
    let listener =
        TcpListener::bind(format!("{}:{}", config.server.host, config.server.port)).await?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
