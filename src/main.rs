//! NoteCheck server binary

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notecheck::{
    classifier::{Classifier, OnnxClassifier},
    config::Config,
    create_router,
    handlers::auth::AdminCredentials,
    pipeline::ScanPipeline,
    store::ScanStore,
    AppState,
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notecheck=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env();

    tracing::info!("NoteCheck server starting...");
    tracing::info!("History: {}", config.history_path().display());
    tracing::info!("Audit log: {}", config.audit_path().display());
    tracing::info!("Uploads: {}", config.upload_dir.display());

    std::fs::create_dir_all(&config.upload_dir)
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let store = Arc::new(
        ScanStore::open(config.history_path(), config.audit_path()).context("opening scan store")?,
    );

    // Server still runs without a model; scans answer 503
    let classifier: Option<Arc<dyn Classifier>> = match OnnxClassifier::load(&config.model_path) {
        Ok(model) => {
            tracing::info!("Classifier ready: {}", model.describe());
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::warn!("Classifier unavailable, scans will fail: {}", e);
            None
        }
    };

    let credentials = AdminCredentials::from_config(&config)
        .map_err(|e| anyhow::anyhow!("loading admin credentials: {:?}", e))?;

    let state = AppState {
        pipeline: ScanPipeline::new(store.clone(), classifier),
        store,
        credentials: Arc::new(credentials),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
