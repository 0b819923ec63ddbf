use std::sync::Arc;

use safewalk::api;
use safewalk::config::Config;
use safewalk::loader::Datasets;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    // 1. Load places, streets and crimes; all three must arrive
    let datasets = Datasets::load(&config).await?;

    // 2. Build the graph once, shared read-only from here on
    let planner = datasets.into_planner();
    info!(
        nodes = planner.graph.node_count(),
        places = planner.places.len(),
        "Planner ready"
    );

    let app = api::router(Arc::new(planner));

    info!("API Server running on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
