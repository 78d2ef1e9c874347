//! Serve command - static files plus the search API

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use color_eyre::eyre::{Result, WrapErr};
use docsearch_client::SearchClient;
use tokio::net::TcpListener;

use super::load_config;
use crate::server::{ServerState, create_router};

/// Run the serve command.
///
/// The search worker starts after the configured delay, or as soon as the
/// first search request arrives.
pub async fn run(config_path: &Path, port: Option<u16>, root: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(root) = root {
        config.server.root = root.display().to_string();
    }

    let root = PathBuf::from(&config.server.root);
    tracing::info!(
        root = %root.display(),
        data_url = %config.search.data_url,
        "Starting search server"
    );

    let client = SearchClient::from_config(&config, &root);
    let ready = client.initialize(config.search.init_delay());
    tokio::spawn(async move {
        match ready.await {
            Ok(_) => tracing::info!("Search index loaded"),
            Err(e) => tracing::error!("Search index unavailable: {e}"),
        }
    });

    let state = Arc::new(ServerState {
        client,
        priority_limit: config.search.priority_limit,
    });
    let app = create_router(&root, state);
    let addr = config.bind_addr();

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Serving {} at http://{addr}", root.display());
    println!("  Search API: http://{addr}/api/search?q=...");
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app).await.wrap_err("Server error")?;

    Ok(())
}
