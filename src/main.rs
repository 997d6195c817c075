mod config;
mod db;
mod entities;
mod error;
mod importer;
mod models;
mod routes;
mod store;
mod validate;
mod view_model;

use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, importer::Importer, store::MovieStore, view_model::MovieList};

pub struct AppState {
    pub movies: Arc<MovieList>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movielog=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let mut http = reqwest::Client::builder().user_agent(config.user_agent.clone());
    if let Some(timeout) = config.import_timeout {
        http = http.timeout(timeout);
    }
    let http = http.build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = MovieStore::new(db);

    if config.seed_sample_movies {
        let seeded = store.seed_if_empty().await?;
        if seeded > 0 {
            tracing::info!(seeded, "seeded sample movies");
        }
    }

    let movies = Arc::new(MovieList::new(store, Importer::new(http)));
    if let Err(err) = movies.load().await {
        tracing::warn!(error = %err, "initial load failed, starting with an empty list");
    }

    let state = Arc::new(AppState { movies });

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
