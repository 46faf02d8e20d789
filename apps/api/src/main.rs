mod auth;
mod config;
mod db;
mod directory;
mod errors;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::directory::{InMemoryDirectory, PgDirectory, TalentDirectory};
use crate::matching::cache::{InMemoryMatchCache, MatchCache, RedisMatchCache};
use crate::matching::http_scorer::HttpMatchScorer;
use crate::matching::scorer::{KeywordMatchScorer, MatchScorer};
use crate::matching::workflow::{NonRecruiterPlacement, WorkflowEngine};
use crate::matching::MatchingPipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placement API v{}", env!("CARGO_PKG_VERSION"));

    let directory = build_directory(&config).await?;
    let cache = build_cache(&config).await?;
    let scorer = build_scorer(&config)?;
    info!(
        "Scorer initialized (backend: {}, timeout: {:?})",
        scorer.backend(),
        config.scorer_timeout
    );

    let engine = WorkflowEngine::new(config.selection_limit, Arc::new(NonRecruiterPlacement));
    info!("Selection limit: {}", engine.selection_limit());

    let pipeline = MatchingPipeline::new(directory, scorer, cache, engine)
        .with_scoring_timeout(config.scorer_timeout);

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_directory(config: &Config) -> Result<Arc<dyn TalentDirectory>> {
    if let Some(url) = &config.database_url {
        let pool = create_pool(url).await?;
        return Ok(Arc::new(PgDirectory::new(pool)));
    }

    match &config.directory_seed_path {
        Some(path) => Ok(Arc::new(InMemoryDirectory::from_seed_file(path)?)),
        None => {
            info!("No DATABASE_URL or DIRECTORY_SEED_PATH; directory starts empty");
            Ok(Arc::new(InMemoryDirectory::default()))
        }
    }
}

async fn build_cache(config: &Config) -> Result<Arc<dyn MatchCache>> {
    match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            Ok(Arc::new(RedisMatchCache::connect(&client).await?))
        }
        None => {
            info!("No REDIS_URL; match results held in memory");
            Ok(Arc::new(InMemoryMatchCache::new()))
        }
    }
}

fn build_scorer(config: &Config) -> Result<Arc<dyn MatchScorer>> {
    match &config.scorer_url {
        Some(url) => Ok(Arc::new(HttpMatchScorer::new(
            url.clone(),
            config.scorer_timeout,
        )?)),
        None => Ok(Arc::new(KeywordMatchScorer)),
    }
}
