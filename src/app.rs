/*
 * Responsibility
 * - tracing + panic hook
 * - Config → stores → AuthService / policy table → AppState
 * - Router assembly; layer order (outermost first):
 *   security headers → CORS → http (request id, limits, trace) → access gateway → policy → handlers
 * - axum::serve() with graceful shutdown
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    repos::{
        MemoryPostRepo, MemoryUserRepo, PgPostRepo, PgUserRepo, post_repo::PostRepo,
        user_repo::UserRepo,
    },
    services::auth::{AuthService, TokenCodec, policy::blog_policy},
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,blog_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly so it gets noticed
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

async fn build_state(config: &Config) -> Result<AppState> {
    let (users, posts): (Arc<dyn UserRepo>, Arc<dyn PostRepo>) = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            (
                Arc::new(PgUserRepo::new(pool.clone())),
                Arc::new(PgPostRepo::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");
            (
                Arc::new(MemoryUserRepo::new()),
                Arc::new(MemoryPostRepo::new()),
            )
        }
    };

    Ok(state_from_parts(config, users, posts)?)
}

pub(crate) fn state_from_parts(
    config: &Config,
    users: Arc<dyn UserRepo>,
    posts: Arc<dyn PostRepo>,
) -> Result<AppState, crate::services::auth::AuthError> {
    // A bad secret is fatal here, never a per-request error.
    let codec = TokenCodec::new(config.jwt_secret.as_bytes(), config.access_token_ttl_seconds)?;
    let auth = Arc::new(AuthService::new(codec, users));

    let policy = Arc::new(blog_policy(api::v1::PREFIX));
    for rule in policy.rules() {
        tracing::debug!(
            method = ?rule.method,
            pattern = rule.pattern.as_str(),
            requirement = ?rule.requirement,
            "access rule"
        );
    }

    Ok(AppState::new(auth, policy, posts))
}

pub(crate) fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new().nest(api::v1::PREFIX, api::v1::routes());

    // policy first so that the access gateway wraps it
    let router = middleware::auth::policy::apply(router, state.clone());
    let router = middleware::auth::access::apply(router, state.clone());
    let router = router.with_state(state);

    let router = middleware::http::apply(router, config);
    let router = middleware::cors::apply(router, config);
    middleware::security_headers::apply(router)
}
