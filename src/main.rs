#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::routing::post;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::router;
use crate::config::Config;
use crate::gateway::Gateway;
use crate::provider::Cloudflare;
use crate::provider::Provider;

mod address;
mod aliases;
mod api;
mod config;
mod delivery;
mod gateway;
mod graceful_shutdown;
mod inbound;
mod pagination;
mod provider;
mod routing;

const DEFAULT_RUST_LOG: &str = "forwardly=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;
    let app = setup_app(&config)?;

    let listener = TcpListener::bind(config.address).await?;
    tracing::info!("Listening on {}", config.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Provider client
/// - Delivery backend
pub fn setup_app(config: &Config) -> Result<Router> {
    let provider = Cloudflare::new(&config.provider)?;
    let delivery = delivery::setup(&config.delivery, config.provider.timeout)?;

    let gateway = Gateway::new(
        &provider,
        &config.provider.api_token,
        &config.provider.account_id,
        delivery,
    );

    Ok(create_router(gateway))
}

/// Create the router for Forwardly
pub(crate) fn create_router<P: Provider>(gateway: Gateway<P>) -> Router {
    Router::new()
        .nest("/api", router::<P>())
        .route("/inbound", post(inbound::inbound::<P>))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(gateway))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
