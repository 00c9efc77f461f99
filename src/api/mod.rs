//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;

use crate::provider::Provider;

pub use current_provider::CurrentProvider;
pub use request::Form;
pub use request::PathParameters;
pub use response::Error;
pub use response::Success;

mod aliases;
mod current_provider;
mod destinations;
mod request;
mod response;
mod token;
mod utils;
mod zones;

/// Get the Axum router for all API routes
pub fn router<P: Provider>() -> Router {
    let aliases = Router::new()
        .route("/", get(aliases::list::<P>).post(aliases::create::<P>))
        .route("/preview", post(aliases::preview::<P>))
        .route(
            "/{tag}",
            patch(aliases::update::<P>).delete(aliases::delete::<P>),
        );

    Router::new()
        .route("/token/verify", post(token::verify::<P>))
        .route("/zones", get(zones::list::<P>))
        .route("/destinations", get(destinations::list::<P>))
        .nest("/zones/{zone}/aliases", aliases)
}
