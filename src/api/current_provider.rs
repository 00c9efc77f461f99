//! Current provider
//!
//! Get a provider client bound to the token of the Authorization header

use std::ops::Deref;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::api::Error;
use crate::gateway::Gateway;
use crate::provider::Provider;

/// Provider client for a single request
///
/// A new client value is created for every request, nothing is shared between credentials
#[derive(Clone)]
pub struct CurrentProvider<P: Provider> {
    /// Provider bound to the token of the request
    provider: P,

    /// The token of the request
    token: String,

    /// The configured account
    account_id: String,
}

impl<P: Provider> CurrentProvider<P> {
    /// The token of the request
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The configured account
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl<P: Provider> Deref for CurrentProvider<P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        &self.provider
    }
}

impl<S, P> FromRequestParts<S> for CurrentProvider<P>
where
    S: Send + Sync,
    P: Provider,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| Error::forbidden("Missing API token"))?;

        let Extension(gateway) = parts
            .extract::<Extension<Gateway<P>>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get the gateway"))?;

        Ok(Self {
            provider: gateway.provider().with_token(bearer.token()),
            token: bearer.token().to_string(),
            account_id: gateway.account_id().to_string(),
        })
    }
}
