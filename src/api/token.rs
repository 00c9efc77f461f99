//! Token API endpoints

use crate::provider::Provider;
use crate::provider::TokenStatus;
use crate::provider::handle_or_throw;

use super::CurrentProvider;
use super::Error;
use super::Success;

/// Check the token of the request with the provider
///
/// Request:
/// ```sh
/// curl -v -X POST -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/token/verify
/// ```
pub async fn verify<P: Provider>(
    provider: CurrentProvider<P>,
) -> Result<Success<TokenStatus>, Error> {
    let status = handle_or_throw(provider.verify_credential(provider.token()).await?)?;

    tracing::debug!("Token {} is {}", status.id, status.status);

    Ok(Success::ok(status))
}
