//! Destinations API endpoints
//!
//! Destinations are managed with the provider, they can only be listed here

use crate::provider::DestinationAddress;
use crate::provider::Provider;
use crate::provider::all_destinations;

use super::CurrentProvider;
use super::Error;
use super::Success;

/// List all destinations of the configured account, verified or not
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/destinations
/// ```
pub async fn list<P: Provider>(
    provider: CurrentProvider<P>,
) -> Result<Success<Vec<DestinationAddress>>, Error> {
    let destinations = all_destinations(&*provider, provider.account_id()).await?;

    Ok(Success::ok(destinations))
}
