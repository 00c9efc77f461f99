//! Zones API endpoints

use crate::provider::Provider;
use crate::provider::Zone;
use crate::provider::all_zones;

use super::CurrentProvider;
use super::Error;
use super::Success;

/// List all zones
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/zones
/// ```
pub async fn list<P: Provider>(provider: CurrentProvider<P>) -> Result<Success<Vec<Zone>>, Error> {
    let zones = all_zones(&*provider).await?;

    Ok(Success::ok(zones))
}
