//! Utility functions for the API

use crate::api::Error;
use crate::provider::Provider;
use crate::provider::Rule;
use crate::provider::Zone;
use crate::provider::all_rules;
use crate::provider::all_zones;

/// Fetch a zone by its ID or its name
pub async fn fetch_zone<P: Provider>(provider: &P, zone: &str) -> Result<Zone, Error> {
    all_zones(provider)
        .await?
        .into_iter()
        .find(|candidate| candidate.id == zone || candidate.name.eq_ignore_ascii_case(zone))
        .map_or_else(|| Err(Error::not_found("Zone not found")), Ok)
}

/// Fetch a rule of a zone by its tag
pub async fn fetch_rule<P: Provider>(provider: &P, zone: &Zone, tag: &str) -> Result<Rule, Error> {
    all_rules(provider, &zone.id)
        .await?
        .into_iter()
        .find(|rule| rule.tag.as_deref() == Some(tag))
        .map_or_else(|| Err(Error::not_found("Alias not found")), Ok)
}
