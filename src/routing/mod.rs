//! Routing decisions for inbound mail
//!
//! A message is checked in a fixed order, the first failing step rejects it:
//! 1. the sender must be a verified destination of the account
//! 2. the recipient must be a reply address
//! 3. the domain of the alias must be a zone
//! 4. the alias must have an enabled rule in that zone
//!
//! Provider failures are not rejects, they end the decision with an error.

use std::fmt;

use crate::provider::Provider;
use crate::provider::Result;
use crate::provider::Rule;
use crate::provider::all_rules;
use crate::provider::all_zones;
use crate::provider::verified_destinations;

use recipient::parse_reply_address;

mod recipient;

/// Why a message is rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The sender is not a verified destination
    SenderNotAllowed,

    /// The recipient is not a reply address
    InvalidRecipient,

    /// No zone for the domain of the alias
    ZoneNotFound,

    /// No enabled rule for the alias
    AliasNotFound,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RejectReason::SenderNotAllowed => write!(f, "Sender is not allowed to send replies"),
            RejectReason::InvalidRecipient => write!(f, "Recipient is not a valid reply address"),
            RejectReason::ZoneNotFound => write!(f, "Domain of the alias is not managed"),
            RejectReason::AliasNotFound => write!(f, "Alias does not exist"),
        }
    }
}

/// Outcome of routing a single message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Send the message on
    Forward {
        /// The alias to send as
        from: String,

        /// The decoded destination
        to: String,

        /// The rule of the alias
        rule: Rule,
    },

    /// Refuse the message
    Reject {
        /// The reason for refusal
        reason: RejectReason,
    },
}

impl RoutingDecision {
    fn reject(reason: RejectReason) -> Self {
        tracing::info!("Rejecting message: {reason}");

        Self::Reject { reason }
    }
}

/// Decide what happens with a message from `from` to `to`
///
/// Only reads provider state, nothing is changed
///
/// # Errors
///
/// Will return `Err` when any of the provider lookups fail, either by the provider refusing the
/// call or by not reaching it at all
pub async fn decide<P: Provider>(
    provider: &P,
    account_id: &str,
    from: &str,
    to: &str,
) -> Result<RoutingDecision> {
    let destinations = verified_destinations(provider, account_id).await?;

    let sender_allowed = destinations
        .iter()
        .any(|destination| destination.email.eq_ignore_ascii_case(from));

    if !sender_allowed {
        tracing::debug!(r#"Sender "{from}" is not a verified destination"#);

        return Ok(RoutingDecision::reject(RejectReason::SenderNotAllowed));
    }

    let Some(reply) = parse_reply_address(to) else {
        tracing::debug!(r#"Recipient "{to}" is not a reply address"#);

        return Ok(RoutingDecision::reject(RejectReason::InvalidRecipient));
    };

    let alias_domain = reply
        .alias
        .rsplit_once('@')
        .map_or("", |(_, domain)| domain);

    let zones = all_zones(provider).await?;
    let Some(zone) = zones
        .iter()
        .find(|zone| zone.name.eq_ignore_ascii_case(alias_domain))
    else {
        tracing::debug!(r#"No zone for "{alias_domain}""#);

        return Ok(RoutingDecision::reject(RejectReason::ZoneNotFound));
    };

    let rules = all_rules(provider, &zone.id).await?;
    let Some(rule) = rules
        .into_iter()
        .find(|rule| rule.enabled && rule.matches_address(&reply.alias))
    else {
        tracing::debug!(r#"No enabled rule for "{}" in zone {}"#, reply.alias, zone.id);

        return Ok(RoutingDecision::reject(RejectReason::AliasNotFound));
    };

    tracing::debug!(
        r#"Forwarding reply of "{from}" as "{}" to "{}""#,
        reply.alias,
        reply.destination
    );

    Ok(RoutingDecision::Forward {
        from: reply.alias,
        to: reply.destination,
        rule,
    })
}
