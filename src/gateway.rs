//! Mail gateway
//!
//! Entry point for every inbound message: route it, then either reject it or hand it to the
//! delivery backend.

use thiserror::Error;

use crate::delivery::Delivery;
use crate::provider;
use crate::provider::Provider;
use crate::routing::RejectReason;
use crate::routing::RoutingDecision;
use crate::routing::decide;

/// Inbound message as handed over by the receiving host
pub trait InboundMessage {
    /// Envelope sender
    fn from(&self) -> &str;

    /// Envelope recipient
    fn to(&self) -> &str;

    /// Subject line, empty when absent
    fn subject(&self) -> &str;

    /// Plain text body, empty when absent
    fn body(&self) -> &str;

    /// Tell the host the message is refused, with a human readable reason
    fn set_reject(&mut self, reason: &str);
}

/// What happened with a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Handed to the delivery backend
    Forwarded {
        /// The alias the message was sent as
        from: String,

        /// The destination the message was sent to
        to: String,
    },

    /// Refused, [`InboundMessage::set_reject`] was called
    Rejected(RejectReason),
}

/// Operational failures, the message is neither forwarded nor rejected
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider could not answer the routing lookups
    #[error("Provider failure: {0}")]
    Provider(#[from] provider::Error),

    /// The delivery backend did not accept the message
    #[error("Delivery of the message from {from} to {to} failed")]
    Delivery {
        /// The alias the message was sent as
        from: String,

        /// The destination the message was sent to
        to: String,
    },
}

/// Gateway with everything needed to handle a message
#[derive(Clone)]
pub struct Gateway<P: Provider> {
    provider: P,
    token: String,
    account_id: String,
    delivery: Delivery,
}

impl<P: Provider> Gateway<P> {
    /// Create a gateway, the provider is bound to `token`
    pub fn new(provider: &P, token: &str, account_id: &str, delivery: Delivery) -> Self {
        Self {
            provider: provider.with_token(token),
            token: token.to_string(),
            account_id: account_id.to_string(),
            delivery,
        }
    }

    /// The provider, bound to the configured token
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The configured provider token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The configured account
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Handle a single message
    ///
    /// # Errors
    ///
    /// Will return `Err` when the provider could not be consulted or the delivery failed, the
    /// message is not rejected in that case
    pub async fn handle<M>(&self, message: &mut M) -> Result<Outcome, GatewayError>
    where
        M: InboundMessage + Send,
    {
        let decision = decide(
            &self.provider,
            &self.account_id,
            message.from(),
            message.to(),
        )
        .await
        .inspect_err(|err| tracing::error!("Unable to route message: {err}"))?;

        match decision {
            RoutingDecision::Reject { reason } => {
                message.set_reject(&reason.to_string());

                Ok(Outcome::Rejected(reason))
            }
            RoutingDecision::Forward { from, to, .. } => {
                let delivered = self
                    .delivery
                    .send(&from, &to, message.subject(), message.body())
                    .await;

                if !delivered {
                    tracing::error!(
                        "{} did not deliver the message from {from} to {to}",
                        self.delivery.name()
                    );

                    return Err(GatewayError::Delivery { from, to });
                }

                tracing::info!("Forwarded message from {from} to {to}");

                Ok(Outcome::Forwarded { from, to })
            }
        }
    }
}
