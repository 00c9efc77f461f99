//! Inbound mail
//!
//! The receiving host posts every message it gets, the response tells it what to do next:
//! - `200`, the message is forwarded
//! - `422`, the message is rejected, bounce it with the error as reason
//! - `502` or `503`, the message could not be handled, retry later

use axum::Extension;
use axum::http::HeaderMap;
use axum_extra::headers::Authorization;
use axum_extra::headers::HeaderMapExt;
use axum_extra::headers::authorization::Bearer;
use serde::Deserialize;
use serde::Serialize;

use crate::api::Error;
use crate::api::Form;
use crate::api::Success;
use crate::gateway::Gateway;
use crate::gateway::GatewayError;
use crate::gateway::InboundMessage;
use crate::gateway::Outcome;
use crate::provider::Provider;

/// Message as posted by the receiving host
#[derive(Deserialize)]
pub struct InboundForm {
    /// Envelope sender
    pub from: String,

    /// Envelope recipient
    pub to: String,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub body: String,
}

/// Posted message, with the reject reason once set
struct PostedMessage {
    form: InboundForm,
    reject_reason: Option<String>,
}

impl InboundMessage for PostedMessage {
    fn from(&self) -> &str {
        &self.form.from
    }

    fn to(&self) -> &str {
        &self.form.to
    }

    fn subject(&self) -> &str {
        &self.form.subject
    }

    fn body(&self) -> &str {
        &self.form.body
    }

    fn set_reject(&mut self, reason: &str) {
        self.reject_reason = Some(reason.to_string());
    }
}

/// Compare tokens without stopping at the first differing byte
///
/// Only the length can be told apart by timing
fn token_matches(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0, |difference, (left, right)| difference | (left ^ right))
            == 0
}

/// Forwarded message
#[derive(Debug, Serialize)]
pub struct ForwardedResponse {
    status: &'static str,
    from: String,
    to: String,
}

/// Handle an inbound message
///
/// Only the receiving host knows the provider token, it is required as bearer token
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "from": "alice@gmail.com", "to": "bob+carol=example.com@doe.net", "subject": "Hi" }' \
///     http://localhost:6000/inbound
/// ```
pub async fn inbound<P: Provider>(
    Extension(gateway): Extension<Gateway<P>>,
    headers: HeaderMap,
    Form(form): Form<InboundForm>,
) -> Result<Success<ForwardedResponse>, Error> {
    let authorized = headers
        .typed_get::<Authorization<Bearer>>()
        .is_some_and(|authorization| token_matches(authorization.token(), gateway.token()));

    if !authorized {
        return Err(Error::forbidden("Invalid API token"));
    }

    tracing::debug!(r#"Inbound message from "{}" to "{}""#, form.from, form.to);

    let mut message = PostedMessage {
        form,
        reject_reason: None,
    };

    match gateway.handle(&mut message).await {
        Ok(Outcome::Forwarded { from, to }) => Ok(Success::ok(ForwardedResponse {
            status: "forwarded",
            from,
            to,
        })),
        Ok(Outcome::Rejected(reason)) => Err(Error::unprocessable_entity(
            message.reject_reason.unwrap_or_else(|| reason.to_string()),
        )),
        Err(err @ GatewayError::Provider(_)) => {
            Err(Error::service_unavailable("Provider unavailable").with_description(err))
        }
        Err(err @ GatewayError::Delivery { .. }) => {
            Err(Error::bad_gateway("Delivery failed").with_description(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches("verysecret", "verysecret"));
        assert!(!token_matches("verysecreT", "verysecret"));
        assert!(!token_matches("Verysecret", "verysecret"));
        assert!(!token_matches("verysecre", "verysecret"));
        assert!(!token_matches("", "verysecret"));
    }
}
