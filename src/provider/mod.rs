//! Provider gateway
//!
//! Typed access to the zones, destinations and routing rules of the email routing provider. Every
//! call returns an [`ApiResponse`], a success/failure value as reported by the provider; only
//! transport-level problems end up in the [`Error`] of the outer `Result`.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::pagination::fetch_all;

pub use cloudflare::Cloudflare;

mod cloudflare;
#[cfg(test)]
pub mod memory;

/// Provider errors
#[derive(Debug, Error)]
pub enum Error {
    /// A well-formed failure response of the provider
    #[error("{message}")]
    Business {
        /// Provider error code
        code: i64,

        /// Provider error message
        message: String,
    },

    /// The provider responded with an unexpected status code
    #[error("Provider responded with status {0}")]
    Status(u16),

    /// The request did not complete in time
    #[error("Provider request timed out: {0}")]
    Timeout(String),

    /// Network level failure
    #[error("Provider transport error: {0}")]
    Transport(String),

    /// The provider response could not be decoded
    #[error("Invalid provider response: {0}")]
    Decode(String),

    /// Mutation of a rule that was never persisted
    #[error("Rule has no tag")]
    MissingTag,
}

impl Error {
    /// Is this a business error reported by the provider itself?
    pub fn is_business(&self) -> bool {
        matches!(self, Error::Business { .. } | Error::MissingTag)
    }
}

/// Result type for all provider interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Error or message as reported by the provider
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ApiMessage {
    /// Numeric error code
    #[serde(default)]
    pub code: i64,

    /// Human readable message
    #[serde(default)]
    pub message: String,
}

/// Paging information of a list response
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResultInfo {
    /// The current page, starting at 1
    pub page: u32,

    /// Maximum number of items on a page
    pub per_page: u32,

    /// Number of items in this page
    pub count: u32,

    /// Number of items over all pages
    pub total_count: u32,
}

/// Response of the provider
///
/// The `success` discriminant of the wire format decides the variant, a result is never read
/// from a failed response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiResponse<T> {
    /// The call succeeded
    Success {
        /// The payload
        result: T,

        /// Paging information, only present for lists
        result_info: Option<ResultInfo>,
    },

    /// The call was refused by the provider
    Failure {
        /// All reported errors, the first one is the most relevant
        errors: Vec<ApiMessage>,
    },
}

impl<T> ApiResponse<T> {
    /// Successful response without paging information
    pub fn success(result: T) -> Self {
        Self::Success {
            result,
            result_info: None,
        }
    }

    /// Failed response with a single error
    pub fn failure<M>(code: i64, message: M) -> Self
    where
        M: ToString,
    {
        Self::Failure {
            errors: vec![ApiMessage {
                code,
                message: message.to_string(),
            }],
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Turn a list response into a [`Page`]
    ///
    /// A list without paging information is considered to be the only page
    pub fn into_page(self, requested_page: u32) -> ApiResponse<Page<T>> {
        match self {
            ApiResponse::Success {
                result,
                result_info,
            } => {
                let info = result_info.unwrap_or_else(|| {
                    let count = u32::try_from(result.len()).unwrap_or(u32::MAX);

                    ResultInfo {
                        page: requested_page,
                        per_page: count,
                        count,
                        total_count: count,
                    }
                });

                ApiResponse::Success {
                    result: Page {
                        items: result,
                        page: info.page,
                        per_page: info.per_page,
                        total_count: info.total_count,
                    },
                    result_info: Some(info),
                }
            }
            ApiResponse::Failure { errors } => ApiResponse::Failure { errors },
        }
    }
}

/// Wire format of every provider response
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    success: bool,

    result: Option<T>,

    #[serde(default)]
    result_info: Option<ResultInfo>,

    #[serde(default)]
    errors: Vec<ApiMessage>,
}

impl<T> Envelope<T> {
    /// Check the discriminant and build the matching response
    pub(crate) fn into_response(self) -> Result<ApiResponse<T>> {
        if self.success {
            let result = self
                .result
                .ok_or_else(|| Error::Decode("successful response without result".into()))?;

            Ok(ApiResponse::Success {
                result,
                result_info: self.result_info,
            })
        } else {
            Ok(ApiResponse::Failure {
                errors: self.errors,
            })
        }
    }
}

/// Unwrap the result of a successful response
///
/// A failed response becomes an [`Error::Business`] carrying the first reported error
pub fn handle_or_throw<T>(response: ApiResponse<T>) -> Result<T> {
    match response {
        ApiResponse::Success { result, .. } => Ok(result),
        ApiResponse::Failure { errors } => {
            let error = errors.into_iter().next().unwrap_or_else(|| ApiMessage {
                code: 0,
                message: "Unknown provider error".into(),
            });

            Err(Error::Business {
                code: error.code,
                message: error.message,
            })
        }
    }
}

/// One page of a list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in provider order
    pub items: Vec<T>,

    /// The page number, starting at 1
    pub page: u32,

    /// Maximum number of items on a page
    pub per_page: u32,

    /// Number of items over all pages
    pub total_count: u32,
}

impl<T> Page<T> {
    /// Is there no page after this one?
    pub fn is_last(&self) -> bool {
        if self.per_page == 0 || self.items.is_empty() {
            return true;
        }

        self.total_count.div_ceil(self.per_page) <= self.page
    }
}

/// Domain managed by the provider
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Zone {
    /// Provider identifier
    pub id: String,

    /// Domain name, like `example.com`
    pub name: String,

    /// Zone status, like `active`
    #[serde(default)]
    pub status: Option<String>,
}

/// Mailbox that can receive forwarded mail
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DestinationAddress {
    /// Provider identifier
    #[serde(alias = "tag")]
    pub id: String,

    /// The email address
    pub email: String,

    /// When the owner of the mailbox verified it, absent when not (yet) verified
    #[serde(default)]
    pub verified: Option<DateTime<Utc>>,
}

impl DestinationAddress {
    /// Is the destination verified with the provider?
    pub fn is_verified(&self) -> bool {
        self.verified.is_some()
    }
}

/// Type of a rule matcher
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
    /// Match one exact address
    Literal,

    /// Match everything (catch-all)
    All,

    /// Anything this crate does not know about
    #[serde(other)]
    Unknown,
}

/// Matcher of a rule
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Matcher {
    /// Matcher type
    #[serde(rename = "type")]
    pub kind: MatcherKind,

    /// Field of the message to match on, `to` for aliases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// The value to match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Matcher {
    /// Literal matcher on the recipient
    pub fn literal_to(address: &str) -> Self {
        Self {
            kind: MatcherKind::Literal,
            field: Some("to".into()),
            value: Some(address.into()),
        }
    }
}

/// Type of a rule action
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Forward to the destinations in the value
    Forward,

    /// Hand the message to a worker
    Worker,

    /// Drop the message
    Drop,

    /// Anything this crate does not know about
    #[serde(other)]
    Unknown,
}

/// Action of a rule
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Action {
    /// Action type
    #[serde(rename = "type")]
    pub kind: ActionKind,

    /// Arguments of the action, the destinations for a forward
    #[serde(default)]
    pub value: Vec<String>,
}

impl Action {
    /// Forward to a single destination
    pub fn forward_to(destination: &str) -> Self {
        Self {
            kind: ActionKind::Forward,
            value: vec![destination.into()],
        }
    }
}

/// Routing rule as persisted by the provider
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Rule {
    /// Provider identifier, absent until persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Free-text name
    #[serde(default)]
    pub name: String,

    /// Is the rule active?
    #[serde(default)]
    pub enabled: bool,

    /// Ordering of the rule
    #[serde(default)]
    pub priority: i64,

    /// What the rule matches on
    #[serde(default)]
    pub matchers: Vec<Matcher>,

    /// What the rule does
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Rule {
    /// Does this rule handle mail for the address?
    ///
    /// Either the literal `to` matcher or the recorded name must equal the address, ignoring case
    pub fn matches_address(&self, address: &str) -> bool {
        let literal_match = self.matchers.iter().any(|matcher| {
            matcher.kind == MatcherKind::Literal
                && matcher
                    .value
                    .as_deref()
                    .is_some_and(|value| value.eq_ignore_ascii_case(address))
        });

        literal_match || self.name.eq_ignore_ascii_case(address)
    }
}

/// Status of an API token
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenStatus {
    /// Token identifier
    #[serde(default)]
    pub id: String,

    /// Token status, like `active`
    pub status: String,
}

/// Provider with all supported operations
///
/// A provider value is bound to a single credential and never changes it; use
/// [`Provider::with_token`] to get a value for another credential
#[async_trait]
pub trait Provider: Clone + Send + Sync + 'static {
    /// A new provider bound to another credential
    #[must_use]
    fn with_token(&self, token: &str) -> Self;

    /// List a page of zones
    async fn list_zones(&self, page: u32) -> Result<ApiResponse<Page<Zone>>>;

    /// List a page of destination addresses of an account
    async fn list_destinations(
        &self,
        account_id: &str,
        page: u32,
    ) -> Result<ApiResponse<Page<DestinationAddress>>>;

    /// List a page of routing rules of a zone
    async fn list_rules(&self, zone_id: &str, page: u32) -> Result<ApiResponse<Page<Rule>>>;

    /// Create a routing rule
    async fn create_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>>;

    /// Update a routing rule, addressed by its tag
    async fn update_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>>;

    /// Delete a routing rule, addressed by its tag
    async fn delete_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>>;

    /// Check the status of an API token
    async fn verify_credential(&self, token: &str) -> Result<ApiResponse<TokenStatus>>;
}

/// All zones, over all pages
pub async fn all_zones<P: Provider>(provider: &P) -> Result<Vec<Zone>> {
    fetch_all(|page| async move { handle_or_throw(provider.list_zones(page).await?) }).await
}

/// All destination addresses of an account, over all pages
pub async fn all_destinations<P: Provider>(
    provider: &P,
    account_id: &str,
) -> Result<Vec<DestinationAddress>> {
    fetch_all(|page| async move {
        handle_or_throw(provider.list_destinations(account_id, page).await?)
    })
    .await
}

/// All verified destination addresses of an account
pub async fn verified_destinations<P: Provider>(
    provider: &P,
    account_id: &str,
) -> Result<Vec<DestinationAddress>> {
    let destinations = all_destinations(provider, account_id).await?;

    Ok(destinations
        .into_iter()
        .filter(DestinationAddress::is_verified)
        .collect())
}

/// All routing rules of a zone, over all pages
pub async fn all_rules<P: Provider>(provider: &P, zone_id: &str) -> Result<Vec<Rule>> {
    fetch_all(|page| async move { handle_or_throw(provider.list_rules(zone_id, page).await?) })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let body = r#"{
            "success": true,
            "errors": [],
            "messages": [],
            "result": [{ "id": "abc", "name": "doe.net", "status": "active" }],
            "result_info": { "page": 1, "per_page": 20, "count": 1, "total_count": 1 }
        }"#;

        let envelope = serde_json::from_str::<Envelope<Vec<Zone>>>(body).unwrap();
        let response = envelope.into_response().unwrap().into_page(1);

        let ApiResponse::Success { result, .. } = response else {
            panic!("Expected a successful response");
        };

        assert_eq!(1, result.items.len());
        assert_eq!("doe.net", result.items[0].name);
        assert_eq!(20, result.per_page);
        assert!(result.is_last());
    }

    #[test]
    fn test_envelope_failure_ignores_result() {
        let body = r#"{
            "success": false,
            "errors": [{ "code": 7003, "message": "Could not route to /zones/nope" }],
            "result": null
        }"#;

        let envelope = serde_json::from_str::<Envelope<Vec<Zone>>>(body).unwrap();
        let response = envelope.into_response().unwrap();

        let error = handle_or_throw(response).unwrap_err();
        assert!(error.is_business());
        assert_eq!("Could not route to /zones/nope", error.to_string());
    }

    #[test]
    fn test_envelope_success_without_result() {
        let body = r#"{ "success": true, "errors": [] }"#;

        let envelope = serde_json::from_str::<Envelope<Rule>>(body).unwrap();

        assert!(matches!(envelope.into_response(), Err(Error::Decode(_))));
    }

    #[test]
    fn test_handle_or_throw_without_errors() {
        let response = ApiResponse::<()>::Failure { errors: vec![] };

        let error = handle_or_throw(response).unwrap_err();
        assert_eq!("Unknown provider error", error.to_string());
    }

    #[test]
    fn test_rule_decoding_unknown_kinds() {
        let body = r#"{
            "tag": "a7e6fb77503c41d8a7f3113c6918f10c",
            "name": "Send to worker",
            "enabled": true,
            "priority": 0,
            "matchers": [{ "type": "all" }],
            "actions": [{ "type": "teleport", "value": ["moon"] }]
        }"#;

        let rule = serde_json::from_str::<Rule>(body).unwrap();

        assert_eq!(MatcherKind::All, rule.matchers[0].kind);
        assert_eq!(None, rule.matchers[0].value);
        assert_eq!(ActionKind::Unknown, rule.actions[0].kind);
    }

    #[test]
    fn test_rule_matches_address() {
        let rule = Rule {
            tag: None,
            name: String::new(),
            enabled: true,
            priority: 0,
            matchers: vec![Matcher::literal_to("bob@doe.net")],
            actions: vec![Action::forward_to("alice@gmail.com")],
        };

        assert!(rule.matches_address("bob@doe.net"));
        assert!(rule.matches_address("BOB@Doe.Net"));
        assert!(!rule.matches_address("bob@doe.org"));

        let rule = Rule {
            name: "Bob@doe.net".into(),
            matchers: vec![],
            ..rule
        };

        assert!(rule.matches_address("bob@doe.net"));
    }

    #[test]
    fn test_page_is_last() {
        let page = |page, items: usize, total_count| Page {
            items: vec![0; items],
            page,
            per_page: 10,
            total_count,
        };

        assert!(!page(1, 10, 25).is_last());
        assert!(!page(2, 10, 25).is_last());
        assert!(page(3, 5, 25).is_last());
        assert!(page(1, 10, 10).is_last());
        assert!(page(1, 0, 0).is_last());
    }
}
