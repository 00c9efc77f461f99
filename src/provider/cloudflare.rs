//! Cloudflare email routing
//!
//! Owns transport details only: authentication, URL building, status mapping and decoding of the
//! response envelope.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use reqwest::Client;
use reqwest::Method;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ProviderConfig;

use super::ApiResponse;
use super::DestinationAddress;
use super::Envelope;
use super::Error;
use super::Page;
use super::Provider;
use super::Result;
use super::Rule;
use super::TokenStatus;
use super::Zone;

/// Characters that stay as-is in a path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Cloudflare API client
///
/// Cheap to clone, all clones share the same connection pool
#[derive(Clone)]
pub struct Cloudflare {
    /// HTTP client, with the request timeout applied
    client: Client,

    /// Base URL of the API, ends with a slash
    base_url: Arc<Url>,

    /// The API token used as bearer credential
    token: Arc<str>,
}

impl Cloudflare {
    /// Create a client from the provider configuration
    ///
    /// # Errors
    ///
    /// Will return `Err` when the HTTP client can not be constructed
    pub fn new(config: &ProviderConfig) -> core::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: Arc::new(config.api_url.clone()),
            token: Arc::from(config.api_token.as_str()),
        })
    }

    /// Build the full URL of an endpoint
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let path = segments
            .iter()
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");

        self.base_url
            .join(&path)
            .map_err(|err| Error::Transport(format!("Invalid URL: {err}")))
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(token)
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;

        tracing::trace!("Provider responded with {status}");

        if status.is_server_error() {
            return Err(Error::Status(status.as_u16()));
        }

        match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(envelope) => envelope.into_response(),
            Err(_) if status.is_client_error() => Err(Error::Status(status.as_u16())),
            Err(err) => Err(Error::Decode(err.to_string())),
        }
    }

    async fn list<T>(&self, segments: &[&str], page: u32) -> Result<ApiResponse<Page<T>>>
    where
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        let request = self
            .request(Method::GET, url, &self.token)
            .query(&[("page", page)]);

        self.send::<Vec<T>>(request)
            .await
            .map(|response| response.into_page(page))
    }

    async fn send_rule<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<ApiResponse<Rule>>
    where
        B: Serialize + Sync,
    {
        let url = self.url(segments)?;
        let request = self.request(method, url, &self.token).json(body);

        self.send(request).await
    }
}

#[async_trait]
impl Provider for Cloudflare {
    fn with_token(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: Arc::clone(&self.base_url),
            token: Arc::from(token),
        }
    }

    async fn list_zones(&self, page: u32) -> Result<ApiResponse<Page<Zone>>> {
        self.list(&["zones"], page).await
    }

    async fn list_destinations(
        &self,
        account_id: &str,
        page: u32,
    ) -> Result<ApiResponse<Page<DestinationAddress>>> {
        self.list(
            &["accounts", account_id, "email", "routing", "addresses"],
            page,
        )
        .await
    }

    async fn list_rules(&self, zone_id: &str, page: u32) -> Result<ApiResponse<Page<Rule>>> {
        self.list(&["zones", zone_id, "email", "routing", "rules"], page)
            .await
    }

    async fn create_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>> {
        self.send_rule(
            Method::POST,
            &["zones", zone_id, "email", "routing", "rules"],
            rule,
        )
        .await
    }

    async fn update_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>> {
        let tag = rule.tag.as_deref().ok_or(Error::MissingTag)?;

        self.send_rule(
            Method::PUT,
            &["zones", zone_id, "email", "routing", "rules", tag],
            rule,
        )
        .await
    }

    async fn delete_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>> {
        let tag = rule.tag.as_deref().ok_or(Error::MissingTag)?;

        let url = self.url(&["zones", zone_id, "email", "routing", "rules", tag])?;
        let request = self.request(Method::DELETE, url, &self.token);

        self.send(request).await
    }

    async fn verify_credential(&self, token: &str) -> Result<ApiResponse<TokenStatus>> {
        let url = self.url(&["user", "tokens", "verify"])?;
        let request = self.request(Method::GET, url, token);

        self.send(request).await
    }
}

fn map_transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout(error.to_string())
    } else if error.is_decode() {
        Error::Decode(error.to_string())
    } else {
        Error::Transport(error.to_string())
    }
}
