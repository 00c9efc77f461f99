//! Resend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::DeliveryBackend;
use super::accepted;

const RESEND_URL: &str = "https://api.resend.com/emails";

/// Delivery through the Resend API
pub struct Resend {
    client: Client,
    api_key: String,
}

impl Resend {
    /// # Errors
    ///
    /// Will return `Err` when the HTTP client can not be constructed
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

#[async_trait]
impl DeliveryBackend for Resend {
    fn name(&self) -> &'static str {
        "Resend"
    }

    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> bool {
        let payload = Payload {
            from,
            to: [to],
            subject,
            text: body,
        };

        let response = self
            .client
            .post(RESEND_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        accepted(self.name(), response).await
    }
}
