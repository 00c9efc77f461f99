//! SendGrid

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::DeliveryBackend;
use super::accepted;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Delivery through the SendGrid v3 API
pub struct SendGrid {
    client: Client,
    api_key: String,
}

impl SendGrid {
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
struct EmailAddress<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [EmailAddress<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    personalizations: [Personalization<'a>; 1],
    from: EmailAddress<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

impl<'a> Payload<'a> {
    fn new(from: &'a str, to: &'a str, subject: &'a str, body: &'a str) -> Self {
        // SendGrid refuses empty content
        let value = if body.is_empty() { " " } else { body };

        Self {
            personalizations: [Personalization {
                to: [EmailAddress { email: to }],
            }],
            from: EmailAddress { email: from },
            subject,
            content: [Content {
                kind: "text/plain",
                value,
            }],
        }
    }
}

#[async_trait]
impl DeliveryBackend for SendGrid {
    fn name(&self) -> &'static str {
        "SendGrid"
    }

    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> bool {
        let payload = Payload::new(from, to, subject, body);

        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        accepted(self.name(), response).await
    }
}
