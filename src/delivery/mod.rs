//! Delivery of forwarded mail
//!
//! A backend only reports whether the message was accepted, failures are logged by the backend
//! itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::DeliveryConfig;

pub use resend::Resend;
pub use sendgrid::SendGrid;

#[cfg(test)]
pub mod recording;
mod resend;
mod sendgrid;

/// Something that can send a message
#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    /// Short name, used in logs
    fn name(&self) -> &'static str;

    /// Send a plain text message, `true` when the backend accepted it
    async fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> bool;
}

/// Shared delivery backend
pub type Delivery = Arc<dyn DeliveryBackend>;

/// Setup the configured delivery backend
///
/// # Errors
///
/// Will return `Err` when the HTTP client can not be constructed
pub fn setup(config: &DeliveryConfig, timeout: Duration) -> Result<Delivery, reqwest::Error> {
    let delivery: Delivery = match config {
        DeliveryConfig::Resend { api_key } => Arc::new(Resend::new(api_key, timeout)?),
        DeliveryConfig::SendGrid { api_key } => Arc::new(SendGrid::new(api_key, timeout)?),
    };

    tracing::debug!("Using {} for delivery", delivery.name());

    Ok(delivery)
}

/// Log the outcome of a delivery request
async fn accepted(backend: &str, response: reqwest::Result<reqwest::Response>) -> bool {
    let response = match response {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("Unable to reach {backend}: {err}");
            return false;
        }
    };

    let status = response.status();
    if status.is_success() {
        return true;
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!("{backend} refused the message with status {status}: {body}");

    false
}
