//! Configuration
//!
//! Everything is read from the environment (after loading `.env`), once at startup. A missing or
//! invalid value stops the service before it starts listening.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4/";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is not set, or empty
    #[error("`{0}` is not set")]
    Missing(&'static str),

    /// A value is set, but not usable
    #[error("`{name}` is invalid: {reason}")]
    Invalid {
        /// Name of the variable
        name: &'static str,

        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    fn invalid<R>(name: &'static str, reason: R) -> Self
    where
        R: ToString,
    {
        Self::Invalid {
            name,
            reason: reason.to_string(),
        }
    }
}

/// Provider settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Credential for the provider API
    pub api_token: String,

    /// Account the destination addresses belong to
    pub account_id: String,

    /// Base URL of the provider API, always ends with a slash
    pub api_url: Url,

    /// Timeout of a single request
    pub timeout: Duration,
}

/// Selected delivery backend and its credentials
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryConfig {
    /// Resend
    Resend {
        /// API key of Resend
        api_key: String,
    },

    /// SendGrid
    SendGrid {
        /// API key of SendGrid
        api_key: String,
    },
}

/// All settings of the service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Provider settings
    pub provider: ProviderConfig,

    /// Delivery settings
    pub delivery: DeliveryConfig,

    /// Address to listen on
    pub address: SocketAddr,
}

impl Config {
    /// Read the configuration from the environment
    ///
    /// # Errors
    ///
    /// Will return `Err` when a required value is missing or a value is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration with a custom lookup of variables
    ///
    /// # Errors
    ///
    /// Will return `Err` when a required value is missing or a value is invalid
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        Ok(Self {
            provider: provider_config(&env)?,
            delivery: delivery_config(&env)?,
            address: address(&env)?,
        })
    }
}

/// Variable lookup where empty values count as not set
struct Env<L>(L);

impl<L> Env<L>
where
    L: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }
}

fn provider_config<L>(env: &Env<L>) -> Result<ProviderConfig, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let api_token = env.required("CLOUDFLARE_API_TOKEN")?;
    let account_id = env.required("CLOUDFLARE_ACCOUNT_ID")?;

    let mut api_url = env
        .get("CLOUDFLARE_API_URL")
        .unwrap_or_else(|| DEFAULT_API_URL.into());

    // relative joins drop the last segment without it
    if !api_url.ends_with('/') {
        api_url.push('/');
    }

    let api_url =
        Url::parse(&api_url).map_err(|err| ConfigError::invalid("CLOUDFLARE_API_URL", err))?;

    let timeout = match env.get("PROVIDER_TIMEOUT_SECONDS") {
        Some(seconds) => match seconds.parse::<u64>() {
            Ok(0) => {
                return Err(ConfigError::invalid(
                    "PROVIDER_TIMEOUT_SECONDS",
                    "must be positive",
                ));
            }
            Ok(seconds) => seconds,
            Err(err) => return Err(ConfigError::invalid("PROVIDER_TIMEOUT_SECONDS", err)),
        },
        None => DEFAULT_TIMEOUT_SECONDS,
    };

    Ok(ProviderConfig {
        api_token,
        account_id,
        api_url,
        timeout: Duration::from_secs(timeout),
    })
}

fn delivery_config<L>(env: &Env<L>) -> Result<DeliveryConfig, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let backend = env.required("DELIVERY_BACKEND")?;

    match backend.to_lowercase().as_str() {
        "resend" => Ok(DeliveryConfig::Resend {
            api_key: env.required("RESEND_API_KEY")?,
        }),
        "sendgrid" => Ok(DeliveryConfig::SendGrid {
            api_key: env.required("SENDGRID_API_KEY")?,
        }),
        _ => Err(ConfigError::invalid(
            "DELIVERY_BACKEND",
            format!(r#"unknown backend "{backend}", expected "resend" or "sendgrid""#),
        )),
    }
}

fn address<L>(env: &Env<L>) -> Result<SocketAddr, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let mut address = env
        .get("ADDRESS")
        .unwrap_or_else(|| DEFAULT_ADDRESS.into())
        .parse::<SocketAddr>()
        .map_err(|err| ConfigError::invalid("ADDRESS", err))?;

    // optional override of just the port
    if let Some(port) = env.get("PORT") {
        let port = port
            .parse::<u16>()
            .map_err(|err| ConfigError::invalid("PORT", err))?;

        address.set_port(port);
    }

    Ok(address)
}
