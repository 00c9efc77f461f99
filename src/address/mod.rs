//! Alias address generation
//!
//! Turns [`GenerationOptions`] into the local-part of an alias. Generation does not know about
//! existing aliases, collision handling is up to the caller.

use rand::Rng;
use rand::distr::Alphanumeric;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use thiserror::Error;

use words::WORDS;

mod words;

/// Separator between prefix and suffix when none is given
pub const DEFAULT_SEPARATOR: &str = "_";

/// Errors while encoding or decoding aliases
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The rule has a shape that can not be expressed as an alias
    #[error("Unsupported rule: {0}")]
    Unsupported(String),

    /// The custom format without a custom alias
    #[error("Custom alias can not be empty")]
    EmptyCustomAlias,

    /// Generation ended up with nothing
    #[error("Generated alias is empty")]
    EmptyLocalPart,

    /// Not a single `local-part@domain` address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// How the alias itself is generated
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Format {
    /// Random alphanumeric characters
    #[default]
    Characters,

    /// Random dictionary words
    Words,

    /// Only the prefix derived from the hostname
    Domain,

    /// The custom alias as given
    Custom,
}

/// How the prefix is derived
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PrefixFormat {
    /// No prefix
    #[default]
    None,

    /// Registrable label only, `example` for `www.example.co.uk`
    DomainWithoutExtension,

    /// Registrable domain, `example.co.uk` for `www.example.co.uk`
    DomainWithExtension,

    /// The whole hostname
    FullDomain,

    /// The custom prefix as given
    Custom,
}

/// Options to generate an alias with
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    pub format: Format,
    pub character_count: usize,
    pub word_count: usize,
    pub separator: String,
    pub prefix_format: PrefixFormat,
    pub custom_prefix: String,
    pub custom_alias: String,

    /// Hostname of the site the alias is meant for
    pub hostname: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            format: Format::default(),
            character_count: 8,
            word_count: 2,
            separator: DEFAULT_SEPARATOR.into(),
            prefix_format: PrefixFormat::default(),
            custom_prefix: String::new(),
            custom_alias: String::new(),
            hostname: String::new(),
        }
    }
}

/// Generate the local-part of an alias
///
/// Every call with the `characters` or `words` format gives another result. The result is always
/// lowercase.
///
/// # Errors
///
/// Will return `Err` when the custom format has no custom alias, or when nothing is left to use
/// as local-part
pub fn generate_address(options: &GenerationOptions) -> Result<String, CodecError> {
    generate_address_with(options, &mut rand::rng())
}

/// Generate the local-part of an alias with a given source of randomness
///
/// # Errors
///
/// See [`generate_address`]
pub fn generate_address_with<R>(
    options: &GenerationOptions,
    rng: &mut R,
) -> Result<String, CodecError>
where
    R: Rng + ?Sized,
{
    let separator = if options.separator.is_empty() {
        DEFAULT_SEPARATOR
    } else {
        options.separator.as_str()
    };

    let local_part = match options.format {
        Format::Custom => {
            if options.custom_alias.trim().is_empty() {
                return Err(CodecError::EmptyCustomAlias);
            }

            options.custom_alias.clone()
        }
        Format::Characters => join(
            &derive_prefix(options),
            &random_characters(options.character_count, rng),
            separator,
        ),
        Format::Words => join(
            &derive_prefix(options),
            &random_words(options.word_count, separator, rng),
            separator,
        ),
        Format::Domain => derive_prefix(options),
    };

    let local_part = local_part.to_lowercase();

    if local_part.is_empty() {
        Err(CodecError::EmptyLocalPart)
    } else {
        Ok(local_part)
    }
}

/// Derive the prefix from the hostname
///
/// A hostname that is not a domain with a known public suffix gives an empty prefix, except for
/// the custom prefix format which does not look at the hostname at all
pub fn derive_prefix(options: &GenerationOptions) -> String {
    let prefix_format = options.prefix_format;

    match prefix_format {
        PrefixFormat::None => String::new(),
        PrefixFormat::Custom => options.custom_prefix.trim().to_string(),
        PrefixFormat::DomainWithoutExtension
        | PrefixFormat::DomainWithExtension
        | PrefixFormat::FullDomain => {
            let hostname = options.hostname.trim().to_lowercase();

            let Some((root, suffix)) = registrable_domain(&hostname) else {
                tracing::debug!(r#"No prefix for invalid hostname "{hostname}""#);

                return String::new();
            };

            match prefix_format {
                PrefixFormat::DomainWithoutExtension => root
                    .strip_suffix(&suffix)
                    .and_then(|label| label.strip_suffix('.'))
                    .unwrap_or_default()
                    .to_string(),
                PrefixFormat::DomainWithExtension => root,
                _ => hostname,
            }
        }
    }
}

/// Registrable domain and public suffix of a hostname
///
/// `www.example.co.uk` gives `example.co.uk` and `co.uk`
fn registrable_domain(hostname: &str) -> Option<(String, String)> {
    let name = addr::parse_domain_name(hostname).ok()?;

    if !name.has_known_suffix() {
        return None;
    }

    let root = name.root()?;

    Some((root.to_string(), name.suffix().to_string()))
}

/// Join prefix and suffix, the separator is only used when both are present
fn join(prefix: &str, suffix: &str, separator: &str) -> String {
    match (prefix.is_empty(), suffix.is_empty()) {
        (true, _) => suffix.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}{separator}{suffix}"),
    }
}

fn random_characters<R>(count: usize, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    (0..count)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

fn random_words<R>(count: usize, separator: &str, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    (0..count)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(separator)
}
