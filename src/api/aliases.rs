//! Aliases API endpoints
//!
//! Everything related to the aliases management, aliases are stored as routing rules of a zone

use serde::Deserialize;
use serde::Serialize;

use crate::address::Format;
use crate::address::GenerationOptions;
use crate::address::generate_address;
use crate::aliases::Alias;
use crate::aliases::decode_rules;
use crate::provider::Provider;
use crate::provider::Rule;
use crate::provider::Zone;
use crate::provider::all_rules;
use crate::provider::handle_or_throw;
use crate::provider::verified_destinations;

use super::CurrentProvider;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::utils::fetch_rule;
use super::utils::fetch_zone;

/// Number of tries to come up with an address that is not used yet
pub const PREVIEW_ATTEMPTS: usize = 3;

/// Longest local-part a mailbox can have (RFC 5321)
pub const MAX_LOCAL_PART_LENGTH: usize = 64;

/// Most words the words format can use
pub const MAX_WORD_COUNT: usize = 8;

/// Alias response going to the user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasResponse {
    /// Full address
    pub address: String,

    /// Where the alias forwards to
    pub destination: String,

    /// Description
    pub name: String,

    /// Is the alias forwarding?
    pub enabled: bool,

    /// Was the alias created elsewhere?
    pub is_external: bool,

    /// Display ordering
    pub priority: i64,

    /// Provider identifier
    pub tag: Option<String>,
}

impl From<Alias> for AliasResponse {
    fn from(alias: Alias) -> Self {
        Self {
            address: alias.address,
            destination: alias.destination,
            name: alias.name,
            enabled: alias.enabled,
            is_external: alias.is_external,
            priority: alias.priority,
            tag: alias.tag,
        }
    }
}

/// List all aliases of a zone, most recent first
///
/// Rules that are not aliases, like the catch-all, are left out
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/zones/<zone>/aliases
/// ```
pub async fn list<P: Provider>(
    provider: CurrentProvider<P>,
    PathParameters(zone): PathParameters<String>,
) -> Result<Success<Vec<AliasResponse>>, Error> {
    let zone = fetch_zone(&*provider, &zone).await?;
    let rules = all_rules(&*provider, &zone.id).await?;

    let (mut aliases, skipped) = decode_rules(&rules);
    if skipped > 0 {
        tracing::debug!("Skipped {skipped} rules of zone {} that are not aliases", zone.id);
    }

    aliases.sort_by(|left, right| right.priority.cmp(&left.priority));

    Ok(Success::ok(
        aliases.into_iter().map(AliasResponse::from).collect(),
    ))
}

/// Generated address
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    /// The full address
    pub address: String,

    /// Is the address in use already?
    pub exists: bool,
}

/// Preview the address for the given options
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "format": "words", "prefixFormat": "domainWithoutExtension", "hostname": "www.example.com" }' \
///     http://localhost:6000/api/zones/<zone>/aliases/preview
/// ```
pub async fn preview<P: Provider>(
    provider: CurrentProvider<P>,
    PathParameters(zone): PathParameters<String>,
    Form(options): Form<GenerationOptions>,
) -> Result<Success<PreviewResponse>, Error> {
    validate_options(&options)?;

    let zone = fetch_zone(&*provider, &zone).await?;
    let rules = all_rules(&*provider, &zone.id).await?;

    let (address, exists) = generate_unique(&options, &zone, &rules)?;

    Ok(Success::ok(PreviewResponse { address, exists }))
}

/// Create alias request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAliasForm {
    /// Where the alias forwards to, must be a verified destination
    pub destination: String,

    /// Description
    #[serde(default)]
    pub name: String,

    /// How to generate the address
    #[serde(flatten)]
    pub options: GenerationOptions,
}

/// Create an alias
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "destination": "alice@gmail.com", "name": "Webshop", "format": "characters" }' \
///     http://localhost:6000/api/zones/<zone>/aliases
/// ```
pub async fn create<P: Provider>(
    provider: CurrentProvider<P>,
    PathParameters(zone): PathParameters<String>,
    Form(form): Form<CreateAliasForm>,
) -> Result<Success<AliasResponse>, Error> {
    validate_options(&form.options)?;

    let zone = fetch_zone(&*provider, &zone).await?;

    ensure_verified_destination(&provider, &form.destination).await?;

    let rules = all_rules(&*provider, &zone.id).await?;
    let (address, exists) = generate_unique(&form.options, &zone, &rules)?;

    if exists {
        return Err(Error::bad_request("Alias already exists").with_description(address));
    }

    let alias = Alias::new(&address, &form.destination, &form.name)?;

    let rule = handle_or_throw(
        provider
            .create_rule(&zone.id, &alias.to_provider_rule())
            .await?,
    )?;

    tracing::info!("Created alias {} in zone {}", alias.address, zone.id);

    Ok(Success::created(Alias::from_provider_rule(&rule)?.into()))
}

/// Update alias request, absent fields stay as they are
#[derive(Deserialize)]
pub struct UpdateAliasForm {
    /// Where the alias forwards to, must be a verified destination
    pub destination: Option<String>,

    /// Is the alias forwarding?
    pub enabled: Option<bool>,

    /// Description
    pub name: Option<String>,
}

/// Update an alias
///
/// Request:
/// ```sh
/// curl -v -X PATCH -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "enabled": false }' \
///     http://localhost:6000/api/zones/<zone>/aliases/<tag>
/// ```
pub async fn update<P: Provider>(
    provider: CurrentProvider<P>,
    PathParameters((zone, tag)): PathParameters<(String, String)>,
    Form(form): Form<UpdateAliasForm>,
) -> Result<Success<AliasResponse>, Error> {
    let zone = fetch_zone(&*provider, &zone).await?;
    let rule = fetch_rule(&*provider, &zone, &tag).await?;

    let mut alias = Alias::from_provider_rule(&rule)?;

    if let Some(destination) = form.destination {
        ensure_verified_destination(&provider, &destination).await?;

        alias.destination = destination.to_lowercase();
    }

    if let Some(enabled) = form.enabled {
        alias.enabled = enabled;
    }

    if let Some(name) = form.name {
        alias.name = name;
    }

    let rule = handle_or_throw(
        provider
            .update_rule(&zone.id, &alias.to_provider_rule())
            .await?,
    )?;

    tracing::info!("Updated alias {} in zone {}", alias.address, zone.id);

    Ok(Success::ok(Alias::from_provider_rule(&rule)?.into()))
}

/// Delete an alias
///
/// Request:
/// ```sh
/// curl -v -X DELETE -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/zones/<zone>/aliases/<tag>
/// ```
pub async fn delete<P: Provider>(
    provider: CurrentProvider<P>,
    PathParameters((zone, tag)): PathParameters<(String, String)>,
) -> Result<Success<()>, Error> {
    let zone = fetch_zone(&*provider, &zone).await?;
    let rule = fetch_rule(&*provider, &zone, &tag).await?;

    handle_or_throw(provider.delete_rule(&zone.id, &rule).await?)?;

    tracing::info!("Deleted rule {tag} in zone {}", zone.id);

    Ok(Success::no_content())
}

/// Generate an address that is not in use, with a bounded number of attempts
///
/// Returns the last generated address and whether it exists already
fn generate_unique(
    options: &GenerationOptions,
    zone: &Zone,
    rules: &[Rule],
) -> Result<(String, bool), Error> {
    let mut address = String::new();

    for attempt in 1..=PREVIEW_ATTEMPTS {
        let local_part = generate_address(options)?;
        if local_part.len() > MAX_LOCAL_PART_LENGTH {
            return Err(Error::bad_request("Alias is too long").with_description(format!(
                "At most {MAX_LOCAL_PART_LENGTH} characters are allowed"
            )));
        }

        address = format!("{local_part}@{}", zone.name.to_lowercase());

        if !rules.iter().any(|rule| rule.matches_address(&address)) {
            return Ok((address, false));
        }

        tracing::debug!("Attempt {attempt}: {address} exists already");
    }

    Ok((address, true))
}

/// Refuse counts the generated local-part can never fit in
fn validate_options(options: &GenerationOptions) -> Result<(), Error> {
    match options.format {
        Format::Characters if !(1..=MAX_LOCAL_PART_LENGTH).contains(&options.character_count) => {
            Err(Error::bad_request("Invalid character count").with_description(format!(
                "Between 1 and {MAX_LOCAL_PART_LENGTH} characters are allowed"
            )))
        }
        Format::Words if !(1..=MAX_WORD_COUNT).contains(&options.word_count) => {
            Err(Error::bad_request("Invalid word count")
                .with_description(format!("Between 1 and {MAX_WORD_COUNT} words are allowed")))
        }
        _ => Ok(()),
    }
}

async fn ensure_verified_destination<P: Provider>(
    provider: &CurrentProvider<P>,
    destination: &str,
) -> Result<(), Error> {
    let verified = verified_destinations(&**provider, provider.account_id())
        .await?
        .iter()
        .any(|candidate| candidate.email.eq_ignore_ascii_case(destination));

    if verified {
        Ok(())
    } else {
        Err(Error::bad_request("Destination is not verified").with_description(destination))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::provider::Action;
    use crate::provider::Matcher;

    use super::*;

    fn zone() -> Zone {
        Zone {
            id: "zone-doe".into(),
            name: "doe.net".into(),
            status: None,
        }
    }

    fn custom(alias: &str) -> GenerationOptions {
        GenerationOptions {
            format: Format::Custom,
            custom_alias: alias.into(),
            ..GenerationOptions::default()
        }
    }

    #[test]
    fn test_generate_unique() {
        let (address, exists) = generate_unique(&custom("Shop"), &zone(), &[]).unwrap();

        assert_eq!("shop@doe.net", address);
        assert!(!exists);
    }

    #[test]
    fn test_generate_unique_collision() {
        let rule = Rule {
            tag: None,
            name: String::new(),
            enabled: true,
            priority: 0,
            matchers: vec![Matcher::literal_to("shop@doe.net")],
            actions: vec![Action::forward_to("alice@gmail.com")],
        };

        let (address, exists) = generate_unique(&custom("shop"), &zone(), &[rule]).unwrap();

        assert_eq!("shop@doe.net", address);
        assert!(exists);
    }

    #[test]
    fn test_generate_unique_too_long() {
        let result = generate_unique(&custom(&"a".repeat(65)), &zone(), &[]);

        assert_eq!(
            StatusCode::BAD_REQUEST,
            result.unwrap_err().status_code()
        );
    }

    #[test]
    fn test_validate_options() {
        let characters = |count| GenerationOptions {
            character_count: count,
            ..GenerationOptions::default()
        };
        let words = |count| GenerationOptions {
            format: Format::Words,
            word_count: count,
            ..GenerationOptions::default()
        };

        assert!(validate_options(&characters(1)).is_ok());
        assert!(validate_options(&characters(64)).is_ok());
        assert!(validate_options(&characters(0)).is_err());
        assert!(validate_options(&characters(65)).is_err());
        assert!(validate_options(&words(8)).is_ok());
        assert!(validate_options(&words(9)).is_err());

        // only the count of the chosen format matters
        assert!(
            validate_options(&GenerationOptions {
                word_count: 1000,
                ..GenerationOptions::default()
            })
            .is_ok()
        );
    }

    #[test]
    fn test_create_form() {
        let form = serde_json::from_str::<CreateAliasForm>(
            r#"{ "destination": "alice@gmail.com", "format": "words", "wordCount": 3 }"#,
        )
        .unwrap();

        assert_eq!("alice@gmail.com", form.destination);
        assert_eq!("", form.name);
        assert_eq!(3, form.options.word_count);
        assert_eq!(8, form.options.character_count);
    }
}
