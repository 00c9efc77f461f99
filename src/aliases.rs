//! Aliases
//!
//! An alias is a provider rule with a single literal `to` matcher and a single forward action.
//! Rules created by Forwardly carry a marker in their name, everything else is external. The
//! name of an external alias that looks marked is escaped, so it stays external.

use chrono::Utc;

use crate::address::CodecError;
use crate::provider::Action;
use crate::provider::ActionKind;
use crate::provider::Matcher;
use crate::provider::MatcherKind;
use crate::provider::Rule;

/// Marks the rule name of aliases created by Forwardly
pub const NAME_MARKER: &str = "forwardly:";

/// Escapes the name of external aliases that would otherwise look marked
pub const EXTERNAL_ESCAPE: &str = "forwardly-external:";

/// Disposable address forwarding to a real mailbox
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    /// Full address, lowercase
    pub address: String,

    /// Verified mailbox the alias forwards to
    pub destination: String,

    /// Free-text description
    pub name: String,

    /// Is the alias forwarding?
    pub enabled: bool,

    /// Was the rule created outside of Forwardly?
    pub is_external: bool,

    /// Display ordering, higher is more recent
    pub priority: i64,

    /// Provider identifier, absent until persisted
    pub tag: Option<String>,
}

impl Alias {
    /// Create a new alias, not yet known by the provider
    ///
    /// # Errors
    ///
    /// Will return `Err` when the address is not a single `local-part@domain`
    pub fn new(address: &str, destination: &str, name: &str) -> Result<Self, CodecError> {
        let address = address.to_lowercase();

        if split_address(&address).is_none() {
            return Err(CodecError::InvalidAddress(address));
        }

        Ok(Self {
            address,
            destination: destination.to_lowercase(),
            name: name.to_string(),
            enabled: true,
            is_external: false,
            priority: priority_now(),
            tag: None,
        })
    }

    /// Encode the alias as provider rule
    pub fn to_provider_rule(&self) -> Rule {
        let name = if self.is_external {
            if self.name.starts_with(NAME_MARKER) || self.name.starts_with(EXTERNAL_ESCAPE) {
                format!("{EXTERNAL_ESCAPE}{}", self.name)
            } else {
                self.name.clone()
            }
        } else {
            format!("{NAME_MARKER}{}", self.name)
        };

        Rule {
            tag: self.tag.clone(),
            name,
            enabled: self.enabled,
            priority: self.priority,
            matchers: vec![Matcher::literal_to(&self.address)],
            actions: vec![Action::forward_to(&self.destination)],
        }
    }

    /// Decode a provider rule
    ///
    /// # Errors
    ///
    /// Will return `Err` when the rule is not a single literal matcher on `to` with a single
    /// forward action to one destination
    pub fn from_provider_rule(rule: &Rule) -> Result<Self, CodecError> {
        let [matcher] = rule.matchers.as_slice() else {
            return Err(CodecError::Unsupported(format!(
                "{} matchers",
                rule.matchers.len()
            )));
        };

        if matcher.kind != MatcherKind::Literal {
            return Err(CodecError::Unsupported(format!(
                "matcher type {:?}",
                matcher.kind
            )));
        }

        if matcher.field.as_deref().is_some_and(|field| field != "to") {
            return Err(CodecError::Unsupported("matcher field".into()));
        }

        let address = matcher
            .value
            .as_deref()
            .ok_or_else(|| CodecError::Unsupported("matcher without value".into()))?
            .to_lowercase();

        if split_address(&address).is_none() {
            return Err(CodecError::InvalidAddress(address));
        }

        let [action] = rule.actions.as_slice() else {
            return Err(CodecError::Unsupported(format!(
                "{} actions",
                rule.actions.len()
            )));
        };

        if action.kind != ActionKind::Forward {
            return Err(CodecError::Unsupported(format!(
                "action type {:?}",
                action.kind
            )));
        }

        let [destination] = action.value.as_slice() else {
            return Err(CodecError::Unsupported(format!(
                "{} destinations",
                action.value.len()
            )));
        };

        let (name, is_external) = if let Some(name) = rule.name.strip_prefix(EXTERNAL_ESCAPE) {
            (name.to_string(), true)
        } else if let Some(name) = rule.name.strip_prefix(NAME_MARKER) {
            (name.to_string(), false)
        } else {
            (rule.name.clone(), true)
        };

        Ok(Self {
            address,
            destination: destination.clone(),
            name,
            enabled: rule.enabled,
            is_external,
            priority: rule.priority,
            tag: rule.tag.clone(),
        })
    }
}

/// Decode all rules that are aliases
///
/// Returns the aliases and the number of rules that were skipped
pub fn decode_rules(rules: &[Rule]) -> (Vec<Alias>, usize) {
    let mut skipped = 0;

    let aliases = rules
        .iter()
        .filter_map(|rule| match Alias::from_provider_rule(rule) {
            Ok(alias) => Some(alias),
            Err(err) => {
                tracing::trace!("Skipping rule {:?}: {err}", rule.tag);
                skipped += 1;
                None
            }
        })
        .collect();

    (aliases, skipped)
}

/// Split an address in local-part and domain
///
/// Only a single `@` with something on both sides is accepted
pub fn split_address(address: &str) -> Option<(&str, &str)> {
    let (local_part, domain) = address.split_once('@')?;

    if local_part.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }

    Some((local_part, domain))
}

/// Priority for a new alias, seconds since the epoch
pub fn priority_now() -> i64 {
    Utc::now().timestamp()
}
