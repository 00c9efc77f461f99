//! Reply address parsing
//!
//! A reply address has the shape `local+encoded@domain`, where `encoded` is the destination
//! mailbox with its `@` replaced by `=`:
//!
//! ```text
//! bob+carol=example.com@doe.net
//! ^^^ ^^^^^^^^^^^^^^^^^ ^^^^^^^
//!  |          |            +-- domain of the alias
//!  |          +-- destination, carol@example.com
//!  +-- local-part of the alias, bob@doe.net
//! ```
//!
//! Grammar, after folding the ASCII letters of the whole address to lowercase:
//!
//! ```text
//! reply-address = local "+" local "=" domain "@" domain
//! local         = 1*( a-z / 0-9 / "." )
//! domain        = 1*( a-z / 0-9 / "." / "-" )
//! ```
//!
//! Anything else, including a second `+`, `=` or `@`, is not a reply address.

/// Parsed reply address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyAddress {
    /// The alias the reply goes out as, `bob@doe.net`
    pub alias: String,

    /// Where the reply goes to, `carol@example.com`
    pub destination: String,
}

/// Parse a reply address, `None` when it does not follow the grammar
pub fn parse_reply_address(to: &str) -> Option<ReplyAddress> {
    let to = to.to_ascii_lowercase();

    let (local_part, domain) = to.split_once('@')?;
    let (alias_local, encoded) = local_part.split_once('+')?;
    let (destination_local, destination_domain) = encoded.split_once('=')?;

    let valid = is_local(alias_local)
        && is_local(destination_local)
        && is_domain(destination_domain)
        && is_domain(domain);

    valid.then(|| ReplyAddress {
        alias: format!("{alias_local}@{domain}"),
        destination: format!("{destination_local}@{destination_domain}"),
    })
}

fn is_local(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '.')
}

fn is_domain(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '.' || ch == '-')
}
