//! # Return URIs
//!
//! A return URI is an RFC 3986 URI reference: either absolute
//! (`https://app.example/cb`) or relative (`/cb`, `//app.example/cb`).
//! The text is validated but never normalized, so what a peer signed is what
//! is read back.

use crate::domain::errors::ConnectError;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Validated URI reference, kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReturnUri(String);

impl ReturnUri {
    /// Validate `text` as a URI reference.
    ///
    /// # Errors
    /// * `ConnectError::MalformedUri` - `text` is empty, holds characters a URI
    ///   cannot carry, or has a scheme or authority that does not parse
    pub fn parse(text: &str) -> Result<Self, ConnectError> {
        check_reference(text).map_err(|reason| ConnectError::MalformedUri {
            value: text.to_string(),
            reason: reason.to_string(),
        })?;
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the reference carries a scheme.
    pub fn is_absolute(&self) -> bool {
        scheme_end(&self.0).is_some()
    }
}

fn check_reference(text: &str) -> Result<(), &'static str> {
    if text.is_empty() {
        return Err("empty URI");
    }
    check_characters(text)?;
    if text.matches('#').count() > 1 {
        return Err("more than one fragment delimiter");
    }

    let rest = match scheme_end(text) {
        Some(end) => {
            check_scheme(&text[..end])?;
            &text[end + 1..]
        }
        None if text.starts_with(':') => return Err("missing scheme"),
        None => text,
    };
    check_brackets(rest)?;

    if scheme_end(text).is_some() {
        Url::parse(text).map_err(|_| "absolute URI does not parse")?;
    } else if text.starts_with("//") {
        Url::parse(&format!("http:{text}")).map_err(|_| "network-path reference does not parse")?;
    }
    Ok(())
}

/// Offset of the `:` ending the scheme, if one comes before any `/`, `?` or `#`.
fn scheme_end(text: &str) -> Option<usize> {
    text.find([':', '/', '?', '#'])
        .filter(|&i| i > 0 && text.as_bytes()[i] == b':')
}

fn check_scheme(scheme: &str) -> Result<(), &'static str> {
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if starts_alpha && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Ok(())
    } else {
        Err("invalid scheme")
    }
}

fn check_characters(text: &str) -> Result<(), &'static str> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escaped = bytes
                    .get(i + 1..i + 3)
                    .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
                if !escaped {
                    return Err("bad percent-encoding");
                }
                i += 3;
                continue;
            }
            b if b.is_ascii_alphanumeric() => {}
            b'-' | b'.' | b'_' | b'~' => {}
            b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@' => {}
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => {}
            _ => return Err("character not allowed in a URI"),
        }
        i += 1;
    }
    Ok(())
}

/// `[` and `]` may only delimit an IP literal host.
fn check_brackets(hier: &str) -> Result<(), &'static str> {
    let after_authority = match hier.strip_prefix("//") {
        Some(authority) => {
            let end = authority.find(['/', '?', '#']).unwrap_or(authority.len());
            &authority[end..]
        }
        None => hier,
    };
    if after_authority.contains(['[', ']']) {
        Err("'[' or ']' outside the host")
    } else {
        Ok(())
    }
}

impl fmt::Display for ReturnUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ReturnUri {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Url> for ReturnUri {
    fn from(url: Url) -> Self {
        Self(url.into())
    }
}

impl From<&Url> for ReturnUri {
    fn from(url: &Url) -> Self {
        Self(url.as_str().to_string())
    }
}

impl From<&ReturnUri> for ReturnUri {
    fn from(uri: &ReturnUri) -> Self {
        uri.clone()
    }
}

impl From<ReturnUri> for String {
    fn from(uri: ReturnUri) -> Self {
        uri.0
    }
}
