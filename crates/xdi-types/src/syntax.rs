//! # Address Syntax
//!
//! Validated XDI addresses and the two identifier forms Connect cares about:
//!
//! - **Cloud name**: human-meaningful, e.g. `=alice`, `+acme`
//! - **Cloud number**: canonical and persistent, e.g. `[=]!:uuid:1111`
//!
//! Only the structural rules needed to tell these apart are enforced. The full
//! XDI grammar is out of scope.

use crate::errors::XdiError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Characters a non-root address may start with.
const CONTEXT_SYMBOLS: [char; 10] = ['=', '+', '*', '!', '$', '[', '(', '<', '{', '#'];

/// Cloud number class prefixes (person, organisation).
const CLOUD_NUMBER_CLASSES: [&str; 2] = ["[=]", "[+]"];

/// Cloud number segment prefix after the `!` symbol.
const UUID_SEGMENT_PREFIX: &str = ":uuid:";

// =============================================================================
// XDI ADDRESS
// =============================================================================

/// A structurally valid XDI address.
///
/// The empty address is the graph root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct XdiAddress(String);

impl XdiAddress {
    /// The root address (empty string).
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse and validate an address.
    pub fn parse(address: &str) -> Result<Self, XdiError> {
        validate_address(address)?;
        Ok(Self(address.to_string()))
    }

    /// Wrap text that is valid by construction.
    pub(crate) fn from_trusted(address: String) -> Self {
        Self(address)
    }

    /// Build an address from a literal known to be valid.
    ///
    /// Validity is only checked in debug builds.
    pub fn from_static(address: &'static str) -> Self {
        debug_assert!(
            validate_address(address).is_ok(),
            "invalid static XDI address: {address}"
        );
        Self(address.to_string())
    }

    /// The address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the root address.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenate two addresses.
    ///
    /// Both sides are already valid, so the result is valid as well.
    pub fn join(&self, other: &XdiAddress) -> XdiAddress {
        XdiAddress(format!("{}{}", self.0, other.0))
    }

    /// True if the address ends with the given subsegment text.
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }
}

impl Borrow<str> for XdiAddress {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for XdiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for XdiAddress {
    type Err = XdiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for XdiAddress {
    type Error = XdiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_address(&value)?;
        Ok(Self(value))
    }
}

impl From<XdiAddress> for String {
    fn from(address: XdiAddress) -> Self {
        address.0
    }
}

fn validate_address(address: &str) -> Result<(), XdiError> {
    let invalid = |reason: &str| XdiError::InvalidAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let Some(first) = address.chars().next() else {
        return Ok(());
    };

    if !CONTEXT_SYMBOLS.contains(&first) {
        return Err(invalid("must start with a context symbol"));
    }
    if address.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let mut open = Vec::new();
    for c in address.chars() {
        match c {
            '[' | '(' | '<' | '{' => open.push(c),
            ']' | ')' | '>' | '}' => {
                let expected = match c {
                    ']' => '[',
                    ')' => '(',
                    '>' => '<',
                    _ => '{',
                };
                if open.pop() != Some(expected) {
                    return Err(invalid("unbalanced brackets"));
                }
            }
            _ => {}
        }
    }
    if !open.is_empty() {
        return Err(invalid("unbalanced brackets"));
    }

    Ok(())
}

// =============================================================================
// CLOUD NAME
// =============================================================================

/// Human-meaningful identity name such as `=alice` or `+acme`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CloudName(XdiAddress);

impl CloudName {
    /// Parse a cloud name.
    pub fn parse(name: &str) -> Result<Self, XdiError> {
        let address = XdiAddress::parse(name)?;
        Self::from_address(&address).ok_or_else(|| XdiError::InvalidCloudName(name.to_string()))
    }

    /// Interpret an address as a cloud name, if it has that form.
    pub fn from_address(address: &XdiAddress) -> Option<Self> {
        let text = address.as_str();
        let valid = text.len() > 1
            && (text.starts_with('=') || text.starts_with('+'))
            && !text.contains('!');
        valid.then(|| Self(address.clone()))
    }

    /// The underlying address.
    pub fn address(&self) -> &XdiAddress {
        &self.0
    }
}

impl fmt::Display for CloudName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CloudName {
    type Err = XdiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CloudName {
    type Error = XdiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CloudName> for String {
    fn from(name: CloudName) -> Self {
        name.0.into()
    }
}

// =============================================================================
// CLOUD NUMBER
// =============================================================================

/// Canonical identifier such as `[=]!:uuid:1111`.
///
/// Form: a class (`[=]` person, `[+]` organisation) followed by one or more
/// `!:uuid:<id>` segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CloudNumber(XdiAddress);

impl CloudNumber {
    /// Parse a cloud number.
    pub fn parse(number: &str) -> Result<Self, XdiError> {
        let address = XdiAddress::parse(number)?;
        Self::from_address(&address)
            .ok_or_else(|| XdiError::InvalidCloudNumber(number.to_string()))
    }

    /// Interpret an address as a cloud number, if it has that form.
    pub fn from_address(address: &XdiAddress) -> Option<Self> {
        is_cloud_number(address.as_str()).then(|| Self(address.clone()))
    }

    /// Generate a fresh person cloud number (`[=]!:uuid:<v4>`).
    pub fn random_person() -> Self {
        Self(XdiAddress(format!("[=]!:uuid:{}", uuid::Uuid::new_v4())))
    }

    /// Generate a fresh organisation cloud number (`[+]!:uuid:<v4>`).
    pub fn random_organization() -> Self {
        Self(XdiAddress(format!("[+]!:uuid:{}", uuid::Uuid::new_v4())))
    }

    /// True for the `[=]` class.
    pub fn is_person(&self) -> bool {
        self.0.as_str().starts_with("[=]")
    }

    /// The underlying address.
    pub fn address(&self) -> &XdiAddress {
        &self.0
    }
}

fn is_cloud_number(text: &str) -> bool {
    let Some(rest) = CLOUD_NUMBER_CLASSES
        .iter()
        .find_map(|class| text.strip_prefix(*class))
    else {
        return false;
    };

    let Some(rest) = rest.strip_prefix('!') else {
        return false;
    };

    rest.split('!').all(|segment| {
        segment
            .strip_prefix(UUID_SEGMENT_PREFIX)
            .is_some_and(|id| {
                !id.is_empty()
                    && id
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
            })
    })
}

impl fmt::Display for CloudNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CloudNumber {
    type Err = XdiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CloudNumber {
    type Error = XdiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CloudNumber> for String {
    fn from(number: CloudNumber) -> Self {
        number.0.into()
    }
}
