//! Identity — a transport address with an optional resource suffix.
//!
//! Chat transports address a client as `address/resource`, where the
//! resource names one connected session of the same account. Subscription
//! bookkeeping only ever uses the bare `address`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An address without any resource suffix, e.g. `alice@example.org`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BareIdentity(String);

impl BareIdentity {
    /// Borrow the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BareIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BareIdentity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            return Err(ValidationError::MalformedAddress);
        }
        validate_address(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for BareIdentity {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BareIdentity> for String {
    fn from(value: BareIdentity) -> Self {
        value.0
    }
}

/// A full sender identity: bare address plus optional resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity {
    bare: BareIdentity,
    resource: Option<String>,
}

impl Identity {
    /// The identity with its resource suffix stripped.
    #[must_use]
    pub fn bare(&self) -> &BareIdentity {
        &self.bare
    }

    /// The resource suffix, if any.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Consume the identity, keeping only the bare address.
    #[must_use]
    pub fn into_bare(self) -> BareIdentity {
        self.bare
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}/{resource}", self.bare),
            None => write!(f, "{}", self.bare),
        }
    }
}

impl FromStr for Identity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, resource) = match s.split_once('/') {
            Some((_, "")) => return Err(ValidationError::EmptyResource),
            Some((address, resource)) => (address, Some(resource)),
            None => (s, None),
        };
        validate_address(address)?;
        if let Some(resource) = resource
            && resource.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ValidationError::InvalidCharacter);
        }
        Ok(Self {
            bare: BareIdentity(address.to_string()),
            resource: resource.map(str::to_string),
        })
    }
}

impl TryFrom<String> for Identity {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.to_string()
    }
}

impl From<BareIdentity> for Identity {
    fn from(bare: BareIdentity) -> Self {
        Self {
            bare,
            resource: None,
        }
    }
}

fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.is_empty() {
        return Err(ValidationError::EmptyAddress);
    }
    if address.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidCharacter);
    }
    if let Some((local, domain)) = address.split_once('@')
        && (local.is_empty() || domain.is_empty() || domain.contains('@'))
    {
        return Err(ValidationError::MalformedAddress);
    }
    Ok(())
}
