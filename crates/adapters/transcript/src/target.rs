//! Which devices a spoken command reaches.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use porchlight_domain::error::ValidationError;
use serde::{Deserialize, Deserializer};

/// Every registered device, or the one at a given address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    All,
    Address(IpAddr),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Address(address) => address.fmt(f),
        }
    }
}

impl FromStr for Target {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed
            .parse()
            .map(Self::Address)
            .map_err(|_| ValidationError::InvalidAddress(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_all_case_insensitively() {
        assert_eq!("ALL".parse::<Target>().unwrap(), Target::All);
    }

    #[test]
    fn should_parse_single_address() {
        assert_eq!(
            "10.0.0.176".parse::<Target>().unwrap(),
            Target::Address("10.0.0.176".parse().unwrap())
        );
    }

    #[test]
    fn should_reject_anything_else() {
        assert!(matches!(
            "kitchen".parse::<Target>(),
            Err(ValidationError::InvalidAddress(_))
        ));
    }
}
