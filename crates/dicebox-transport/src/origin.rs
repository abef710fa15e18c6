//! Which browser origins may open a connection.

use std::str::FromStr;

use crate::TransportError;

/// Allowed values of the `Origin` handshake header.
///
/// Only browsers send `Origin`; a handshake without one is always
/// admitted, so native clients and tests are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OriginPolicy {
    /// Admit every origin.
    #[default]
    Any,
    /// Admit only these exact origins, e.g. `https://play.example.com`.
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Parses a setting: `*` (or empty) means any origin, otherwise a
    /// comma-separated list. Trailing slashes are ignored.
    ///
    /// A list with no entries (e.g. `","`) is an error rather than a
    /// policy that refuses every browser.
    pub fn parse(setting: &str) -> Result<Self, TransportError> {
        let trimmed = setting.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(Self::Any);
        }
        let origins: Vec<String> = trimmed
            .split(',')
            .map(normalize)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() {
            return Err(TransportError::InvalidOriginPolicy(setting.to_string()));
        }
        Ok(Self::AllowList(origins))
    }

    /// Checks an `Origin` header value (`None` when absent).
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match (self, origin) {
            (Self::Any, _) | (_, None) => true,
            (Self::AllowList(list), Some(origin)) => {
                let origin = normalize(origin);
                list.iter().any(|allowed| allowed.eq_ignore_ascii_case(origin))
            }
        }
    }
}

impl FromStr for OriginPolicy {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn normalize(origin: &str) -> &str {
    origin.trim().trim_end_matches('/')
}
