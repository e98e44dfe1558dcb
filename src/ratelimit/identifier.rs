//! Rate-limit partition keys.

use crate::error::{GuardError, Result};

/// A validated, non-empty rate-limit key.
///
/// Submission traffic uses two families of keys, `IP_<address>` and
/// `PHONE_<number>`, but any non-empty string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Create an identifier from a raw key.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(GuardError::invalid("rate limit identifier must not be empty"));
        }
        Ok(Self(raw))
    }

    /// Key for a client address.
    pub fn ip(address: &str) -> Self {
        Self(format!("IP_{}", address))
    }

    /// Key for a donor phone number.
    pub fn phone(number: &str) -> Self {
        Self(format!("PHONE_{}", number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_identifier_rejected() {
        assert!(matches!(Identifier::new(""), Err(GuardError::InvalidInput(_))));
    }

    #[test]
    fn test_prefixed_constructors() {
        assert_eq!(Identifier::ip("10.0.0.1").as_str(), "IP_10.0.0.1");
        assert_eq!(Identifier::phone("0512345678").to_string(), "PHONE_0512345678");
    }

    #[test]
    fn test_ip_and_phone_keys_never_collide() {
        assert_ne!(Identifier::ip("0512345678"), Identifier::phone("0512345678"));
    }
}
