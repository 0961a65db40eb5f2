use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque roster entry (a registration number on the result site).
///
/// Used both as the canary probe target and as the fetch key of a bulk run.
/// Uniqueness across a roster is assumed, not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_value() {
        let id = Identifier::from("22156148040");
        assert_eq!(id.to_string(), "22156148040");
        assert_eq!(id.as_str(), "22156148040");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = Identifier::new("23101148901");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""23101148901""#);
    }
}
