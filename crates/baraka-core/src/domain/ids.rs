use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable customer identifier, stored as its hyphenated UUID text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CustomerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::CustomerId;
    use std::str::FromStr;

    #[test]
    fn customer_id_roundtrips_through_display() {
        let id = CustomerId::new();
        let parsed = CustomerId::from_str(&id.to_string()).expect("parse id");
        assert_eq!(parsed, id);
    }

    #[test]
    fn customer_id_rejects_garbage() {
        assert!(CustomerId::from_str("not-a-uuid").is_err());
    }
}
