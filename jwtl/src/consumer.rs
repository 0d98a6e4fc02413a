//! Identity payload carried by tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token type reported for every signed artifact.
pub const TOKEN_TYPE: &str = "jwt";

/// A signed token and its type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AuthToken {
    #[serde(rename = "type")]
    token_type: String,
    value: String,
}

impl AuthToken {
    /// Wrap an encoded JWT string.
    #[must_use]
    pub fn jwt(value: impl Into<String>) -> Self {
        Self {
            token_type: TOKEN_TYPE.to_string(),
            value: value.into(),
        }
    }

    /// Always [`TOKEN_TYPE`] for tokens produced by this crate.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Encoded `header.payload.signature` string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consume the token and return the encoded string.
    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// An API consumer as known to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Consumer {
    /// The ID of the API consumer.
    pub id: i64,
    /// The first name of the consumer.
    pub first_name: String,
    /// The last name of the consumer.
    pub last_name: String,
    /// The preferred language of the consumer.
    pub language: String,
    /// The role IDs that the consumer has. Never signed into a token.
    #[serde(default)]
    pub roles: Vec<i64>,
    /// The grants that the API consumer has.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grants: Vec<String>,
    /// The consumer's current access tokens. Never signed into a token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<AuthToken>,
}

impl Consumer {
    /// Create a consumer with no roles, grants or tokens.
    #[must_use]
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            language: language.into(),
            ..Self::default()
        }
    }

    /// Set the grants.
    #[must_use]
    pub fn with_grants<I, S>(mut self, grants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grants = grants.into_iter().map(Into::into).collect();
        self
    }

    /// Set the role IDs.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = i64>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Set the current tokens.
    #[must_use]
    pub fn with_tokens(mut self, tokens: impl IntoIterator<Item = AuthToken>) -> Self {
        self.tokens = tokens.into_iter().collect();
        self
    }

    /// Checks if the consumer possesses any of the given grants.
    #[must_use]
    pub fn has_grants(&self, grants: &[&str]) -> bool {
        has_any_grant(&self.grants, grants)
    }

    /// The subset of this consumer permitted inside a signed token.
    #[must_use]
    pub fn sanitised(&self) -> SanitisedConsumer {
        SanitisedConsumer::from(self)
    }
}

/// The consumer fields permitted inside signed claims.
///
/// Roles have no field here, so they cannot leak into a token through this
/// type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SanitisedConsumer {
    /// The ID of the API consumer.
    pub id: i64,
    /// The first name of the consumer.
    pub first_name: String,
    /// The last name of the consumer.
    pub last_name: String,
    /// The preferred language of the consumer.
    pub language: String,
    /// The grants that the API consumer has.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grants: Vec<String>,
    /// Always empty for consumers sanitised from a [`Consumer`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<AuthToken>,
}

impl SanitisedConsumer {
    /// Checks if the consumer possesses any of the given grants.
    #[must_use]
    pub fn has_grants(&self, grants: &[&str]) -> bool {
        has_any_grant(&self.grants, grants)
    }
}

impl From<&Consumer> for SanitisedConsumer {
    fn from(consumer: &Consumer) -> Self {
        Self {
            id: consumer.id,
            first_name: consumer.first_name.clone(),
            last_name: consumer.last_name.clone(),
            language: consumer.language.clone(),
            grants: consumer.grants.clone(),
            tokens: Vec::new(),
        }
    }
}

fn has_any_grant(held: &[String], wanted: &[&str]) -> bool {
    wanted.iter().any(|grant| held.iter().any(|g| g == grant))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Consumer {
        Consumer::new(7, "Ada", "Lovelace", "en")
            .with_grants(["read", "write"])
            .with_roles([1, 2])
            .with_tokens([AuthToken::jwt("a.b.c")])
    }

    #[test]
    fn test_sanitised_drops_roles_and_tokens() {
        let sanitised = sample().sanitised();
        assert_eq!(sanitised.id, 7);
        assert_eq!(sanitised.grants, vec!["read", "write"]);
        assert!(sanitised.tokens.is_empty());

        let json = serde_json::to_value(&sanitised).unwrap();
        assert!(json.get("roles").is_none());
        assert!(json.get("tokens").is_none());
    }

    #[test]
    fn test_has_grants() {
        let consumer = sample();
        assert!(consumer.has_grants(&["admin", "write"]));
        assert!(!consumer.has_grants(&["admin"]));
        assert!(!consumer.has_grants(&[]));
    }

    #[test]
    fn test_consumer_json_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["first_name"], "Ada");
        assert_eq!(json["roles"], serde_json::json!([1, 2]));
        assert_eq!(json["tokens"][0]["type"], "jwt");
        assert_eq!(json["tokens"][0]["value"], "a.b.c");
    }

    #[test]
    fn test_empty_grants_omitted() {
        let json = serde_json::to_value(Consumer::new(1, "a", "b", "en")).unwrap();
        assert!(json.get("grants").is_none());
        assert!(json.get("tokens").is_none());
        assert_eq!(json["roles"], serde_json::json!([]));
    }

    #[test]
    fn test_auth_token_display() {
        let token = AuthToken::jwt("x.y.z");
        assert_eq!(token.to_string(), "x.y.z");
        assert_eq!(token.token_type(), TOKEN_TYPE);
    }
}
