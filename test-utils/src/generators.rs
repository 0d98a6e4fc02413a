//! Shared proptest generators.

use jwtl::{AuthToken, Consumer};
use proptest::prelude::*;

/// Generate issuer names.
pub fn issuer_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 -]{0,39}"
}

/// Generate human names, including non-ASCII letters.
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-zÀ-ÿ' -]{0,24}"
}

/// Generate language tags.
pub fn language_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("en".to_string()),
        Just("fr".to_string()),
        Just("de".to_string()),
        Just("pt-BR".to_string()),
        "[a-z]{2}",
    ]
}

/// Generate grant lists.
pub fn grants_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z_.:]{0,15}", 0..6)
}

/// Generate role ID lists.
pub fn roles_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(any::<i64>(), 0..5)
}

/// Generate opaque token lists as a consumer might already hold.
pub fn held_tokens_strategy() -> impl Strategy<Value = Vec<AuthToken>> {
    prop::collection::vec(
        "[A-Za-z0-9_-]{4,16}\\.[A-Za-z0-9_-]{4,16}\\.[A-Za-z0-9_-]{4,16}".prop_map(AuthToken::jwt),
        0..3,
    )
}

/// Generate consumers, with roles and held tokens set some of the time.
pub fn consumer_strategy() -> impl Strategy<Value = Consumer> {
    (
        any::<i64>(),
        name_strategy(),
        name_strategy(),
        language_strategy(),
        grants_strategy(),
        roles_strategy(),
        held_tokens_strategy(),
    )
        .prop_map(|(id, first_name, last_name, language, grants, roles, tokens)| Consumer {
            id,
            first_name,
            last_name,
            language,
            roles,
            grants,
            tokens,
        })
}
