//! Credential registry for ingress authentication.
//!
//! Each configured `username:password` pair is hashed with MD5 once at
//! startup and the lowercase hex digest becomes the lookup key. Clients send
//! that digest verbatim in the `Authorization` header; the inbound value is
//! never hashed. This means the header carries a password-equivalent token
//! rather than a secret the server can verify, so deployments must keep the
//! relay behind TLS.

use crate::config::UserSettings;
use std::collections::HashMap;

/// Compute the credential digest for an identity/secret pair.
pub fn credential_digest(identity: &str, secret: &str) -> String {
    let digest = md5::compute(format!("{identity}:{secret}"));
    hex::encode(digest.0)
}

/// Read-only mapping from credential digest to identity.
#[derive(Debug, Default, Clone)]
pub struct CredentialRegistry {
    identities: HashMap<String, String>,
}

impl CredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users(users: &[UserSettings]) -> Self {
        let mut registry = Self::new();
        for user in users {
            registry.register(&user.username, &user.password);
        }
        registry
    }

    /// Add one credential. A later pair with the same digest replaces the earlier one.
    pub fn register(&mut self, identity: &str, secret: &str) {
        self.identities
            .insert(credential_digest(identity, secret), identity.to_string());
    }

    /// Resolve a presented token to its identity.
    pub fn authenticate(&self, token: &str) -> Option<&str> {
        self.identities.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
