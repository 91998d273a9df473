use crate::auth::{Identity, Role};
use crate::config::TokenEntry;
use crate::error::{AppError, Result};
use std::collections::HashMap;

/// Resolves credentials to identities and checks roles
pub trait IdentityGuard: Send + Sync {
    /// Resolve a bearer credential, failing with `Unauthorized`
    fn authenticate(&self, credential: &str) -> Result<Identity>;

    /// Check the identity holds one of `allowed`, failing with `Forbidden`
    fn authorize(&self, identity: &Identity, allowed: &[Role]) -> Result<Identity> {
        if identity.has_any_role(allowed) {
            Ok(identity.clone())
        } else {
            Err(AppError::Forbidden("Insufficient permissions".to_string()))
        }
    }
}

/// Bearer token table loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTokenGuard {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[TokenEntry]) -> Self {
        let tokens = entries
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    Identity::new(entry.user_id.clone(), entry.role),
                )
            })
            .collect();

        Self { tokens }
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityGuard for StaticTokenGuard {
    fn authenticate(&self, credential: &str) -> Result<Identity> {
        if credential.is_empty() {
            return Err(AppError::Unauthorized("Missing credentials".to_string()));
        }

        self.tokens
            .get(credential)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}
