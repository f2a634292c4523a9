use super::ports::IdentityProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stable key scoping a remote cart, e.g. the signed-in username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Guest,
    Authenticated(IdentityKey),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }

    pub fn key(&self) -> Option<&IdentityKey> {
        match self {
            Identity::Guest => None,
            Identity::Authenticated(key) => Some(key),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Guest => f.write_str("guest"),
            Identity::Authenticated(key) => write!(f, "{key}"),
        }
    }
}

/// Shared, mutable session identity.
///
/// Clones share the same state, so the login flow can hold one handle while the
/// cart engine reads through another.
#[derive(Debug, Default, Clone)]
pub struct SessionIdentity {
    current: Arc<RwLock<Identity>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated(key: impl Into<String>) -> Self {
        Self {
            current: Arc::new(RwLock::new(Identity::Authenticated(IdentityKey::new(key)))),
        }
    }

    pub async fn sign_in(&self, key: impl Into<String>) {
        *self.current.write().await = Identity::Authenticated(IdentityKey::new(key));
    }

    pub async fn sign_out(&self) {
        *self.current.write().await = Identity::Guest;
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn current(&self) -> Identity {
        self.current.read().await.clone()
    }
}
