//! Identity
//!
//! Read-only view of who is shopping. The storefront keeps the session elsewhere; checkout only
//! asks whether someone is signed in and which user id to place the order under.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Identifier of the customer placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Source of the shopper's sign-in state and user id.
#[automock]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Whether the shopper is signed in.
    async fn is_authenticated(&self) -> bool;

    /// User id carried by the session token, if any.
    async fn token_user_id(&self) -> Option<UserId>;

    /// User id of the locally cached profile, if any.
    async fn cached_user_id(&self) -> Option<UserId>;
}

/// Resolve the user id to place an order under.
///
/// Prefers the id carried by the session token and falls back to the cached profile. Empty ids
/// count as missing.
pub async fn resolve_user_id(resolver: &dyn IdentityResolver) -> Option<UserId> {
    if let Some(id) = resolver.token_user_id().await.filter(|id| !id.as_str().is_empty()) {
        return Some(id);
    }

    resolver
        .cached_user_id()
        .await
        .filter(|id| !id.as_str().is_empty())
}

/// Identity fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    authenticated: bool,
    token_user_id: Option<UserId>,
    cached_user_id: Option<UserId>,
}

impl StaticIdentity {
    /// A shopper who is not signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in shopper whose token carries `user_id`.
    #[must_use]
    pub fn signed_in(user_id: impl Into<UserId>) -> Self {
        Self {
            authenticated: true,
            token_user_id: Some(user_id.into()),
            cached_user_id: None,
        }
    }

    /// Set the cached profile id.
    #[must_use]
    pub fn with_cached_user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.cached_user_id = Some(user_id.into());
        self
    }

    /// Set whether the shopper counts as signed in.
    #[must_use]
    pub fn with_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn token_user_id(&self) -> Option<UserId> {
        self.token_user_id.clone()
    }

    async fn cached_user_id(&self) -> Option<UserId> {
        self.cached_user_id.clone()
    }
}
