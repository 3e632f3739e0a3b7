use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use super::session::{SessionStore, SessionSubscription, SessionToken};

/// Handle that distributes the session to every consumer.
///
/// Exposes the current token and a setter with the same contract as
/// [`SessionStore::set`]. Clones are cheap and all point at the same store.
/// A context built with `Default` has no store: it reports no token and
/// ignores `set_token`.
#[derive(Clone, Default)]
pub struct SessionContext {
    store: Option<Arc<SessionStore>>,
}

impl SessionContext {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Current token, if any
    pub fn token(&self) -> Option<SessionToken> {
        self.store.as_ref().and_then(|s| s.get())
    }

    /// Replace or clear the current token
    pub fn set_token(&self, token: Option<String>) -> Result<()> {
        match self.store {
            Some(ref store) => store.set(token),
            None => {
                debug!("set_token called on a context without a session store");
                Ok(())
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store
            .as_ref()
            .map(|s| s.is_authenticated())
            .unwrap_or(false)
    }

    /// Register interest in session changes
    pub fn subscribe(&self) -> SessionSubscription {
        match self.store {
            Some(ref store) => store.subscribe(),
            None => SessionSubscription::detached(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStorage, TOKEN_KEY};

    #[test]
    fn test_default_context_has_no_token() {
        let context = SessionContext::default();
        assert!(context.token().is_none());
        assert!(!context.is_authenticated());

        // Setter is a no-op without a store
        context.set_token(Some("tok-abc".to_string())).unwrap();
        assert!(context.token().is_none());
    }

    #[test]
    fn test_clones_share_the_store() {
        let storage = MemoryStorage::new();
        let context = SessionContext::new(Arc::new(SessionStore::open(storage.clone())));
        let other = context.clone();

        other.set_token(Some("tok-abc".to_string())).unwrap();
        assert_eq!(context.token().unwrap().as_str(), "tok-abc");
        assert!(context.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok-abc"));
    }

    #[test]
    fn test_subscription_sees_updates_from_any_clone() {
        let context = SessionContext::new(Arc::new(SessionStore::open(MemoryStorage::new())));
        let mut sub = context.subscribe();

        context.clone().set_token(Some("tok-abc".to_string())).unwrap();
        assert!(sub.has_changed());
        assert_eq!(sub.mark_seen().unwrap().as_str(), "tok-abc");
    }
}
