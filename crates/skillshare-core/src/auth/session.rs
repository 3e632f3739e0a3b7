use std::fmt;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::storage::{TokenStorage, TOKEN_KEY};

/// Opaque session credential issued by the server.
///
/// Never empty. The client does not decode or inspect it; `Debug` output is
/// redacted so tokens do not end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token string. Returns `None` for an empty string.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Single source of truth for the current session token.
///
/// Construct one per process with [`SessionStore::open`], share it behind an
/// `Arc`, and hand consumers a [`super::SessionContext`]. Every update is
/// written to durable storage before subscribers see it.
pub struct SessionStore {
    storage: Mutex<Box<dyn TokenStorage>>,
    state: watch::Sender<Option<SessionToken>>,
}

impl SessionStore {
    /// Open the store, reading the persisted token exactly once.
    ///
    /// Unreadable storage is logged and treated as "no token"; the next
    /// `set` overwrites it.
    pub fn open(storage: impl TokenStorage + 'static) -> Self {
        let initial = match storage.load(TOKEN_KEY) {
            Ok(value) => value.and_then(SessionToken::new),
            Err(e) => {
                warn!(error = %e, "Failed to read stored session, starting signed out");
                None
            }
        };
        debug!(has_token = initial.is_some(), "Session store opened");

        let (state, _) = watch::channel(initial);
        Self {
            storage: Mutex::new(Box::new(storage)),
            state,
        }
    }

    /// Current token, if any
    pub fn get(&self) -> Option<SessionToken> {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Replace the current token.
    ///
    /// A non-empty token is persisted and becomes current. `None` or an empty
    /// string removes the stored token. Subscribers are notified after the
    /// durable write; if that write fails the in-memory state is untouched.
    pub fn set(&self, token: Option<String>) -> Result<()> {
        let token = token.and_then(SessionToken::new);

        // Held across write and notify so both happen in the same order
        let mut storage = self
            .storage
            .lock()
            .map_err(|_| anyhow!("Session storage lock poisoned"))?;

        match token {
            Some(ref t) => storage
                .store(TOKEN_KEY, t.as_str())
                .context("Failed to persist session token")?,
            None => storage
                .remove(TOKEN_KEY)
                .context("Failed to remove session token")?,
        }

        let authenticated = token.is_some();
        self.state.send_replace(token);
        info!(authenticated, "Session updated");
        Ok(())
    }

    /// Remove the current token
    pub fn clear(&self) -> Result<()> {
        self.set(None)
    }

    /// Register interest in session changes
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.state.subscribe(),
        }
    }
}

/// Receives session updates from a [`SessionStore`].
///
/// Always reflects the latest token; intermediate values between two reads
/// may be skipped.
#[derive(Clone)]
pub struct SessionSubscription {
    rx: watch::Receiver<Option<SessionToken>>,
}

impl SessionSubscription {
    /// Subscription that never changes and always reports no token
    pub(crate) fn detached() -> Self {
        let (_, rx) = watch::channel(None);
        Self { rx }
    }

    /// Latest token without marking it seen
    pub fn current(&self) -> Option<SessionToken> {
        self.rx.borrow().clone()
    }

    /// Whether the session changed since the last `mark_seen`/`changed`
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Latest token, marking it seen
    pub fn mark_seen(&mut self) -> Option<SessionToken> {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next change and return the new token
    pub async fn changed(&mut self) -> Result<Option<SessionToken>> {
        self.rx
            .changed()
            .await
            .context("Session store was dropped")?;
        Ok(self.mark_seen())
    }
}

// ============================================================================
// Tests
// ============================================================================
