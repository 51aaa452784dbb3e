use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::RwLock;
use uuid::Uuid;

/// Session state for one logged-in user.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub email: String,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

impl SessionData {
    fn new(email: String, ttl: Duration) -> Self {
        let now = SystemTime::now();
        Self {
            email,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

/// In-memory session store mapping opaque tokens to authenticated identities.
///
/// Sessions do not survive a process restart; acceptable for this scope.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
    ttl: Duration,
}

impl SessionManager {
    /// Creates a SessionManager with the default 24 hour session lifetime.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(24 * 60 * 60))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Creates a session for `email` and returns the opaque token.
    pub async fn create(&self, email: &str) -> String {
        let token = Uuid::new_v4().to_string();
        let session = SessionData::new(email.to_string(), self.ttl);

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);

        tracing::debug!("Created session for {}", email);
        token
    }

    /// Resolves a token to the identity it was issued for, if still valid.
    pub async fn resolve(&self, token: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| !s.is_expired())
            .map(|s| s.email.clone())
    }

    /// Invalidates a session immediately. Unknown tokens are a no-op.
    pub async fn destroy(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.remove(token) {
            tracing::debug!("Destroyed session for {}", session.email);
        }
    }

    /// Removes expired sessions; returns how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();

        sessions.retain(|_, session| !session.is_expired());

        let removed = initial_count - sessions.len();
        if removed > 0 {
            tracing::info!("Cleaned up {} expired sessions", removed);
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
