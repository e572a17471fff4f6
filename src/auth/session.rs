//! Session state shared across the whole app: who is signed in, which
//! sessions were signed out, and a broadcast of changes for observers.

use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::claims::Claims;

const EVENT_CAPACITY: usize = 64;

/// Authenticated identity resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub session_id: Uuid,
    #[serde(skip)]
    pub expires_at: usize,
}

impl From<Claims> for Identity {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            email: c.email,
            session_id: c.sid,
            expires_at: c.exp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: Uuid, session_id: Uuid },
    SignedOut { user_id: Uuid, session_id: Uuid },
}

pub struct SessionHub {
    // session id -> token expiry; entries are dropped once every token of the
    // session has expired anyway
    revoked: RwLock<HashMap<Uuid, usize>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            revoked: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn is_active(&self, session_id: Uuid) -> bool {
        !self.revoked.read().await.contains_key(&session_id)
    }

    pub fn signed_in(&self, user_id: Uuid, session_id: Uuid) {
        info!(%user_id, %session_id, "session started");
        self.publish(SessionEvent::SignedIn {
            user_id,
            session_id,
        });
    }

    /// Revokes every token of the identity's session.
    pub async fn sign_out(&self, identity: &Identity, refresh_expires_at: usize) {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        {
            let mut revoked = self.revoked.write().await;
            revoked.retain(|_, exp| *exp > now);
            revoked.insert(identity.session_id, refresh_expires_at.max(identity.expires_at));
        }
        info!(user_id = %identity.id, session_id = %identity.session_id, "session signed out");
        self.publish(SessionEvent::SignedOut {
            user_id: identity.id,
            session_id: identity.session_id,
        });
    }

    fn publish(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("no session subscribers");
        }
    }
}
