//! Open screen sessions, keyed by id

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A screen that can be looked up by id and closed
pub trait ScreenSession: Send + Sync {
    fn id(&self) -> Uuid;

    /// Cancel anything pending; the session refuses further submissions
    fn close(&self);
}

struct Entry<S> {
    session: Arc<S>,
    last_used: Mutex<Instant>,
}

impl<S> Entry<S> {
    fn touch(&self) {
        *self.last_used.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_used
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }
}

pub struct SessionRegistry<S> {
    label: &'static str,
    sessions: RwLock<HashMap<Uuid, Entry<S>>>,
}

impl<S: ScreenSession> SessionRegistry<S> {
    /// `label` names the session kind in "not found" errors
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, session: S) -> Arc<S> {
        let session = Arc::new(session);
        let entry = Entry {
            session: Arc::clone(&session),
            last_used: Mutex::new(Instant::now()),
        };
        self.sessions.write().await.insert(session.id(), entry);
        tracing::info!(id = %session.id(), kind = self.label, "Screen session opened");
        session
    }

    /// Look up a session and mark it as used
    pub async fn get(&self, id: Uuid) -> AppResult<Arc<S>> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(&id)
            .ok_or_else(|| AppError::NotFound(self.label.to_string()))?;
        entry.touch();
        Ok(Arc::clone(&entry.session))
    }

    /// Remove and close a session
    pub async fn close(&self, id: Uuid) -> AppResult<()> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(self.label.to_string()))?;
        entry.session.close();
        tracing::info!(%id, kind = self.label, "Screen session closed");
        Ok(())
    }

    /// Close every session unused for at least `max_idle`, returning how many
    pub async fn close_idle(&self, max_idle: Duration) -> usize {
        let stale: Vec<Entry<S>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| entry.idle_for() >= max_idle)
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };
        for entry in &stale {
            entry.session.close();
            tracing::info!(id = %entry.session.id(), kind = self.label, "Idle screen session closed");
        }
        stale.len()
    }

    pub async fn close_all(&self) {
        let sessions: Vec<_> = self.sessions.write().await.drain().collect();
        for (_, entry) in &sessions {
            entry.session.close();
        }
        if !sessions.is_empty() {
            tracing::info!(count = sessions.len(), kind = self.label, "Closed remaining sessions");
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
