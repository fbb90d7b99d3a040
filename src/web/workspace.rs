//! Per-session admin state.
//!
//! Each logged-in session owns one controller per resource. Handlers lock
//! a controller only for the synchronous prepare/finish steps; requests
//! to the backend run with the lock released. A workspace lives until
//! logout or until its session cookie expires, whichever comes first.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time;
use tracing::{debug, info};

use crate::models::{Curso, Docente, OfertaCurso};
use crate::resource::{ResourceController, WritePolicy};

#[derive(Debug)]
pub struct Workspace {
    pub cursos: Mutex<ResourceController<Curso>>,
    pub docentes: Mutex<ResourceController<Docente>>,
    pub ofertas: Mutex<ResourceController<OfertaCurso>>,
}

impl Workspace {
    pub fn new(policy: WritePolicy) -> Self {
        Workspace {
            cursos: Mutex::new(ResourceController::new(policy)),
            docentes: Mutex::new(ResourceController::new(policy)),
            ofertas: Mutex::new(ResourceController::new(policy)),
        }
    }
}

#[derive(Debug)]
struct Entry {
    workspace: Arc<Workspace>,
    /// Session expiry (Unix timestamp)
    expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct Workspaces {
    inner: Arc<DashMap<String, Entry>>,
    policy: WritePolicy,
}

impl Workspaces {
    pub fn new(policy: WritePolicy) -> Self {
        Workspaces {
            inner: Arc::new(DashMap::new()),
            policy,
        }
    }

    /// Workspace for session `sid`, which expires at `expires_at`. Opening
    /// a new workspace first evicts the ones whose session is over.
    pub fn get_or_create(&self, sid: &str, expires_at: i64) -> Arc<Workspace> {
        if !self.inner.contains_key(sid) {
            self.evict_expired(Utc::now().timestamp());
        }

        self.inner
            .entry(sid.to_string())
            .or_insert_with(|| {
                debug!("New admin workspace for session {}", sid);
                Entry {
                    workspace: Arc::new(Workspace::new(self.policy)),
                    expires_at,
                }
            })
            .workspace
            .clone()
    }

    /// Drop everything held for a session (logout)
    pub fn remove(&self, sid: &str) -> bool {
        self.inner.remove(sid).is_some()
    }

    /// Drop workspaces whose session expired at or before `now`
    pub fn evict_expired(&self, now: i64) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.expires_at > now);
        let evicted = before.saturating_sub(self.inner.len());
        if evicted > 0 {
            info!("Evicted {} expired admin workspace(s)", evicted);
        }
        evicted
    }

    /// Periodic eviction for sessions that are never seen again
    pub fn start_sweep_task(&self, every: Duration) {
        let workspaces = self.clone();
        tokio::spawn(async move {
            let mut interval = time::interval(every);
            loop {
                interval.tick().await;
                workspaces.evict_expired(Utc::now().timestamp());
            }
        });
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
