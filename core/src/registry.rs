// order_wizard/src/registry.rs

//! Defines `SessionRegistry<S>`, the set of live wizard sessions keyed by the
//! id each was opened under. Every session owns its own context.

use crate::config::WizardConfig;
use crate::core::context::{WizardContext, WizardMode};
use crate::core::event::WizardEvent;
use crate::error::{WizardError, WizardResult};
use crate::services::WizardServices;
use crate::session::{DispatchReport, WizardSession};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

pub struct SessionRegistry<S: WizardServices> {
  config: WizardConfig,
  services: Arc<S>,
  sessions: Mutex<HashMap<String, Arc<WizardSession<S>>>>,
}

impl<S: WizardServices> SessionRegistry<S> {
  pub fn new(config: WizardConfig, services: Arc<S>) -> Self {
    Self {
      config,
      services,
      sessions: Mutex::new(HashMap::new()),
    }
  }

  pub fn config(&self) -> &WizardConfig {
    &self.config
  }

  /// Opens a fresh session with the registry's config and services.
  pub fn create(&self) -> WizardResult<Arc<WizardSession<S>>> {
    self.insert(WizardSession::new(self.config.clone(), Arc::clone(&self.services)))
  }

  /// Opens a session on an existing order in the given mode.
  pub fn create_for_order(&self, order_id: impl Into<String>, mode: WizardMode) -> WizardResult<Arc<WizardSession<S>>> {
    let context = WizardContext::for_order(&self.config, order_id, mode);
    self.insert(WizardSession::with_context(self.config.clone(), context, Arc::clone(&self.services)))
  }

  /// Registers an externally built session under its key.
  pub fn insert(&self, session: WizardSession<S>) -> WizardResult<Arc<WizardSession<S>>> {
    let key = session.key().to_string();
    let mut sessions = self.sessions.lock();
    if sessions.contains_key(&key) {
      event!(Level::WARN, session_key = %key, "Session already registered.");
      return Err(WizardError::SessionExists { session_id: key });
    }
    let session = Arc::new(session);
    sessions.insert(key.clone(), Arc::clone(&session));
    event!(Level::DEBUG, session_key = %key, total = sessions.len(), "Session registered.");
    Ok(session)
  }

  pub fn get(&self, key: &str) -> WizardResult<Arc<WizardSession<S>>> {
    self
      .sessions
      .lock()
      .get(key)
      .cloned()
      .ok_or_else(|| WizardError::SessionNotFound {
        session_id: key.to_string(),
      })
  }

  pub fn remove(&self, key: &str) -> WizardResult<Arc<WizardSession<S>>> {
    let removed = self.sessions.lock().remove(key);
    match removed {
      Some(session) => {
        event!(Level::DEBUG, session_key = %key, "Session removed.");
        Ok(session)
      }
      None => Err(WizardError::SessionNotFound {
        session_id: key.to_string(),
      }),
    }
  }

  pub fn contains(&self, key: &str) -> bool {
    self.sessions.lock().contains_key(key)
  }

  /// Registered keys, sorted.
  pub fn session_ids(&self) -> Vec<String> {
    let mut ids: Vec<String> = self.sessions.lock().keys().cloned().collect();
    ids.sort();
    ids
  }

  pub fn len(&self) -> usize {
    self.sessions.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.sessions.lock().is_empty()
  }

  /// Looks the session up and dispatches `event` to it.
  #[instrument(name = "SessionRegistry::dispatch", skip(self, event), fields(event_type = event.type_name()))]
  pub async fn dispatch(&self, key: &str, event: WizardEvent) -> WizardResult<DispatchReport> {
    let session = self.get(key)?;
    session.dispatch(event).await
  }

  /// Drops every session idle past the configured timeout and returns their keys.
  pub fn purge_expired(&self, now: DateTime<Utc>) -> Vec<String> {
    let mut sessions = self.sessions.lock();
    let expired: Vec<String> = sessions
      .iter()
      .filter(|(_, session)| session.is_expired_at(now))
      .map(|(key, _)| key.clone())
      .collect();
    for key in &expired {
      sessions.remove(key);
    }
    if !expired.is_empty() {
      event!(Level::INFO, purged = expired.len(), remaining = sessions.len(), "Expired sessions purged.");
    }
    expired
  }
}

impl<S: WizardServices> std::fmt::Debug for SessionRegistry<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionRegistry")
      .field("sessions", &self.session_ids())
      .finish_non_exhaustive()
  }
}
