// order_wizard/src/session/definition.rs

//! Contains the `WizardSession` struct and its read-side accessors.

use crate::config::WizardConfig;
use crate::core::context::WizardContext;
use crate::core::context_data::ContextData;
use crate::core::control::SessionStatus;
use crate::core::event::WizardEvent;
use crate::machine::definition::WizardMachine;
use crate::machine::guards;
use crate::machine::state::WizardState;
use crate::services::WizardServices;
use crate::session::hooks::TransitionHook;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// One wizard session: the machine that owns its context, the services it
/// calls, and the observers notified of accepted transitions.
///
/// `key` is the id the session was opened under. `RESET` issues a fresh
/// `session_id` inside the context, the key stays put.
pub struct WizardSession<S: WizardServices> {
  pub(crate) key: String,
  pub(crate) machine: ContextData<WizardMachine>,
  pub(crate) services: Arc<S>,
  pub(crate) hooks: RwLock<Vec<TransitionHook>>,
}

impl<S: WizardServices> WizardSession<S> {
  pub fn new(config: WizardConfig, services: Arc<S>) -> Self {
    Self::from_machine(WizardMachine::new(config), services)
  }

  /// Resumes a session over an existing context (e.g. a loaded draft).
  pub fn with_context(config: WizardConfig, context: WizardContext, services: Arc<S>) -> Self {
    Self::from_machine(WizardMachine::with_context(config, context), services)
  }

  pub fn from_machine(machine: WizardMachine, services: Arc<S>) -> Self {
    Self {
      key: machine.session_id().to_string(),
      machine: ContextData::new(machine),
      services,
      hooks: RwLock::new(Vec::new()),
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn session_id(&self) -> String {
    self.machine.read().session_id().to_string()
  }

  pub fn state(&self) -> WizardState {
    self.machine.read().state()
  }

  pub fn status(&self) -> SessionStatus {
    self.machine.read().status()
  }

  /// Owned copy of the current context.
  pub fn context(&self) -> WizardContext {
    self.machine.map_read(|machine| &machine.context).clone()
  }

  /// Owned copy of the whole machine (state, context, config).
  pub fn snapshot(&self) -> WizardMachine {
    self.machine.snapshot()
  }

  /// Shared handle to the machine, for callers that want to read it directly.
  pub fn handle(&self) -> ContextData<WizardMachine> {
    self.machine.clone()
  }

  pub fn services(&self) -> &Arc<S> {
    &self.services
  }

  pub fn can(&self, event: &WizardEvent) -> bool {
    self.machine.read().can(event)
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    let machine = self.machine.read();
    guards::is_session_expired(machine.context(), now, machine.config().session_timeout())
  }

  pub fn should_warn_at(&self, now: DateTime<Utc>) -> bool {
    let machine = self.machine.read();
    guards::should_warn_session(machine.context(), now, machine.config().session_warning())
  }
}

impl<S: WizardServices> std::fmt::Debug for WizardSession<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let machine = self.machine.read();
    f.debug_struct("WizardSession")
      .field("key", &self.key)
      .field("state", &machine.state())
      .field("session_id", &machine.session_id())
      .field("hooks", &self.hooks.read().len())
      .finish_non_exhaustive()
  }
}
