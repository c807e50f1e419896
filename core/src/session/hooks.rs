// order_wizard/src/session/hooks.rs

//! Observers called after every accepted state transition.

use crate::core::control::TransitionOutcome;
use crate::machine::state::WizardState;
use crate::services::WizardServices;
use crate::session::definition::WizardSession;
use std::sync::Arc;
use tracing::{event, Level};

/// What an observer is told about an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
  pub from: WizardState,
  pub to: WizardState,
  /// `type` of the inbound event, or of the service result that caused it.
  pub event: &'static str,
}

pub type TransitionHook = Arc<dyn Fn(&TransitionRecord) + Send + Sync>;

impl<S: WizardServices> WizardSession<S> {
  /// Registers an observer. Hooks run synchronously in registration order and
  /// must not dispatch back into the same session.
  pub fn on_transition(&self, hook: impl Fn(&TransitionRecord) + Send + Sync + 'static) {
    self.hooks.write().push(Arc::new(hook));
  }

  pub fn hook_count(&self) -> usize {
    self.hooks.read().len()
  }

  pub(crate) fn notify(&self, outcome: &TransitionOutcome, event_name: &'static str) {
    let TransitionOutcome::Transitioned { from, to, .. } = outcome else {
      return;
    };
    let record = TransitionRecord {
      from: *from,
      to: *to,
      event: event_name,
    };
    // Clone the list so a hook registering another hook cannot deadlock.
    let hooks: Vec<TransitionHook> = self.hooks.read().clone();
    event!(Level::TRACE, hooks = hooks.len(), from = %record.from, to = %record.to, "Notifying transition hooks.");
    for hook in hooks {
      hook(&record);
    }
  }
}
