// order_wizard/src/machine/definition.rs

//! Contains the `WizardMachine` struct: the current state, the context it
//! exclusively owns, and the config used when the context is reinitialized.

use crate::config::WizardConfig;
use crate::core::context::WizardContext;
use crate::core::control::SessionStatus;
use crate::core::event::WizardEvent;
use crate::machine::state::WizardState;
use crate::machine::transitions::{global_transition, state_transition, Transition};

/// One wizard session's state machine.
///
/// Events are processed one at a time through `&mut self`; there is no
/// interleaving of two events against the same context.
#[derive(Debug, Clone)]
pub struct WizardMachine {
  pub(crate) state: WizardState,
  pub(crate) context: WizardContext,
  pub(crate) config: WizardConfig,
}

impl WizardMachine {
  /// A machine in the initial state with a fresh session context.
  pub fn new(config: WizardConfig) -> Self {
    let context = WizardContext::new_session(&config);
    Self {
      state: WizardState::INITIAL,
      context,
      config,
    }
  }

  /// Resumes a machine from an existing context, deriving the state from it.
  pub fn with_context(config: WizardConfig, context: WizardContext) -> Self {
    let context = context.normalized();
    Self {
      state: WizardState::from_context(&context),
      context,
      config,
    }
  }

  pub fn state(&self) -> WizardState {
    self.state
  }

  pub fn context(&self) -> &WizardContext {
    &self.context
  }

  pub fn config(&self) -> &WizardConfig {
    &self.config
  }

  pub fn status(&self) -> SessionStatus {
    if self.state.is_final() {
      SessionStatus::Completed
    } else {
      SessionStatus::Active
    }
  }

  pub fn session_id(&self) -> &str {
    &self.context.session.session_id
  }

  /// The transition `event` would select, before guards are evaluated.
  pub(crate) fn lookup(&self, event: &WizardEvent) -> Option<Transition> {
    if self.state.is_final() {
      return None;
    }
    global_transition(event).or_else(|| state_transition(self.state, event))
  }

  /// Whether `event` would be accepted right now. Evaluates guards only.
  pub fn can(&self, event: &WizardEvent) -> bool {
    match self.lookup(event) {
      Some(transition) => transition.rejected_by(&self.context, event).is_none(),
      None => false,
    }
  }
}
