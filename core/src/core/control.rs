// order_wizard/src/core/control.rs

//! Outcomes of dispatching an event, and the service work a transition asks for.

use crate::core::event::WizardEvent;
use crate::machine::state::WizardState;

/// The collaborating service a state or global handler wants invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
  ValidateStep,
  AutoSave,
  SaveDraft,
  RestoreDraft,
  CompleteWizard,
}

/// A pending service invocation, carrying the event that triggered it.
///
/// The machine never performs the call itself; the session driver does and
/// feeds the result back as a `ServiceEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
  pub service: ServiceKind,
  pub event: WizardEvent,
}

impl ServiceRequest {
  pub fn new(service: ServiceKind, event: WizardEvent) -> Self {
    Self { service, event }
  }
}

/// Why an event left the machine untouched. Absorption is normal control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorbReason {
  /// The current state defines no transition for the event.
  NoTransition,
  /// A transition exists but the named guard evaluated false.
  GuardRejected { guard: &'static str },
  /// The machine reached `completed`; nothing leaves it.
  FinalState,
}

/// Result of `WizardMachine::send`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
  /// A state transition fired and its actions were applied.
  Transitioned {
    from: WizardState,
    to: WizardState,
    requests: Vec<ServiceRequest>,
  },
  /// A root-level handler accepted the event without changing state.
  Handled { requests: Vec<ServiceRequest> },
  /// Nothing changed: no state, no context.
  Absorbed(AbsorbReason),
}

impl TransitionOutcome {
  pub fn is_absorbed(&self) -> bool {
    matches!(self, TransitionOutcome::Absorbed(_))
  }

  pub fn is_transition(&self) -> bool {
    matches!(self, TransitionOutcome::Transitioned { .. })
  }

  pub fn requests(&self) -> &[ServiceRequest] {
    match self {
      TransitionOutcome::Transitioned { requests, .. } | TransitionOutcome::Handled { requests } => requests,
      TransitionOutcome::Absorbed(_) => &[],
    }
  }

  pub fn into_requests(self) -> Vec<ServiceRequest> {
    match self {
      TransitionOutcome::Transitioned { requests, .. } | TransitionOutcome::Handled { requests } => requests,
      TransitionOutcome::Absorbed(_) => Vec::new(),
    }
  }
}

/// Whether a session can still accept events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
  Active,
  Completed,
}
