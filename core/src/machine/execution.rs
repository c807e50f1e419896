// order_wizard/src/machine/execution.rs

//! Contains `WizardMachine::send()` and `WizardMachine::resolve()`: guarded
//! transition selection, action application and service result re-injection.

use crate::core::catalog::{StepOrder, WizardStep};
use crate::core::control::{AbsorbReason, ServiceRequest, TransitionOutcome};
use crate::core::event::{ServiceEvent, WizardEvent};
use crate::machine::actions::{self, ContextPatch};
use crate::machine::definition::WizardMachine;
use crate::machine::state::WizardState;
use crate::machine::transitions::ActionEnv;
use chrono::{DateTime, Utc};
use tracing::{event, instrument, Level};

impl WizardMachine {
  /// Dispatches an inbound event.
  ///
  /// Returns `Absorbed` (and changes nothing) when no transition exists or a
  /// guard rejects. Otherwise applies the transition's actions in order and
  /// returns the service requests it raised.
  pub fn send(&mut self, event: WizardEvent) -> TransitionOutcome {
    self.send_at(event, Utc::now())
  }

  #[instrument(
    name = "WizardMachine::send",
    skip_all,
    fields(
      event_type = event.type_name(),
      state = %self.state,
      session_id = %self.context.session.session_id,
    )
  )]
  pub fn send_at(&mut self, event: WizardEvent, now: DateTime<Utc>) -> TransitionOutcome {
    if self.state.is_final() {
      event!(Level::DEBUG, "Machine is in its final state, event absorbed.");
      return TransitionOutcome::Absorbed(AbsorbReason::FinalState);
    }

    let Some(transition) = self.lookup(&event) else {
      event!(Level::DEBUG, "No transition for event in current state, absorbed.");
      return TransitionOutcome::Absorbed(AbsorbReason::NoTransition);
    };

    if let Some(guard) = transition.rejected_by(&self.context, &event) {
      event!(Level::DEBUG, guard, "Guard rejected transition, event absorbed.");
      return TransitionOutcome::Absorbed(AbsorbReason::GuardRejected { guard });
    }

    let env = ActionEnv {
      now,
      config: &self.config,
    };
    let mut next_context = self.context.clone();
    for action in transition.actions {
      let patch = (action.run)(&next_context, &event, &env);
      if patch.is_empty() {
        event!(Level::TRACE, action = action.name, "Action produced no changes.");
        continue;
      }
      event!(Level::TRACE, action = action.name, "Applying action.");
      patch.apply(&mut next_context);
    }
    self.context = next_context;

    let requests: Vec<ServiceRequest> = transition
      .services
      .iter()
      .map(|service| ServiceRequest::new(*service, event.clone()))
      .collect();

    match transition.target {
      Some(target) => {
        let from = self.state;
        self.state = target;
        event!(Level::INFO, from = %from, to = %target, "Transition accepted.");
        TransitionOutcome::Transitioned { from, to: target, requests }
      }
      None => {
        event!(Level::DEBUG, services = requests.len(), "Event handled without state change.");
        TransitionOutcome::Handled { requests }
      }
    }
  }

  /// Feeds a service result back into the machine.
  pub fn resolve(&mut self, result: ServiceEvent) -> TransitionOutcome {
    self.resolve_at(result, Utc::now())
  }

  #[instrument(
    name = "WizardMachine::resolve",
    skip_all,
    fields(
      result_type = result.type_name(),
      state = %self.state,
      session_id = %self.context.session.session_id,
    )
  )]
  pub fn resolve_at(&mut self, result: ServiceEvent, now: DateTime<Utc>) -> TransitionOutcome {
    match result {
      ServiceEvent::WizardCompleted(completion) => {
        if !self.state.is_final() {
          event!(Level::WARN, "Completion result outside the completed state, ignored.");
          return TransitionOutcome::Absorbed(AbsorbReason::NoTransition);
        }
        if !completion.success {
          event!(Level::WARN, "Order completion reported failure.");
          return TransitionOutcome::Handled { requests: Vec::new() };
        }
        self.apply(actions::record_completion_context(&self.context, &completion));
        self.apply(actions::mark_changes_saved_context(&self.context, Some(now)));
        event!(Level::INFO, order_id = %completion.order_id, "Order completed.");
        TransitionOutcome::Handled { requests: Vec::new() }
      }
      _ if self.state.is_final() => {
        event!(Level::DEBUG, "Machine is in its final state, service result absorbed.");
        TransitionOutcome::Absorbed(AbsorbReason::FinalState)
      }
      ServiceEvent::ValidationResolved(validation) => {
        let is_valid = validation.is_valid;
        self.apply(actions::update_validation_context(&self.context, validation.errors, is_valid, now));
        self.apply(actions::update_warnings_context(&self.context, validation.warnings));
        if is_valid {
          let completion = if self.context.is_item_wizard_active() {
            actions::mark_item_step_completed_context(&self.context)
          } else if self.context.current_step != WizardStep::last() {
            actions::mark_step_completed_context(&self.context)
          } else {
            ContextPatch::empty()
          };
          self.apply(completion);
        }
        self.apply(actions::update_progress_context(&self.context));
        event!(Level::DEBUG, is_valid, errors = self.context.validation.errors.len(), "Validation result applied.");
        TransitionOutcome::Handled { requests: Vec::new() }
      }
      ServiceEvent::DraftSaved(saved) => {
        if saved.success {
          self.apply(actions::mark_changes_saved_context(&self.context, saved.saved_at.or(Some(now))));
          event!(Level::DEBUG, "Draft saved, unsaved changes cleared.");
        } else {
          event!(Level::WARN, reason = ?saved.reason, "Draft save reported failure.");
        }
        TransitionOutcome::Handled { requests: Vec::new() }
      }
      ServiceEvent::DraftRestored(restored) => {
        if !restored.success {
          event!(Level::WARN, "Draft restore reported failure, context untouched.");
          return TransitionOutcome::Handled { requests: Vec::new() };
        }
        let Some(restored_context) = restored.restored_context else {
          event!(Level::WARN, "Draft restore succeeded without a context, ignored.");
          return TransitionOutcome::Handled { requests: Vec::new() };
        };
        let from = self.state;
        self.apply(actions::restore_context(restored_context));
        self.state = WizardState::from_context(&self.context);
        event!(Level::INFO, from = %from, to = %self.state, "Draft restored.");
        TransitionOutcome::Transitioned {
          from,
          to: self.state,
          requests: Vec::new(),
        }
      }
    }
  }

  fn apply(&mut self, patch: ContextPatch) {
    patch.apply(&mut self.context);
  }
}
