// order_wizard/src/session/execution.rs

//! Contains `WizardSession::dispatch()` and the auto-save `tick()`.
//!
//! Machine locks are only ever taken inside synchronous sections; every
//! service call works on an owned context snapshot.

use crate::core::control::{ServiceKind, ServiceRequest, TransitionOutcome};
use crate::core::event::{ServiceEvent, WizardEvent};
use crate::error::WizardResult;
use crate::machine::guards;
use crate::services::{draft_id_of, CompletionResult, RestoreResult, SaveResult, StepValidation, WizardServices, NO_UNSAVED_CHANGES};
use crate::session::definition::WizardSession;
use chrono::{DateTime, Utc};
use tracing::{event, instrument, Level};

/// Everything one inbound event caused.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
  /// Outcome of the inbound event itself.
  pub outcome: TransitionOutcome,
  /// Outcomes of re-injecting each requested service's result, in request order.
  pub follow_ups: Vec<TransitionOutcome>,
}

impl DispatchReport {
  pub fn is_absorbed(&self) -> bool {
    self.outcome.is_absorbed()
  }
}

impl<S: WizardServices> WizardSession<S> {
  pub async fn dispatch(&self, event: WizardEvent) -> WizardResult<DispatchReport> {
    self.dispatch_at(event, Utc::now()).await
  }

  /// Sends `event` to the machine at time `now`, then runs the service
  /// requests it produced one after another, resolving each result before the
  /// next call sees the context.
  #[instrument(
    name = "WizardSession::dispatch",
    skip_all,
    fields(event_type = event.type_name(), session_key = %self.key)
  )]
  pub async fn dispatch_at(&self, event: WizardEvent, now: DateTime<Utc>) -> WizardResult<DispatchReport> {
    let event_name = event.type_name();
    let outcome = self.machine.with_write(|machine| machine.send_at(event, now));
    self.notify(&outcome, event_name);

    let requests: Vec<ServiceRequest> = outcome.requests().to_vec();
    let mut follow_ups = Vec::with_capacity(requests.len());
    for request in &requests {
      let result = self.run_service(request).await?;
      let result_name = result.type_name();
      let follow_up = self.machine.with_write(|machine| machine.resolve_at(result, now));
      self.notify(&follow_up, result_name);
      follow_ups.push(follow_up);
    }

    Ok(DispatchReport { outcome, follow_ups })
  }

  pub async fn tick(&self) -> WizardResult<Option<DispatchReport>> {
    self.tick_at(Utc::now()).await
  }

  /// Fires `AUTO_SAVE` when auto-save is enabled, there are unsaved changes
  /// and the configured interval has elapsed since the last activity.
  pub async fn tick_at(&self, now: DateTime<Utc>) -> WizardResult<Option<DispatchReport>> {
    let due = {
      let machine = self.machine.read();
      machine.config().auto_save_enabled
        && machine.context().session.has_unsaved_changes
        && guards::should_auto_save_at(machine.context(), now)
    };
    if !due {
      event!(Level::TRACE, session_key = %self.key, "Auto-save not due.");
      return Ok(None);
    }
    event!(Level::DEBUG, session_key = %self.key, "Auto-save due, dispatching AUTO_SAVE.");
    self.dispatch_at(WizardEvent::AutoSave, now).await.map(Some)
  }

  /// Performs one service call. Failures of the call are turned into the
  /// matching data result; only a malformed request is an error.
  async fn run_service(&self, request: &ServiceRequest) -> WizardResult<ServiceEvent> {
    let (ctx, auto_save_enabled) = {
      let machine = self.machine.read();
      (machine.context().clone(), machine.config().auto_save_enabled)
    };
    event!(Level::DEBUG, service = ?request.service, "Invoking service.");

    let result = match request.service {
      ServiceKind::ValidateStep => {
        let validation = match self.services.validate_step(&ctx, &request.event).await {
          Ok(validation) => validation,
          Err(err) => {
            event!(Level::WARN, error = %err, "Validation service failed, treating step as invalid.");
            StepValidation::invalid([err.to_string()])
          }
        };
        ServiceEvent::ValidationResolved(validation)
      }
      ServiceKind::AutoSave => {
        let saved = if !auto_save_enabled {
          SaveResult::failed("auto-save disabled")
        } else if !ctx.session.has_unsaved_changes {
          SaveResult::failed(NO_UNSAVED_CHANGES)
        } else {
          self
            .services
            .auto_save(&ctx, &request.event)
            .await
            .unwrap_or_else(|err| {
              event!(Level::WARN, error = %err, "Auto-save service failed.");
              SaveResult::failed(err.to_string())
            })
        };
        ServiceEvent::DraftSaved(saved)
      }
      ServiceKind::SaveDraft => {
        let saved = self
          .services
          .save_draft(&ctx, &request.event)
          .await
          .unwrap_or_else(|err| {
            event!(Level::WARN, error = %err, "Save-draft service failed.");
            SaveResult::failed(err.to_string())
          });
        ServiceEvent::DraftSaved(saved)
      }
      ServiceKind::RestoreDraft => {
        let draft_id = draft_id_of(&request.event)?;
        let restored = self
          .services
          .restore_draft(&ctx, draft_id)
          .await
          .unwrap_or_else(|err| {
            event!(Level::WARN, error = %err, draft_id, "Restore-draft service failed.");
            RestoreResult::not_found()
          });
        ServiceEvent::DraftRestored(restored)
      }
      ServiceKind::CompleteWizard => {
        let completion = self
          .services
          .complete_wizard(&ctx, &request.event)
          .await
          .unwrap_or_else(|err| {
            event!(Level::ERROR, error = %err, "Order completion service failed.");
            CompletionResult::default()
          });
        ServiceEvent::WizardCompleted(completion)
      }
    };
    Ok(result)
  }
}
