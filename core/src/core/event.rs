// order_wizard/src/core/event.rs

//! The closed vocabulary of stimuli the wizard machine accepts.

use crate::core::catalog::{ItemWizardStep, WizardStep};
use crate::services::{CompletionResult, RestoreResult, SaveResult, StepValidation};
use serde::{Deserialize, Serialize};

/// Inbound events dispatched by the UI, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum WizardEvent {
  Next,
  Prev,
  GotoStep {
    target_step: WizardStep,
  },
  StartItemWizard,
  EditItemWizard {
    item_id: String,
    start_step: Option<ItemWizardStep>,
  },
  NextItemStep,
  PrevItemStep,
  /// Part of the vocabulary, but no state consumes it.
  GotoItemStep {
    target_item_step: ItemWizardStep,
  },
  CompleteItemWizard,
  CancelItemWizard {
    confirm_cancel: Option<bool>,
  },
  ValidateStep {
    show_errors: Option<bool>,
  },
  ValidateAll,
  ClearValidation {
    specific_errors: Option<Vec<String>>,
  },
  SaveDraft {
    silent: Option<bool>,
  },
  AutoSave,
  RestoreDraft {
    draft_id: String,
  },
  Reset {
    confirm_reset: Option<bool>,
  },
  Complete,
}

impl WizardEvent {
  /// The `type` discriminant as it appears on the wire.
  pub fn type_name(&self) -> &'static str {
    match self {
      WizardEvent::Next => "NEXT",
      WizardEvent::Prev => "PREV",
      WizardEvent::GotoStep { .. } => "GOTO_STEP",
      WizardEvent::StartItemWizard => "START_ITEM_WIZARD",
      WizardEvent::EditItemWizard { .. } => "EDIT_ITEM_WIZARD",
      WizardEvent::NextItemStep => "NEXT_ITEM_STEP",
      WizardEvent::PrevItemStep => "PREV_ITEM_STEP",
      WizardEvent::GotoItemStep { .. } => "GOTO_ITEM_STEP",
      WizardEvent::CompleteItemWizard => "COMPLETE_ITEM_WIZARD",
      WizardEvent::CancelItemWizard { .. } => "CANCEL_ITEM_WIZARD",
      WizardEvent::ValidateStep { .. } => "VALIDATE_STEP",
      WizardEvent::ValidateAll => "VALIDATE_ALL",
      WizardEvent::ClearValidation { .. } => "CLEAR_VALIDATION",
      WizardEvent::SaveDraft { .. } => "SAVE_DRAFT",
      WizardEvent::AutoSave => "AUTO_SAVE",
      WizardEvent::RestoreDraft { .. } => "RESTORE_DRAFT",
      WizardEvent::Reset { .. } => "RESET",
      WizardEvent::Complete => "COMPLETE",
    }
  }

  pub fn goto_step(target_step: WizardStep) -> Self {
    WizardEvent::GotoStep { target_step }
  }

  pub fn edit_item(item_id: impl Into<String>, start_step: Option<ItemWizardStep>) -> Self {
    WizardEvent::EditItemWizard {
      item_id: item_id.into(),
      start_step,
    }
  }

  pub fn validate() -> Self {
    WizardEvent::ValidateStep { show_errors: None }
  }

  pub fn restore_draft(draft_id: impl Into<String>) -> Self {
    WizardEvent::RestoreDraft {
      draft_id: draft_id.into(),
    }
  }

  pub fn reset() -> Self {
    WizardEvent::Reset { confirm_reset: None }
  }
}

/// Follow-up events carrying the outcome of a service call back into the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
  ValidationResolved(StepValidation),
  DraftSaved(SaveResult),
  DraftRestored(RestoreResult),
  WizardCompleted(CompletionResult),
}

impl ServiceEvent {
  pub fn type_name(&self) -> &'static str {
    match self {
      ServiceEvent::ValidationResolved(v) if v.is_valid => "VALIDATION_SUCCESS",
      ServiceEvent::ValidationResolved(_) => "VALIDATION_ERROR",
      ServiceEvent::DraftSaved(_) => "DRAFT_SAVED",
      ServiceEvent::DraftRestored(_) => "DRAFT_RESTORED",
      ServiceEvent::WizardCompleted(_) => "WIZARD_COMPLETED",
    }
  }
}
