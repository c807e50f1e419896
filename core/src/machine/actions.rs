// order_wizard/src/machine/actions.rs

//! Context transforms applied after a transition has been accepted.
//!
//! Actions never decide whether they should run (guards do that) and never do I/O.
//! Each one reads the context and returns a `ContextPatch`; an empty patch is a no-op.

use crate::config::WizardConfig;
use crate::core::catalog::{calculate_progress, ItemWizardStep, StepOrder, WizardStep};
use crate::core::context::{ProgressState, SessionState, ValidationState, WizardContext, WizardMetadata};
use crate::services::CompletionResult;
use chrono::{DateTime, Utc};
use serde_json::Value;

pub const RECEIPT_URL_KEY: &str = "receiptUrl";

/// A partial update of a `WizardContext`, at the granularity of its top-level fields.
///
/// `Some(None)` on a nested option clears the field; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextPatch {
  /// Applied first, before any field below.
  pub replace: Option<Box<WizardContext>>,
  pub current_step: Option<WizardStep>,
  pub current_item_step: Option<Option<ItemWizardStep>>,
  pub editing_item_id: Option<Option<String>>,
  pub items_count: Option<u32>,
  pub progress: Option<ProgressState>,
  pub validation: Option<ValidationState>,
  pub session: Option<SessionState>,
  pub metadata: Option<WizardMetadata>,
}

impl ContextPatch {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }

  pub fn apply(self, ctx: &mut WizardContext) {
    if let Some(replacement) = self.replace {
      *ctx = *replacement;
    }
    if let Some(step) = self.current_step {
      ctx.current_step = step;
    }
    if let Some(item_step) = self.current_item_step {
      ctx.current_item_step = item_step;
    }
    if let Some(editing) = self.editing_item_id {
      ctx.editing_item_id = editing;
    }
    if let Some(count) = self.items_count {
      ctx.items_count = count;
    }
    if let Some(progress) = self.progress {
      ctx.progress = progress;
    }
    if let Some(validation) = self.validation {
      ctx.validation = validation;
    }
    if let Some(session) = self.session {
      ctx.session = session;
    }
    if let Some(metadata) = self.metadata {
      ctx.metadata = metadata;
    }
  }
}

// --- Step navigation ---

/// Moves to `target`, leaving the item sub-wizard if it was open.
pub fn update_step_context(ctx: &WizardContext, target: WizardStep) -> ContextPatch {
  let mut patch = ContextPatch {
    current_step: Some(target),
    current_item_step: Some(None),
    ..ContextPatch::default()
  };
  if ctx.editing_item_id.is_some() {
    patch.editing_item_id = Some(None);
  }
  patch
}

/// Clamped: empty patch at the last step.
pub fn update_next_step_context(ctx: &WizardContext) -> ContextPatch {
  match ctx.current_step.next() {
    Some(next) => update_step_context(ctx, next),
    None => ContextPatch::empty(),
  }
}

/// Clamped: empty patch at the first step.
pub fn update_prev_step_context(ctx: &WizardContext) -> ContextPatch {
  match ctx.current_step.prev() {
    Some(prev) => update_step_context(ctx, prev),
    None => ContextPatch::empty(),
  }
}

// --- Item sub-step navigation ---

pub fn update_item_step_context(ctx: &WizardContext, target: ItemWizardStep) -> ContextPatch {
  if ctx.current_item_step.is_none() {
    return ContextPatch::empty();
  }
  ContextPatch {
    current_item_step: Some(Some(target)),
    ..ContextPatch::default()
  }
}

pub fn update_next_item_step_context(ctx: &WizardContext) -> ContextPatch {
  match ctx.current_item_step.and_then(|step| step.next()) {
    Some(next) => update_item_step_context(ctx, next),
    None => ContextPatch::empty(),
  }
}

pub fn update_prev_item_step_context(ctx: &WizardContext) -> ContextPatch {
  match ctx.current_item_step.and_then(|step| step.prev()) {
    Some(prev) => update_item_step_context(ctx, prev),
    None => ContextPatch::empty(),
  }
}

/// Opens the item sub-wizard at `start`. When editing an existing item, the
/// sub-steps before `start` were already filled in and count as completed.
pub fn start_item_wizard_context(
  ctx: &WizardContext,
  start: ItemWizardStep,
  editing_item_id: Option<String>,
) -> ContextPatch {
  let completed_item_steps = match (&editing_item_id, start.index_of()) {
    (Some(_), Some(start_idx)) => ItemWizardStep::ORDER[..start_idx].to_vec(),
    _ => Vec::new(),
  };
  ContextPatch {
    current_item_step: Some(Some(start)),
    editing_item_id: Some(editing_item_id),
    progress: Some(ProgressState {
      completed_item_steps,
      ..ctx.progress.clone()
    }),
    ..ContextPatch::default()
  }
}

/// Leaves the item sub-wizard. `saved` distinguishes completion from cancellation.
pub fn finish_item_wizard_context(ctx: &WizardContext, saved: bool) -> ContextPatch {
  let mut patch = ContextPatch {
    current_item_step: Some(None),
    editing_item_id: Some(None),
    ..ContextPatch::default()
  };
  if saved && ctx.editing_item_id.is_none() {
    patch.items_count = Some(ctx.items_count.saturating_add(1));
  }
  if !saved {
    patch.progress = Some(ProgressState {
      completed_item_steps: Vec::new(),
      ..ctx.progress.clone()
    });
  }
  patch
}

// --- Progress ---

pub fn update_progress_context(ctx: &WizardContext) -> ContextPatch {
  ContextPatch {
    progress: Some(ProgressState {
      percentage: calculate_progress(ctx.current_step),
      can_proceed: ctx.validation.is_valid,
      is_last_step: ctx.current_step == WizardStep::last(),
      ..ctx.progress.clone()
    }),
    ..ContextPatch::default()
  }
}

/// Idempotent: a step is recorded once, the first time.
pub fn mark_step_completed_context(ctx: &WizardContext) -> ContextPatch {
  if ctx.is_step_completed(ctx.current_step) {
    return ContextPatch::empty();
  }
  let mut progress = ctx.progress.clone();
  progress.completed_steps.push(ctx.current_step);
  ContextPatch {
    progress: Some(progress),
    ..ContextPatch::default()
  }
}

pub fn mark_item_step_completed_context(ctx: &WizardContext) -> ContextPatch {
  let Some(item_step) = ctx.current_item_step else {
    return ContextPatch::empty();
  };
  if ctx.is_item_step_completed(item_step) {
    return ContextPatch::empty();
  }
  let mut progress = ctx.progress.clone();
  progress.completed_item_steps.push(item_step);
  ContextPatch {
    progress: Some(progress),
    ..ContextPatch::default()
  }
}

// --- Validation ---

pub fn update_validation_context(
  ctx: &WizardContext,
  errors: Vec<String>,
  is_valid: bool,
  now: DateTime<Utc>,
) -> ContextPatch {
  ContextPatch {
    validation: Some(ValidationState {
      is_valid,
      errors,
      is_validating: false,
      last_validated: Some(now),
      ..ctx.validation.clone()
    }),
    ..ContextPatch::default()
  }
}

pub fn update_warnings_context(ctx: &WizardContext, warnings: Vec<String>) -> ContextPatch {
  ContextPatch {
    validation: Some(ValidationState {
      warnings,
      ..ctx.validation.clone()
    }),
    ..ContextPatch::default()
  }
}

/// Clears every error, or only the named ones; validity follows what remains.
pub fn clear_validation_context(ctx: &WizardContext, specific_errors: Option<&[String]>) -> ContextPatch {
  let errors: Vec<String> = match specific_errors {
    Some(to_clear) => ctx
      .validation
      .errors
      .iter()
      .filter(|e| !to_clear.contains(e))
      .cloned()
      .collect(),
    None => Vec::new(),
  };
  ContextPatch {
    validation: Some(ValidationState {
      is_valid: errors.is_empty(),
      errors,
      ..ctx.validation.clone()
    }),
    ..ContextPatch::default()
  }
}

pub fn start_validation_context(ctx: &WizardContext) -> ContextPatch {
  ContextPatch {
    validation: Some(ValidationState {
      is_validating: true,
      ..ctx.validation.clone()
    }),
    ..ContextPatch::default()
  }
}

/// Fresh validation for the position just entered. Already-completed steps stay valid.
pub fn enter_step_validation_context(ctx: &WizardContext) -> ContextPatch {
  let is_valid = match ctx.current_item_step {
    Some(item_step) => ctx.is_item_step_completed(item_step),
    None => ctx.is_step_completed(ctx.current_step),
  };
  ContextPatch {
    validation: Some(ValidationState {
      is_valid,
      errors: Vec::new(),
      warnings: Vec::new(),
      is_validating: false,
      last_validated: ctx.validation.last_validated,
    }),
    ..ContextPatch::default()
  }
}

// --- Session ---

pub fn update_session_context(ctx: &WizardContext, now: DateTime<Utc>) -> ContextPatch {
  ContextPatch {
    session: Some(SessionState {
      last_activity: Some(now),
      ..ctx.session.clone()
    }),
    ..ContextPatch::default()
  }
}

pub fn mark_unsaved_changes_context(ctx: &WizardContext) -> ContextPatch {
  ContextPatch {
    session: Some(SessionState {
      has_unsaved_changes: true,
      ..ctx.session.clone()
    }),
    ..ContextPatch::default()
  }
}

pub fn mark_changes_saved_context(ctx: &WizardContext, saved_at: Option<DateTime<Utc>>) -> ContextPatch {
  ContextPatch {
    session: Some(SessionState {
      has_unsaved_changes: false,
      last_saved: saved_at.or(ctx.session.last_saved),
      ..ctx.session.clone()
    }),
    ..ContextPatch::default()
  }
}

/// Full reinitialization through the session factory.
pub fn reset_context(_ctx: &WizardContext, config: &WizardConfig, now: DateTime<Utc>) -> ContextPatch {
  ContextPatch {
    replace: Some(Box::new(WizardContext::new_session_at(config, now))),
    ..ContextPatch::default()
  }
}

pub fn restore_context(restored: WizardContext) -> ContextPatch {
  ContextPatch {
    replace: Some(Box::new(restored.normalized())),
    ..ContextPatch::default()
  }
}

pub fn record_completion_context(ctx: &WizardContext, result: &CompletionResult) -> ContextPatch {
  let mut metadata = ctx.metadata.clone();
  metadata.order_id = Some(result.order_id.clone());
  metadata
    .custom_data
    .insert(RECEIPT_URL_KEY.to_string(), Value::String(result.receipt_url.clone()));
  ContextPatch {
    metadata: Some(metadata),
    ..ContextPatch::default()
  }
}
