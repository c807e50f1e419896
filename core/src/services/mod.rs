// order_wizard/src/services/mod.rs

//! The contract the wizard consumes from its asynchronous collaborators.
//!
//! Implementations report business outcomes as data (`success: false`,
//! `is_valid: false`). An `Err` is reserved for failures of the call itself
//! and is mapped to data by the session driver.

use crate::core::context::WizardContext;
use crate::core::event::WizardEvent;
use crate::error::{WizardError, WizardResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of validating the current step (or the whole wizard).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValidation {
  pub is_valid: bool,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl StepValidation {
  pub fn valid() -> Self {
    Self {
      is_valid: true,
      ..Self::default()
    }
  }

  pub fn invalid<I, S>(errors: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      is_valid: false,
      errors: errors.into_iter().map(Into::into).collect(),
      warnings: Vec::new(),
    }
  }

  pub fn with_warnings<I, S>(mut self, warnings: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.warnings = warnings.into_iter().map(Into::into).collect();
    self
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
  pub success: bool,
  pub reason: Option<String>,
  pub saved_at: Option<DateTime<Utc>>,
}

impl SaveResult {
  pub fn saved(at: DateTime<Utc>) -> Self {
    Self {
      success: true,
      reason: None,
      saved_at: Some(at),
    }
  }

  pub fn failed(reason: impl Into<String>) -> Self {
    Self {
      success: false,
      reason: Some(reason.into()),
      saved_at: None,
    }
  }
}

pub const NO_UNSAVED_CHANGES: &str = "no unsaved changes";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreResult {
  pub success: bool,
  pub restored_context: Option<WizardContext>,
}

impl RestoreResult {
  pub fn restored(context: WizardContext) -> Self {
    Self {
      success: true,
      restored_context: Some(context),
    }
  }

  pub fn not_found() -> Self {
    Self::default()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
  pub success: bool,
  pub order_id: String,
  pub receipt_url: String,
}

/// Asynchronous collaborators invoked by name from specific states and events.
///
/// Each call receives a snapshot of the context and the event that triggered it.
#[async_trait]
pub trait WizardServices: Send + Sync + 'static {
  /// Invoked on `VALIDATE_STEP` / `VALIDATE_ALL`.
  async fn validate_step(&self, ctx: &WizardContext, event: &WizardEvent) -> anyhow::Result<StepValidation>;

  /// Invoked on `AUTO_SAVE` when there is something to save.
  async fn auto_save(&self, ctx: &WizardContext, event: &WizardEvent) -> anyhow::Result<SaveResult>;

  /// Invoked on `SAVE_DRAFT`. Defaults to the auto-save path.
  async fn save_draft(&self, ctx: &WizardContext, event: &WizardEvent) -> anyhow::Result<SaveResult> {
    self.auto_save(ctx, event).await
  }

  /// Invoked on `RESTORE_DRAFT`. `draft_id` has already been extracted from the event.
  async fn restore_draft(&self, ctx: &WizardContext, draft_id: &str) -> anyhow::Result<RestoreResult>;

  /// Invoked once the machine reaches `completed`.
  async fn complete_wizard(&self, ctx: &WizardContext, event: &WizardEvent) -> anyhow::Result<CompletionResult>;
}

/// Extracts the draft id a restore needs. Any other event shape is a caller bug.
pub fn draft_id_of(event: &WizardEvent) -> WizardResult<&str> {
  match event {
    WizardEvent::RestoreDraft { draft_id } => Ok(draft_id.as_str()),
    other => Err(WizardError::MalformedEvent {
      operation: "restoreDraft".to_string(),
      expected: "RESTORE_DRAFT".to_string(),
      actual: other.type_name().to_string(),
    }),
  }
}
