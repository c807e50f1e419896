// order_wizard/src/core/context.rs

//! The data carried across a wizard session.
//!
//! A `WizardContext` is owned by exactly one machine. It changes only through
//! `ContextPatch`es produced by actions after a transition has been accepted.

use crate::config::{saturating_duration_from_ms, WizardConfig};
use crate::core::catalog::{calculate_item_progress, ItemWizardStep, StepOrder, WizardStep};
use crate::error::WizardResult;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Governs whether the session may mutate or complete the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardMode {
  #[default]
  Create,
  Edit,
  View,
}

impl WizardMode {
  pub fn parse(raw: &str) -> Option<Self> {
    match raw.trim().to_ascii_lowercase().as_str() {
      "create" => Some(WizardMode::Create),
      "edit" => Some(WizardMode::Edit),
      "view" => Some(WizardMode::View),
      _ => None,
    }
  }

  pub fn is_read_only(self) -> bool {
    self == WizardMode::View
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
  pub percentage: u8,
  /// Insertion-ordered, duplicate-free.
  pub completed_steps: Vec<WizardStep>,
  pub completed_item_steps: Vec<ItemWizardStep>,
  pub can_proceed: bool,
  pub is_last_step: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationState {
  pub is_valid: bool,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
  pub is_validating: bool,
  pub last_validated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
  pub session_id: String,
  pub started_at: DateTime<Utc>,
  pub last_activity: Option<DateTime<Utc>>,
  pub last_saved: Option<DateTime<Utc>>,
  pub has_unsaved_changes: bool,
  pub auto_save_interval_ms: u64,
}

impl SessionState {
  pub fn auto_save_interval(&self) -> Duration {
    saturating_duration_from_ms(self.auto_save_interval_ms)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardMetadata {
  pub custom_data: HashMap<String, Value>,
  pub return_url: Option<String>,
  pub is_persistent: bool,
  pub order_id: Option<String>,
}

/// The single source of truth for a wizard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardContext {
  pub current_step: WizardStep,
  /// Set if and only if the item sub-wizard is active.
  pub current_item_step: Option<ItemWizardStep>,
  /// Item being edited by the sub-wizard; `None` when adding a new one.
  pub editing_item_id: Option<String>,
  /// Items added through the sub-wizard during this session.
  pub items_count: u32,
  pub mode: WizardMode,
  pub progress: ProgressState,
  pub validation: ValidationState,
  pub session: SessionState,
  pub metadata: WizardMetadata,
}

impl WizardContext {
  /// Session factory: a fresh context positioned at the first step.
  pub fn new_session(config: &WizardConfig) -> Self {
    Self::new_session_at(config, Utc::now())
  }

  pub fn new_session_at(config: &WizardConfig, now: DateTime<Utc>) -> Self {
    Self {
      current_step: WizardStep::first(),
      current_item_step: None,
      editing_item_id: None,
      items_count: 0,
      mode: config.default_mode,
      progress: ProgressState::default(),
      validation: ValidationState::default(),
      session: SessionState {
        session_id: generate_session_id(),
        started_at: now,
        last_activity: None,
        last_saved: None,
        has_unsaved_changes: false,
        auto_save_interval_ms: config.auto_save_interval_ms,
      },
      metadata: WizardMetadata {
        custom_data: HashMap::new(),
        return_url: config.return_url.clone(),
        is_persistent: config.is_persistent,
        order_id: None,
      },
    }
  }

  /// A session opened on an existing order.
  pub fn for_order(config: &WizardConfig, order_id: impl Into<String>, mode: WizardMode) -> Self {
    let mut ctx = Self::new_session(config);
    ctx.mode = mode;
    ctx.metadata.order_id = Some(order_id.into());
    ctx
  }

  /// Drops item-wizard fields that cannot apply at `current_step`. An item sub-step
  /// only exists inside `itemManager`, and an editing target only inside the sub-wizard.
  pub fn normalized(mut self) -> Self {
    if self.current_step != WizardStep::ItemManager {
      self.current_item_step = None;
    }
    if self.current_item_step.is_none() {
      self.editing_item_id = None;
    }
    self
  }

  pub fn is_item_wizard_active(&self) -> bool {
    self.current_item_step.is_some()
  }

  pub fn is_step_completed(&self, step: WizardStep) -> bool {
    self.progress.completed_steps.contains(&step)
  }

  pub fn is_item_step_completed(&self, step: ItemWizardStep) -> bool {
    self.progress.completed_item_steps.contains(&step)
  }

  pub fn item_progress(&self) -> u8 {
    calculate_item_progress(self.current_item_step, &self.progress.completed_item_steps)
  }

  pub fn to_draft_json(&self) -> WizardResult<String> {
    Ok(serde_json::to_string(self)?)
  }

  pub fn from_draft_json(raw: &str) -> WizardResult<Self> {
    Ok(serde_json::from_str(raw)?)
  }
}

pub fn generate_session_id() -> String {
  format!("session_{}", Uuid::new_v4().simple())
}
