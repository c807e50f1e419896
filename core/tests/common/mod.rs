// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use order_wizard::{
  CompletionResult, RestoreResult, SaveResult, ServiceEvent, StepValidation, WizardConfig, WizardContext, WizardEvent,
  WizardMachine, WizardServices, WizardStep,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;

// --- Fixed clock ---
pub fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn minutes(n: i64) -> Duration {
  Duration::minutes(n)
}

// --- Context / machine builders ---
pub fn test_config() -> WizardConfig {
  WizardConfig::default()
}

pub fn fresh_context() -> WizardContext {
  WizardContext::new_session_at(&test_config(), t0())
}

pub fn context_at(step: WizardStep) -> WizardContext {
  let mut ctx = fresh_context();
  ctx.current_step = step;
  ctx
}

/// Marks the current position as validated and ready to move on.
pub fn make_valid(ctx: &mut WizardContext) {
  ctx.validation.is_valid = true;
  ctx.progress.can_proceed = true;
}

pub fn with_completed(mut ctx: WizardContext, steps: &[WizardStep]) -> WizardContext {
  ctx.progress.completed_steps = steps.to_vec();
  ctx
}

pub fn machine_with(ctx: WizardContext) -> WizardMachine {
  WizardMachine::with_context(test_config(), ctx)
}

/// Runs VALIDATE_STEP and feeds back a passing result, as the session driver would.
pub fn validate_ok(machine: &mut WizardMachine) {
  machine.send_at(WizardEvent::validate(), t0());
  machine.resolve_at(ServiceEvent::ValidationResolved(StepValidation::valid()), t0());
}

/// Validates the current step, then sends NEXT and asserts it moved.
pub fn advance(machine: &mut WizardMachine) {
  validate_ok(machine);
  let outcome = machine.send_at(WizardEvent::Next, t0());
  assert!(outcome.is_transition(), "NEXT should have been accepted, got {:?}", outcome);
}

// --- Fake collaborator ---

/// Records every call and answers from configurable canned results.
pub struct FakeServices {
  pub calls: Mutex<Vec<&'static str>>,
  pub validation: Mutex<StepValidation>,
  pub fail_validation: AtomicBool,
  pub fail_saves: AtomicBool,
  pub drafts: Mutex<HashMap<String, WizardContext>>,
  pub completion: Mutex<CompletionResult>,
}

impl Default for FakeServices {
  fn default() -> Self {
    Self {
      calls: Mutex::new(Vec::new()),
      validation: Mutex::new(StepValidation::valid()),
      fail_validation: AtomicBool::new(false),
      fail_saves: AtomicBool::new(false),
      drafts: Mutex::new(HashMap::new()),
      completion: Mutex::new(CompletionResult {
        success: true,
        order_id: "ORD-1001".to_string(),
        receipt_url: "https://receipts.example/ORD-1001.pdf".to_string(),
      }),
    }
  }
}

impl FakeServices {
  pub fn calls(&self) -> Vec<&'static str> {
    self.calls.lock().clone()
  }

  pub fn call_count(&self, name: &str) -> usize {
    self.calls.lock().iter().filter(|c| **c == name).count()
  }

  pub fn answer_validation(&self, validation: StepValidation) {
    *self.validation.lock() = validation;
  }

  pub fn store_draft(&self, draft_id: &str, ctx: WizardContext) {
    self.drafts.lock().insert(draft_id.to_string(), ctx);
  }

  fn saved(&self) -> anyhow::Result<SaveResult> {
    if self.fail_saves.load(Ordering::SeqCst) {
      return Err(anyhow!("draft storage offline"));
    }
    Ok(SaveResult::saved(t0() + minutes(1)))
  }
}

#[async_trait]
impl WizardServices for FakeServices {
  async fn validate_step(&self, _ctx: &WizardContext, _event: &WizardEvent) -> anyhow::Result<StepValidation> {
    self.calls.lock().push("validateStep");
    if self.fail_validation.load(Ordering::SeqCst) {
      return Err(anyhow!("validator unreachable"));
    }
    Ok(self.validation.lock().clone())
  }

  async fn auto_save(&self, _ctx: &WizardContext, _event: &WizardEvent) -> anyhow::Result<SaveResult> {
    self.calls.lock().push("autoSave");
    self.saved()
  }

  async fn save_draft(&self, ctx: &WizardContext, _event: &WizardEvent) -> anyhow::Result<SaveResult> {
    self.calls.lock().push("saveDraft");
    let result = self.saved()?;
    self.store_draft(&ctx.session.session_id, ctx.clone());
    Ok(result)
  }

  async fn restore_draft(&self, _ctx: &WizardContext, draft_id: &str) -> anyhow::Result<RestoreResult> {
    self.calls.lock().push("restoreDraft");
    Ok(match self.drafts.lock().get(draft_id) {
      Some(draft) => RestoreResult::restored(draft.clone()),
      None => RestoreResult::not_found(),
    })
  }

  async fn complete_wizard(&self, _ctx: &WizardContext, _event: &WizardEvent) -> anyhow::Result<CompletionResult> {
    self.calls.lock().push("completeWizard");
    Ok(self.completion.lock().clone())
  }
}

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
