// order_wizard/src/machine/guards.rs

//! Pure predicates gating transitions.
//!
//! Every guard has the shape `fn(&WizardContext, &WizardEvent) -> bool` so the
//! transition table can reference them uniformly. None of them mutate anything.

use crate::core::catalog::{ItemWizardStep, StepOrder, WizardStep};
use crate::core::context::WizardContext;
use crate::core::event::WizardEvent;
use chrono::{DateTime, TimeZone, Utc};

pub type GuardFn = fn(&WizardContext, &WizardEvent) -> bool;

/// A guard paired with the name reported when it rejects an event.
#[derive(Clone, Copy)]
pub struct NamedGuard {
  pub name: &'static str,
  pub check: GuardFn,
}

impl NamedGuard {
  pub const fn new(name: &'static str, check: GuardFn) -> Self {
    Self { name, check }
  }

  pub fn evaluate(&self, ctx: &WizardContext, event: &WizardEvent) -> bool {
    (self.check)(ctx, event)
  }
}

impl std::fmt::Debug for NamedGuard {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("NamedGuard").field(&self.name).finish()
  }
}

pub fn can_proceed_to_next_step(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  ctx.validation.is_valid && ctx.progress.can_proceed
}

pub fn can_return_to_prev_step(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  ctx.current_step != WizardStep::first()
}

/// Reachability: one step forward at most, or any step already completed.
pub fn can_goto_step(ctx: &WizardContext, event: &WizardEvent) -> bool {
  match event {
    WizardEvent::GotoStep { target_step } => is_step_reachable(ctx, *target_step),
    _ => false,
  }
}

pub fn is_step_reachable(ctx: &WizardContext, target: WizardStep) -> bool {
  let (Some(target_idx), Some(current_idx)) = (target.index_of(), ctx.current_step.index_of()) else {
    return false;
  };
  target_idx <= current_idx + 1 || ctx.is_step_completed(target)
}

pub fn can_start_item_wizard(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  ctx.current_step == WizardStep::ItemManager
}

pub fn can_proceed_item_step(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  ctx.current_item_step.is_some() && ctx.validation.is_valid
}

pub fn can_return_item_step(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  ctx.current_item_step != Some(ItemWizardStep::first())
}

pub fn can_complete_item_wizard(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  ctx.current_item_step == Some(ItemWizardStep::last()) && ctx.validation.is_valid
}

pub fn needs_validation(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  !ctx.validation.is_valid || !ctx.validation.errors.is_empty()
}

/// Every step except the confirmation itself must be completed.
pub fn can_complete(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  ctx.current_step == WizardStep::OrderConfirmation
    && ctx.validation.is_valid
    && ctx.progress.completed_steps.len() == WizardStep::count() - 1
}

pub fn has_unsaved_changes(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  ctx.session.has_unsaved_changes
}

/// `VIEW` sessions may browse but never mutate or complete.
pub fn is_editable(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  !ctx.mode.is_read_only()
}

pub fn should_auto_save(ctx: &WizardContext, _event: &WizardEvent) -> bool {
  should_auto_save_at(ctx, Utc::now())
}

/// `now - lastActivity >= autoSaveInterval`; a session with no activity yet is due.
pub fn should_auto_save_at(ctx: &WizardContext, now: DateTime<Utc>) -> bool {
  let last_activity = ctx.session.last_activity.unwrap_or_else(epoch);
  now.signed_duration_since(last_activity) >= ctx.session.auto_save_interval()
}

pub fn is_session_expired(ctx: &WizardContext, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
  let last_seen = ctx.session.last_activity.unwrap_or(ctx.session.started_at);
  now.signed_duration_since(last_seen) >= timeout
}

pub fn should_warn_session(ctx: &WizardContext, now: DateTime<Utc>, warning: chrono::Duration) -> bool {
  let last_seen = ctx.session.last_activity.unwrap_or(ctx.session.started_at);
  now.signed_duration_since(last_seen) >= warning
}

fn epoch() -> DateTime<Utc> {
  Utc.timestamp_opt(0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC)
}
