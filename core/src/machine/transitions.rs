// order_wizard/src/machine/transitions.rs

//! The state graph as an explicit match over `(state, event)`.
//!
//! Root-level handlers are consulted first (`global_transition`), then the
//! per-state table (`state_transition`). Events the item wizard does not handle
//! bubble up to `ItemManager`.

use crate::config::WizardConfig;
use crate::core::catalog::{ItemWizardStep, StepOrder, WizardStep};
use crate::core::context::WizardContext;
use crate::core::control::ServiceKind;
use crate::core::event::WizardEvent;
use crate::machine::actions::{self, ContextPatch};
use crate::machine::guards::{self, NamedGuard};
use crate::machine::state::{ItemManagerState, WizardState};
use chrono::{DateTime, Utc};

/// What an action may read besides the context and the triggering event.
#[derive(Debug, Clone, Copy)]
pub struct ActionEnv<'a> {
  pub now: DateTime<Utc>,
  pub config: &'a WizardConfig,
}

pub type ActionFn = fn(&WizardContext, &WizardEvent, &ActionEnv<'_>) -> ContextPatch;

#[derive(Clone, Copy)]
pub struct NamedAction {
  pub name: &'static str,
  pub run: ActionFn,
}

impl std::fmt::Debug for NamedAction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("NamedAction").field(&self.name).finish()
  }
}

/// One row of the table. `target: None` is a targetless (internal) transition.
#[derive(Debug, Clone)]
pub struct Transition {
  pub target: Option<WizardState>,
  pub guards: &'static [NamedGuard],
  pub actions: &'static [NamedAction],
  pub services: &'static [ServiceKind],
}

impl Transition {
  fn to(target: WizardState) -> Self {
    Self {
      target: Some(target),
      guards: &[],
      actions: &[],
      services: &[],
    }
  }

  fn internal() -> Self {
    Self {
      target: None,
      guards: &[],
      actions: &[],
      services: &[],
    }
  }

  fn guarded(mut self, guards: &'static [NamedGuard]) -> Self {
    self.guards = guards;
    self
  }

  fn with_actions(mut self, actions: &'static [NamedAction]) -> Self {
    self.actions = actions;
    self
  }

  fn invoking(mut self, services: &'static [ServiceKind]) -> Self {
    self.services = services;
    self
  }

  /// Name of the first guard that rejects, if any.
  pub fn rejected_by(&self, ctx: &WizardContext, event: &WizardEvent) -> Option<&'static str> {
    self
      .guards
      .iter()
      .find(|guard| !guard.evaluate(ctx, event))
      .map(|guard| guard.name)
  }
}

// --- Guards, by name ---

const CAN_PROCEED_TO_NEXT_STEP: NamedGuard = NamedGuard {
  name: "canProceedToNextStep",
  check: guards::can_proceed_to_next_step,
};
const CAN_RETURN_TO_PREV_STEP: NamedGuard = NamedGuard {
  name: "canReturnToPrevStep",
  check: guards::can_return_to_prev_step,
};
const CAN_GOTO_STEP: NamedGuard = NamedGuard {
  name: "canGotoStep",
  check: guards::can_goto_step,
};
const CAN_START_ITEM_WIZARD: NamedGuard = NamedGuard {
  name: "canStartItemWizard",
  check: guards::can_start_item_wizard,
};
const CAN_PROCEED_ITEM_STEP: NamedGuard = NamedGuard {
  name: "canProceedItemStep",
  check: guards::can_proceed_item_step,
};
const CAN_RETURN_ITEM_STEP: NamedGuard = NamedGuard {
  name: "canReturnItemStep",
  check: guards::can_return_item_step,
};
const CAN_COMPLETE_ITEM_WIZARD: NamedGuard = NamedGuard {
  name: "canCompleteItemWizard",
  check: guards::can_complete_item_wizard,
};
const CAN_COMPLETE: NamedGuard = NamedGuard {
  name: "canComplete",
  check: guards::can_complete,
};
const IS_EDITABLE: NamedGuard = NamedGuard {
  name: "isEditable",
  check: guards::is_editable,
};

const NEXT_GUARDS: &[NamedGuard] = &[CAN_PROCEED_TO_NEXT_STEP];
const PREV_GUARDS: &[NamedGuard] = &[CAN_RETURN_TO_PREV_STEP];
const GOTO_GUARDS: &[NamedGuard] = &[CAN_GOTO_STEP];
const EDITABLE_GUARDS: &[NamedGuard] = &[IS_EDITABLE];
const COMPLETE_GUARDS: &[NamedGuard] = &[CAN_COMPLETE, IS_EDITABLE];
const START_ITEM_WIZARD_GUARDS: &[NamedGuard] = &[CAN_START_ITEM_WIZARD, IS_EDITABLE];
const NEXT_ITEM_STEP_GUARDS: &[NamedGuard] = &[CAN_PROCEED_ITEM_STEP];
const PREV_ITEM_STEP_GUARDS: &[NamedGuard] = &[CAN_RETURN_ITEM_STEP];
const COMPLETE_ITEM_WIZARD_GUARDS: &[NamedGuard] = &[CAN_COMPLETE_ITEM_WIZARD, IS_EDITABLE];

// --- Action adapters binding event payloads and the environment ---

fn next_step(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::update_next_step_context(ctx)
}

fn prev_step(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::update_prev_step_context(ctx)
}

fn goto_step(ctx: &WizardContext, event: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  match event {
    WizardEvent::GotoStep { target_step } => actions::update_step_context(ctx, *target_step),
    _ => ContextPatch::empty(),
  }
}

fn next_item_step(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::update_next_item_step_context(ctx)
}

fn prev_item_step(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::update_prev_item_step_context(ctx)
}

fn start_item_wizard(ctx: &WizardContext, event: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  match event {
    WizardEvent::EditItemWizard { item_id, start_step } => actions::start_item_wizard_context(
      ctx,
      start_step.unwrap_or_else(ItemWizardStep::first),
      Some(item_id.clone()),
    ),
    _ => actions::start_item_wizard_context(ctx, ItemWizardStep::first(), None),
  }
}

fn complete_item_wizard(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::finish_item_wizard_context(ctx, true)
}

fn cancel_item_wizard(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::finish_item_wizard_context(ctx, false)
}

fn mark_item_step_completed(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::mark_item_step_completed_context(ctx)
}

fn mark_step_completed(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::mark_step_completed_context(ctx)
}

fn enter_step_validation(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::enter_step_validation_context(ctx)
}

fn update_progress(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::update_progress_context(ctx)
}

fn update_session(ctx: &WizardContext, _: &WizardEvent, env: &ActionEnv<'_>) -> ContextPatch {
  actions::update_session_context(ctx, env.now)
}

fn mark_unsaved_changes(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::mark_unsaved_changes_context(ctx)
}

fn start_validation(ctx: &WizardContext, _: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  actions::start_validation_context(ctx)
}

fn clear_validation(ctx: &WizardContext, event: &WizardEvent, _: &ActionEnv<'_>) -> ContextPatch {
  match event {
    WizardEvent::ClearValidation { specific_errors } => actions::clear_validation_context(ctx, specific_errors.as_deref()),
    _ => ContextPatch::empty(),
  }
}

fn reset(ctx: &WizardContext, _: &WizardEvent, env: &ActionEnv<'_>) -> ContextPatch {
  actions::reset_context(ctx, env.config, env.now)
}

macro_rules! named {
  ($name:literal, $f:path) => {
    NamedAction { name: $name, run: $f }
  };
}

const NEXT_STEP_ACTIONS: &[NamedAction] = &[
  named!("updateNextStepContext", next_step),
  named!("enterStepValidationContext", enter_step_validation),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
  named!("markUnsavedChangesContext", mark_unsaved_changes),
];

const PREV_STEP_ACTIONS: &[NamedAction] = &[
  named!("updatePrevStepContext", prev_step),
  named!("enterStepValidationContext", enter_step_validation),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
  named!("markUnsavedChangesContext", mark_unsaved_changes),
];

const GOTO_STEP_ACTIONS: &[NamedAction] = &[
  named!("updateStepContext", goto_step),
  named!("enterStepValidationContext", enter_step_validation),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
  named!("markUnsavedChangesContext", mark_unsaved_changes),
];

const NEXT_ITEM_STEP_ACTIONS: &[NamedAction] = &[
  named!("updateNextItemStepContext", next_item_step),
  named!("enterStepValidationContext", enter_step_validation),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
  named!("markUnsavedChangesContext", mark_unsaved_changes),
];

const PREV_ITEM_STEP_ACTIONS: &[NamedAction] = &[
  named!("updatePrevItemStepContext", prev_item_step),
  named!("enterStepValidationContext", enter_step_validation),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
  named!("markUnsavedChangesContext", mark_unsaved_changes),
];

const START_ITEM_WIZARD_ACTIONS: &[NamedAction] = &[
  named!("startItemWizardContext", start_item_wizard),
  named!("enterStepValidationContext", enter_step_validation),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
];

const COMPLETE_ITEM_WIZARD_ACTIONS: &[NamedAction] = &[
  named!("markItemStepCompletedContext", mark_item_step_completed),
  named!("finishItemWizardContext", complete_item_wizard),
  named!("enterStepValidationContext", enter_step_validation),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
  named!("markUnsavedChangesContext", mark_unsaved_changes),
];

const CANCEL_ITEM_WIZARD_ACTIONS: &[NamedAction] = &[
  named!("finishItemWizardContext", cancel_item_wizard),
  named!("enterStepValidationContext", enter_step_validation),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
];

const COMPLETE_ACTIONS: &[NamedAction] = &[
  named!("markStepCompletedContext", mark_step_completed),
  named!("updateProgressContext", update_progress),
  named!("updateSessionContext", update_session),
];

const VALIDATE_ACTIONS: &[NamedAction] = &[named!("startValidationContext", start_validation)];

const CLEAR_VALIDATION_ACTIONS: &[NamedAction] = &[
  named!("clearValidationContext", clear_validation),
  named!("updateProgressContext", update_progress),
];

const RESET_ACTIONS: &[NamedAction] = &[named!("resetContext", reset)];

fn next(target: WizardState) -> Transition {
  Transition::to(target)
    .guarded(NEXT_GUARDS)
    .with_actions(NEXT_STEP_ACTIONS)
}

fn prev(target: WizardState) -> Transition {
  Transition::to(target)
    .guarded(PREV_GUARDS)
    .with_actions(PREV_STEP_ACTIONS)
}

fn goto(target_step: WizardStep) -> Transition {
  Transition::to(WizardState::for_step(target_step))
    .guarded(GOTO_GUARDS)
    .with_actions(GOTO_STEP_ACTIONS)
}

/// Handlers available from every non-final state, checked before the state table.
pub fn global_transition(event: &WizardEvent) -> Option<Transition> {
  match event {
    WizardEvent::Reset { .. } => Some(Transition::to(WizardState::INITIAL).with_actions(RESET_ACTIONS)),
    WizardEvent::ValidateStep { .. } | WizardEvent::ValidateAll => Some(
      Transition::internal()
        .with_actions(VALIDATE_ACTIONS)
        .invoking(&[ServiceKind::ValidateStep]),
    ),
    WizardEvent::ClearValidation { .. } => Some(Transition::internal().with_actions(CLEAR_VALIDATION_ACTIONS)),
    WizardEvent::SaveDraft { .. } => Some(
      Transition::internal()
        .guarded(EDITABLE_GUARDS)
        .invoking(&[ServiceKind::SaveDraft]),
    ),
    WizardEvent::AutoSave => Some(
      Transition::internal()
        .guarded(EDITABLE_GUARDS)
        .invoking(&[ServiceKind::AutoSave]),
    ),
    WizardEvent::RestoreDraft { .. } => Some(Transition::internal().invoking(&[ServiceKind::RestoreDraft])),
    _ => None,
  }
}

/// The per-state table. `None` means the state has no transition for the event.
pub fn state_transition(state: WizardState, event: &WizardEvent) -> Option<Transition> {
  use WizardEvent as E;
  use WizardState as S;

  match (state, event) {
    (S::ClientSelection, E::Next) => Some(next(S::BranchSelection)),
    (S::ClientSelection, E::GotoStep { target_step }) => Some(goto(*target_step)),

    (S::BranchSelection, E::Next) => Some(next(S::for_step(WizardStep::ItemManager))),
    (S::BranchSelection, E::Prev) => Some(prev(S::ClientSelection)),
    (S::BranchSelection, E::GotoStep { target_step }) => Some(goto(*target_step)),

    (S::ItemManager(ItemManagerState::ItemWizard(item_step)), _) => {
      item_wizard_transition(item_step, event).or_else(|| item_manager_transition(ItemManagerState::ItemWizard(item_step), event))
    }
    (S::ItemManager(child), _) => item_manager_transition(child, event),

    (S::OrderParameters, E::Next) => Some(next(S::OrderConfirmation)),
    (S::OrderParameters, E::Prev) => Some(prev(S::for_step(WizardStep::ItemManager))),
    (S::OrderParameters, E::GotoStep { target_step }) => Some(goto(*target_step)),

    (S::OrderConfirmation, E::Prev) => Some(prev(S::OrderParameters)),
    (S::OrderConfirmation, E::Complete) => Some(
      Transition::to(S::Completed)
        .guarded(COMPLETE_GUARDS)
        .with_actions(COMPLETE_ACTIONS)
        .invoking(&[ServiceKind::CompleteWizard]),
    ),

    _ => None,
  }
}

/// Transitions owned by the composite `ItemManager` state itself.
fn item_manager_transition(child: ItemManagerState, event: &WizardEvent) -> Option<Transition> {
  use WizardEvent as E;

  match (child, event) {
    (_, E::Next) => Some(next(WizardState::OrderParameters)),
    (_, E::Prev) => Some(prev(WizardState::BranchSelection)),
    (_, E::GotoStep { target_step }) => Some(goto(*target_step)),
    (ItemManagerState::List, E::StartItemWizard) => Some(
      Transition::to(WizardState::item_wizard(ItemWizardStep::first()))
        .guarded(START_ITEM_WIZARD_GUARDS)
        .with_actions(START_ITEM_WIZARD_ACTIONS),
    ),
    (ItemManagerState::List, E::EditItemWizard { start_step, .. }) => Some(
      Transition::to(WizardState::item_wizard(start_step.unwrap_or_else(ItemWizardStep::first)))
        .guarded(START_ITEM_WIZARD_GUARDS)
        .with_actions(START_ITEM_WIZARD_ACTIONS),
    ),
    _ => None,
  }
}

/// Linear navigation inside the item sub-wizard. There is no item-step jump.
fn item_wizard_transition(item_step: ItemWizardStep, event: &WizardEvent) -> Option<Transition> {
  use WizardEvent as E;

  match event {
    E::NextItemStep => item_step.next().map(|next_step| {
      Transition::to(WizardState::item_wizard(next_step))
        .guarded(NEXT_ITEM_STEP_GUARDS)
        .with_actions(NEXT_ITEM_STEP_ACTIONS)
    }),
    E::PrevItemStep => Some(
      Transition::to(WizardState::item_wizard(item_step.prev().unwrap_or(item_step)))
        .guarded(PREV_ITEM_STEP_GUARDS)
        .with_actions(PREV_ITEM_STEP_ACTIONS),
    ),
    E::CompleteItemWizard => Some(
      Transition::to(WizardState::ItemManager(ItemManagerState::List))
        .guarded(COMPLETE_ITEM_WIZARD_GUARDS)
        .with_actions(COMPLETE_ITEM_WIZARD_ACTIONS),
    ),
    E::CancelItemWizard { .. } => Some(
      Transition::to(WizardState::ItemManager(ItemManagerState::List)).with_actions(CANCEL_ITEM_WIZARD_ACTIONS),
    ),
    _ => None,
  }
}
