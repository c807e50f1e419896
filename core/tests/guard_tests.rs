// tests/guard_tests.rs
mod common;

use common::*;
use order_wizard::machine::guards::*;
use order_wizard::{ItemWizardStep, StepOrder, WizardEvent, WizardMode, WizardStep};

#[test]
fn test_can_proceed_needs_valid_and_can_proceed() {
  setup_tracing();
  let mut ctx = fresh_context();
  assert!(!can_proceed_to_next_step(&ctx, &WizardEvent::Next));
  ctx.validation.is_valid = true;
  assert!(!can_proceed_to_next_step(&ctx, &WizardEvent::Next));
  ctx.progress.can_proceed = true;
  assert!(can_proceed_to_next_step(&ctx, &WizardEvent::Next));
}

#[test]
fn test_can_return_everywhere_but_first_step() {
  for step in WizardStep::ORDER {
    let ctx = context_at(*step);
    assert_eq!(can_return_to_prev_step(&ctx, &WizardEvent::Prev), *step != WizardStep::ClientSelection);
  }
}

#[test]
fn test_goto_reachability_for_every_pair() {
  for current in WizardStep::ORDER {
    for target in WizardStep::ORDER {
      let ctx = context_at(*current);
      let event = WizardEvent::goto_step(*target);
      let cur = current.index_of().unwrap();
      let tgt = target.index_of().unwrap();
      assert_eq!(
        can_goto_step(&ctx, &event),
        tgt <= cur + 1,
        "goto {:?} -> {:?} with nothing completed",
        current,
        target
      );
    }
  }
}

#[test]
fn test_goto_completed_step_is_always_allowed() {
  let ctx = with_completed(
    context_at(WizardStep::ClientSelection),
    &[WizardStep::ClientSelection, WizardStep::BranchSelection, WizardStep::ItemManager, WizardStep::OrderParameters],
  );
  assert!(can_goto_step(&ctx, &WizardEvent::goto_step(WizardStep::OrderParameters)));
  // Two ahead of current and not completed.
  assert!(!can_goto_step(&ctx, &WizardEvent::goto_step(WizardStep::OrderConfirmation)));
  // Wrong event shape never passes.
  assert!(!can_goto_step(&ctx, &WizardEvent::Next));
}

#[test]
fn test_item_wizard_guards() {
  let mut ctx = context_at(WizardStep::ItemManager);
  assert!(can_start_item_wizard(&ctx, &WizardEvent::StartItemWizard));
  assert!(!can_start_item_wizard(&context_at(WizardStep::OrderParameters), &WizardEvent::StartItemWizard));

  ctx.current_item_step = Some(ItemWizardStep::ItemBasicInfo);
  assert!(!can_proceed_item_step(&ctx, &WizardEvent::NextItemStep));
  assert!(!can_return_item_step(&ctx, &WizardEvent::PrevItemStep));
  ctx.validation.is_valid = true;
  assert!(can_proceed_item_step(&ctx, &WizardEvent::NextItemStep));
  assert!(!can_complete_item_wizard(&ctx, &WizardEvent::CompleteItemWizard));

  ctx.current_item_step = Some(ItemWizardStep::PhotoDocumentation);
  assert!(can_return_item_step(&ctx, &WizardEvent::PrevItemStep));
  assert!(can_complete_item_wizard(&ctx, &WizardEvent::CompleteItemWizard));
  ctx.validation.is_valid = false;
  assert!(!can_complete_item_wizard(&ctx, &WizardEvent::CompleteItemWizard));
}

#[test]
fn test_can_complete_requires_every_other_step() {
  let all_but_last = [
    WizardStep::ClientSelection,
    WizardStep::BranchSelection,
    WizardStep::ItemManager,
    WizardStep::OrderParameters,
  ];
  let mut ctx = with_completed(context_at(WizardStep::OrderConfirmation), &all_but_last);
  ctx.validation.is_valid = true;
  assert!(can_complete(&ctx, &WizardEvent::Complete));

  for missing in all_but_last {
    let remaining: Vec<WizardStep> = all_but_last.iter().copied().filter(|s| *s != missing).collect();
    let mut partial = with_completed(context_at(WizardStep::OrderConfirmation), &remaining);
    partial.validation.is_valid = true;
    assert!(!can_complete(&partial, &WizardEvent::Complete), "missing {:?}", missing);
  }

  let mut invalid = ctx.clone();
  invalid.validation.is_valid = false;
  assert!(!can_complete(&invalid, &WizardEvent::Complete));
}

#[test]
fn test_needs_validation() {
  let mut ctx = fresh_context();
  assert!(needs_validation(&ctx, &WizardEvent::Next));
  ctx.validation.is_valid = true;
  assert!(!needs_validation(&ctx, &WizardEvent::Next));
  ctx.validation.errors.push("phone is required".to_string());
  assert!(needs_validation(&ctx, &WizardEvent::Next));
}

#[test]
fn test_view_mode_is_not_editable() {
  let mut ctx = fresh_context();
  assert!(is_editable(&ctx, &WizardEvent::AutoSave));
  ctx.mode = WizardMode::Edit;
  assert!(is_editable(&ctx, &WizardEvent::AutoSave));
  ctx.mode = WizardMode::View;
  assert!(!is_editable(&ctx, &WizardEvent::AutoSave));
}

#[test]
fn test_auto_save_due_after_interval() {
  let mut ctx = fresh_context();
  // No activity yet: due.
  assert!(should_auto_save_at(&ctx, t0()));
  assert!(!has_unsaved_changes(&ctx, &WizardEvent::AutoSave));

  ctx.session.last_activity = Some(t0());
  assert!(!should_auto_save_at(&ctx, t0() + chrono::Duration::seconds(29)));
  assert!(should_auto_save_at(&ctx, t0() + chrono::Duration::seconds(30)));
}

#[test]
fn test_session_expiry_and_warning() {
  let config = test_config();
  let mut ctx = fresh_context();
  assert!(!should_warn_session(&ctx, t0() + minutes(29), config.session_warning()));
  assert!(should_warn_session(&ctx, t0() + minutes(30), config.session_warning()));
  assert!(!is_session_expired(&ctx, t0() + minutes(59), config.session_timeout()));
  assert!(is_session_expired(&ctx, t0() + minutes(60), config.session_timeout()));

  // Activity pushes the deadline out.
  ctx.session.last_activity = Some(t0() + minutes(45));
  assert!(!is_session_expired(&ctx, t0() + minutes(60), config.session_timeout()));
}

#[test]
fn test_auto_save_due_one_ms_past_interval() {
  let mut ctx = fresh_context();
  let now = t0() + minutes(10);
  let interval = ctx.session.auto_save_interval();
  ctx.session.last_activity = Some(now - interval - chrono::Duration::milliseconds(1));
  assert!(should_auto_save_at(&ctx, now));

  ctx.session.last_activity = Some(now - interval + chrono::Duration::milliseconds(1));
  assert!(!should_auto_save_at(&ctx, now));
}

#[test]
fn test_guards_are_pure() {
  setup_tracing();
  let guards = [
    NamedGuard::new("canProceedToNextStep", can_proceed_to_next_step),
    NamedGuard::new("canReturnToPrevStep", can_return_to_prev_step),
    NamedGuard::new("canGotoStep", can_goto_step),
    NamedGuard::new("canStartItemWizard", can_start_item_wizard),
    NamedGuard::new("canProceedItemStep", can_proceed_item_step),
    NamedGuard::new("canReturnItemStep", can_return_item_step),
    NamedGuard::new("canCompleteItemWizard", can_complete_item_wizard),
    NamedGuard::new("needsValidation", needs_validation),
    NamedGuard::new("canComplete", can_complete),
    NamedGuard::new("hasUnsavedChanges", has_unsaved_changes),
    NamedGuard::new("isEditable", is_editable),
  ];

  let mut in_item_wizard = context_at(WizardStep::ItemManager);
  in_item_wizard.current_item_step = Some(ItemWizardStep::DefectsStains);
  make_valid(&mut in_item_wizard);
  let mut confirming = with_completed(
    context_at(WizardStep::OrderConfirmation),
    &[WizardStep::ClientSelection, WizardStep::BranchSelection],
  );
  confirming.session.has_unsaved_changes = true;
  let contexts = [fresh_context(), in_item_wizard, confirming];
  let events = [
    WizardEvent::Next,
    WizardEvent::goto_step(WizardStep::BranchSelection),
    WizardEvent::Complete,
  ];

  for ctx in &contexts {
    for event in &events {
      for guard in &guards {
        let before = ctx.clone();
        let first = guard.evaluate(ctx, event);
        let second = guard.evaluate(ctx, event);
        assert_eq!(first, second, "{} changed its answer", guard.name);
        assert_eq!(ctx, &before, "{} touched the context", guard.name);
      }
    }
  }
}
