// tests/session_tests.rs
mod common;

use common::*;
use order_wizard::{
  ItemWizardStep, ServiceKind, StepValidation, TransitionOutcome, TransitionRecord, WizardContext, WizardEvent,
  WizardSession, WizardState, WizardStep,
};
use parking_lot::Mutex;
use serial_test::serial;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn session_with(ctx: WizardContext) -> (WizardSession<FakeServices>, Arc<FakeServices>) {
  let services = Arc::new(FakeServices::default());
  let session = WizardSession::with_context(test_config(), ctx, Arc::clone(&services));
  (session, services)
}

async fn validate_and_next(session: &WizardSession<FakeServices>) {
  session.dispatch_at(WizardEvent::validate(), t0()).await.unwrap();
  let report = session.dispatch_at(WizardEvent::Next, t0()).await.unwrap();
  assert!(report.outcome.is_transition(), "NEXT rejected: {:?}", report);
}

#[tokio::test]
#[serial]
async fn test_dispatch_runs_validation_and_feeds_result_back() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());

  let report = session.dispatch_at(WizardEvent::validate(), t0()).await.unwrap();
  assert_eq!(report.outcome.requests()[0].service, ServiceKind::ValidateStep);
  assert_eq!(report.follow_ups.len(), 1);
  assert_eq!(services.calls(), vec!["validateStep"]);

  let ctx = session.context();
  assert!(ctx.validation.is_valid);
  assert!(!ctx.validation.is_validating);
  assert_eq!(ctx.progress.completed_steps, vec![WizardStep::ClientSelection]);
  assert!(session.can(&WizardEvent::Next));
}

#[tokio::test]
#[serial]
async fn test_absorbed_event_calls_no_service() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());
  let report = session.dispatch_at(WizardEvent::Next, t0()).await.unwrap();
  assert!(report.is_absorbed());
  assert!(report.follow_ups.is_empty());
  assert!(services.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn test_full_order_through_session() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());

  validate_and_next(&session).await;
  validate_and_next(&session).await;

  session.dispatch_at(WizardEvent::StartItemWizard, t0()).await.unwrap();
  for _ in 0..4 {
    session.dispatch_at(WizardEvent::validate(), t0()).await.unwrap();
    session.dispatch_at(WizardEvent::NextItemStep, t0()).await.unwrap();
  }
  assert_eq!(session.state(), WizardState::item_wizard(ItemWizardStep::PhotoDocumentation));
  session.dispatch_at(WizardEvent::validate(), t0()).await.unwrap();
  session.dispatch_at(WizardEvent::CompleteItemWizard, t0()).await.unwrap();
  assert_eq!(session.context().items_count, 1);

  validate_and_next(&session).await;
  validate_and_next(&session).await;
  assert_eq!(session.state(), WizardState::OrderConfirmation);

  session.dispatch_at(WizardEvent::validate(), t0()).await.unwrap();
  let report = session.dispatch_at(WizardEvent::Complete, t0()).await.unwrap();
  assert!(report.outcome.is_transition());
  assert_eq!(services.call_count("completeWizard"), 1);

  assert_eq!(session.state(), WizardState::Completed);
  let ctx = session.context();
  assert_eq!(ctx.metadata.order_id.as_deref(), Some("ORD-1001"));
  assert!(ctx.metadata.custom_data.contains_key("receiptUrl"));
  assert!(!ctx.session.has_unsaved_changes);

  // Nothing leaves completed.
  let report = session.dispatch_at(WizardEvent::reset(), t0()).await.unwrap();
  assert!(report.is_absorbed());
}

#[tokio::test]
#[serial]
async fn test_validation_service_error_becomes_invalid_step() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());
  services.fail_validation.store(true, Ordering::SeqCst);

  let report = session.dispatch_at(WizardEvent::validate(), t0()).await.unwrap();
  assert!(matches!(report.follow_ups[0], TransitionOutcome::Handled { .. }));
  let ctx = session.context();
  assert!(!ctx.validation.is_valid);
  assert_eq!(ctx.validation.errors, vec!["validator unreachable".to_string()]);
}

#[tokio::test]
#[serial]
async fn test_invalid_result_blocks_next() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());
  services.answer_validation(StepValidation::invalid(["client is required"]));

  session.dispatch_at(WizardEvent::validate(), t0()).await.unwrap();
  let report = session.dispatch_at(WizardEvent::Next, t0()).await.unwrap();
  assert!(report.is_absorbed());
  assert_eq!(session.state(), WizardState::ClientSelection);
}

#[tokio::test]
#[serial]
async fn test_save_draft_clears_unsaved_changes() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());
  validate_and_next(&session).await;
  assert!(session.context().session.has_unsaved_changes);

  session.dispatch_at(WizardEvent::SaveDraft { silent: None }, t0()).await.unwrap();
  assert_eq!(services.call_count("saveDraft"), 1);
  let ctx = session.context();
  assert!(!ctx.session.has_unsaved_changes);
  assert_eq!(ctx.session.last_saved, Some(t0() + minutes(1)));
}

#[tokio::test]
#[serial]
async fn test_failed_save_keeps_unsaved_changes() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());
  validate_and_next(&session).await;
  services.fail_saves.store(true, Ordering::SeqCst);

  let report = session.dispatch_at(WizardEvent::SaveDraft { silent: None }, t0()).await.unwrap();
  assert_eq!(report.follow_ups.len(), 1);
  assert!(session.context().session.has_unsaved_changes);
  assert_eq!(session.context().session.last_saved, None);
}

#[tokio::test]
#[serial]
async fn test_auto_save_skips_service_without_changes() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());
  let report = session.dispatch_at(WizardEvent::AutoSave, t0()).await.unwrap();
  assert_eq!(report.follow_ups.len(), 1);
  assert_eq!(services.call_count("autoSave"), 0);
}

#[tokio::test]
#[serial]
async fn test_tick_fires_auto_save_after_interval() {
  setup_tracing();
  let (session, services) = session_with(fresh_context());
  assert!(session.tick_at(t0()).await.unwrap().is_none(), "nothing to save yet");

  validate_and_next(&session).await;
  assert!(session.tick_at(t0() + chrono::Duration::seconds(10)).await.unwrap().is_none());

  let report = session.tick_at(t0() + chrono::Duration::seconds(30)).await.unwrap();
  assert!(report.is_some());
  assert_eq!(services.call_count("autoSave"), 1);
  assert!(!session.context().session.has_unsaved_changes);

  // Saved: the next tick has nothing to do.
  assert!(session.tick_at(t0() + minutes(5)).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_restore_draft_round_trip() {
  setup_tracing();
  let mut draft = with_completed(
    context_at(WizardStep::ItemManager),
    &[WizardStep::ClientSelection, WizardStep::BranchSelection],
  );
  draft.current_item_step = Some(ItemWizardStep::PriceCalculator);
  let (session, services) = session_with(fresh_context());
  services.store_draft("draft-77", draft.clone());

  let report = session.dispatch_at(WizardEvent::restore_draft("draft-77"), t0()).await.unwrap();
  assert!(report.follow_ups[0].is_transition());
  assert_eq!(session.state(), WizardState::item_wizard(ItemWizardStep::PriceCalculator));
  assert_eq!(session.context(), draft);

  let report = session.dispatch_at(WizardEvent::restore_draft("missing"), t0()).await.unwrap();
  assert!(!report.follow_ups[0].is_transition());
  assert_eq!(session.context(), draft);
}

#[tokio::test]
#[serial]
async fn test_transition_hooks_see_accepted_transitions_only() {
  setup_tracing();
  let (session, _services) = session_with(fresh_context());
  let seen: Arc<Mutex<Vec<TransitionRecord>>> = Arc::new(Mutex::new(Vec::new()));
  let sink = Arc::clone(&seen);
  session.on_transition(move |record| sink.lock().push(record.clone()));
  assert_eq!(session.hook_count(), 1);

  session.dispatch_at(WizardEvent::Next, t0()).await.unwrap(); // absorbed
  validate_and_next(&session).await;

  let records = seen.lock().clone();
  assert_eq!(
    records,
    vec![TransitionRecord {
      from: WizardState::ClientSelection,
      to: WizardState::BranchSelection,
      event: "NEXT",
    }]
  );
}

#[tokio::test]
#[serial]
async fn test_session_key_survives_reset() {
  setup_tracing();
  let (session, _services) = session_with(fresh_context());
  let key = session.key().to_string();
  assert_eq!(session.session_id(), key);

  session.dispatch_at(WizardEvent::reset(), t0()).await.unwrap();
  assert_eq!(session.key(), key);
  assert_ne!(session.session_id(), key);
}

#[tokio::test]
#[serial]
async fn test_expiry_helpers_follow_activity() {
  let (session, _services) = session_with(fresh_context());
  assert!(session.should_warn_at(t0() + minutes(31)));
  assert!(session.is_expired_at(t0() + minutes(61)));

  validate_and_next(&session).await; // activity at t0
  assert!(!session.is_expired_at(t0() + minutes(59)));
  assert_eq!(session.snapshot().state(), WizardState::BranchSelection);
}

#[tokio::test]
#[serial]
async fn test_handle_observes_dispatched_changes() {
  setup_tracing();
  let (session, _services) = session_with(fresh_context());
  let handle = session.handle();
  let before = handle.snapshot();

  validate_and_next(&session).await;
  assert_eq!(handle.read().state(), WizardState::BranchSelection);
  assert_eq!(before.state(), WizardState::ClientSelection);

  let cloned = handle.clone();
  cloned.with_write(|machine| machine.send_at(WizardEvent::Prev, t0()));
  assert_eq!(session.state(), WizardState::ClientSelection);
}
