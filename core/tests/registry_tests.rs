// tests/registry_tests.rs
mod common;

use common::*;
use order_wizard::{SessionRegistry, WizardError, WizardEvent, WizardMode, WizardSession, WizardState};
use serial_test::serial;
use std::sync::Arc;

fn registry() -> SessionRegistry<FakeServices> {
  SessionRegistry::new(test_config(), Arc::new(FakeServices::default()))
}

#[tokio::test]
#[serial]
async fn test_registry_create_get_remove() {
  setup_tracing();
  let registry = registry();
  assert!(registry.is_empty());

  let a = registry.create().unwrap();
  let b = registry.create().unwrap();
  assert_ne!(a.key(), b.key());
  assert_eq!(registry.len(), 2);

  let mut expected = vec![a.key().to_string(), b.key().to_string()];
  expected.sort();
  assert_eq!(registry.session_ids(), expected);

  let fetched = registry.get(a.key()).unwrap();
  assert!(Arc::ptr_eq(&fetched, &a));

  registry.remove(a.key()).unwrap();
  assert!(!registry.contains(a.key()));
  assert_eq!(registry.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_registry_session_not_found() {
  setup_tracing();
  let registry = registry();
  match registry.get("session_nope") {
    Err(WizardError::SessionNotFound { session_id }) => assert_eq!(session_id, "session_nope"),
    other => panic!("Expected SessionNotFound, got {:?}", other.map(|s| s.key().to_string())),
  }
  assert!(matches!(
    registry.remove("session_nope"),
    Err(WizardError::SessionNotFound { .. })
  ));
  let result = registry.dispatch("session_nope", WizardEvent::Next).await;
  assert!(matches!(result, Err(WizardError::SessionNotFound { .. })));
}

#[tokio::test]
#[serial]
async fn test_registry_rejects_duplicate_key() {
  setup_tracing();
  let registry = registry();
  let services = Arc::new(FakeServices::default());
  let ctx = fresh_context();
  registry
    .insert(WizardSession::with_context(test_config(), ctx.clone(), Arc::clone(&services)))
    .unwrap();
  let duplicate = registry.insert(WizardSession::with_context(test_config(), ctx.clone(), services));
  match duplicate {
    Err(WizardError::SessionExists { session_id }) => assert_eq!(session_id, ctx.session.session_id),
    _ => panic!("Expected SessionExists"),
  }
}

#[tokio::test]
#[serial]
async fn test_registry_sessions_are_isolated() {
  setup_tracing();
  let registry = registry();
  let a = registry.create().unwrap();
  let b = registry.create().unwrap();

  registry.dispatch(a.key(), WizardEvent::validate()).await.unwrap();
  registry.dispatch(a.key(), WizardEvent::Next).await.unwrap();

  assert_eq!(a.state(), WizardState::BranchSelection);
  assert_eq!(b.state(), WizardState::ClientSelection);
  assert!(b.context().progress.completed_steps.is_empty());
}

#[tokio::test]
#[serial]
async fn test_registry_create_for_order() {
  setup_tracing();
  let registry = registry();
  let session = registry.create_for_order("ORD-55", WizardMode::View).unwrap();
  let ctx = session.context();
  assert_eq!(ctx.mode, WizardMode::View);
  assert_eq!(ctx.metadata.order_id.as_deref(), Some("ORD-55"));
  assert!(registry.contains(session.key()));
}

#[tokio::test]
#[serial]
async fn test_registry_purges_expired_sessions() {
  setup_tracing();
  let registry = registry();
  let services = Arc::new(FakeServices::default());
  let stale = registry
    .insert(WizardSession::with_context(test_config(), fresh_context(), Arc::clone(&services)))
    .unwrap();
  let mut recent_ctx = fresh_context();
  recent_ctx.session.last_activity = Some(t0() + minutes(50));
  let recent = registry
    .insert(WizardSession::with_context(test_config(), recent_ctx, services))
    .unwrap();

  let purged = registry.purge_expired(t0() + minutes(70));
  assert_eq!(purged, vec![stale.key().to_string()]);
  assert!(registry.contains(recent.key()));
  assert_eq!(registry.len(), 1);
}
