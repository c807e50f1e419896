// order_wizard/examples/basic_wizard.rs

use async_trait::async_trait;
use order_wizard::{
  CompletionResult, RestoreResult, SaveResult, StepValidation, WizardConfig, WizardContext, WizardEvent, WizardResult,
  WizardServices, WizardSession, WizardStep,
};
use std::sync::Arc;
use tracing::info;

// A stand-in for the HTTP-backed services a real front end would use.
struct DemoServices;

#[async_trait]
impl WizardServices for DemoServices {
  async fn validate_step(&self, ctx: &WizardContext, _event: &WizardEvent) -> anyhow::Result<StepValidation> {
    // Pretend the order needs at least one item before it can move past the item list.
    if ctx.current_step == WizardStep::ItemManager && ctx.items_count == 0 {
      return Ok(StepValidation::invalid(["Add at least one item to the order"]));
    }
    Ok(StepValidation::valid())
  }

  async fn auto_save(&self, ctx: &WizardContext, _event: &WizardEvent) -> anyhow::Result<SaveResult> {
    info!(session = %ctx.session.session_id, "Saving draft.");
    Ok(SaveResult::saved(chrono::Utc::now()))
  }

  async fn restore_draft(&self, _ctx: &WizardContext, draft_id: &str) -> anyhow::Result<RestoreResult> {
    info!(draft_id, "No drafts stored in this demo.");
    Ok(RestoreResult::not_found())
  }

  async fn complete_wizard(&self, _ctx: &WizardContext, _event: &WizardEvent) -> anyhow::Result<CompletionResult> {
    Ok(CompletionResult {
      success: true,
      order_id: "ORD-2024-0001".to_string(),
      receipt_url: "https://example.test/receipts/ORD-2024-0001.pdf".to_string(),
    })
  }
}

async fn validate_and_next(session: &WizardSession<DemoServices>) -> WizardResult<()> {
  session.dispatch(WizardEvent::validate()).await?;
  let report = session.dispatch(WizardEvent::Next).await?;
  let ctx = session.context();
  info!(
    state = %session.state(),
    accepted = !report.is_absorbed(),
    progress = ctx.progress.percentage,
    errors = ?ctx.validation.errors,
    "NEXT dispatched."
  );
  Ok(())
}

#[tokio::main]
async fn main() -> WizardResult<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Order Wizard Example ---");

  let config = WizardConfig::from_env()?;
  let session = WizardSession::new(config, Arc::new(DemoServices));
  session.on_transition(|record| info!(from = %record.from, to = %record.to, event = record.event, "Transition."));

  // Client, then branch.
  validate_and_next(&session).await?;
  validate_and_next(&session).await?;

  // The item list refuses to validate while empty.
  validate_and_next(&session).await?;

  // Add one item through the sub-wizard.
  session.dispatch(WizardEvent::StartItemWizard).await?;
  loop {
    session.dispatch(WizardEvent::validate()).await?;
    if session.dispatch(WizardEvent::NextItemStep).await?.is_absorbed() {
      break;
    }
  }
  session.dispatch(WizardEvent::CompleteItemWizard).await?;
  info!(items = session.context().items_count, "Item added.");

  // Items, order parameters, then confirmation.
  validate_and_next(&session).await?;
  validate_and_next(&session).await?;
  session.dispatch(WizardEvent::validate()).await?;
  session.dispatch(WizardEvent::Complete).await?;

  let ctx = session.context();
  info!(
    state = %session.state(),
    order_id = ?ctx.metadata.order_id,
    completed = ?ctx.progress.completed_steps,
    "Wizard finished."
  );
  Ok(())
}
