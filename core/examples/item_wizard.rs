// order_wizard/examples/item_wizard.rs

use order_wizard::{
  ItemWizardStep, ServiceEvent, StepValidation, WizardConfig, WizardContext, WizardEvent, WizardMachine, WizardStep,
};
use tracing::info;

// Drives the bare machine, resolving validation by hand instead of through a session.
fn validate(machine: &mut WizardMachine, result: StepValidation) {
  machine.send(WizardEvent::validate());
  machine.resolve(ServiceEvent::ValidationResolved(result));
}

fn log_position(machine: &WizardMachine, label: &str) {
  let ctx = machine.context();
  info!(
    state = %machine.state(),
    item_progress = ctx.item_progress(),
    editing = ?ctx.editing_item_id,
    completed = ?ctx.progress.completed_item_steps,
    "{}", label
  );
}

fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Item Sub-Wizard Example ---");

  let config = WizardConfig::default();
  let mut ctx = WizardContext::new_session(&config);
  ctx.current_step = WizardStep::ItemManager;
  let mut machine = WizardMachine::with_context(config, ctx);

  // Edit an existing item straight at the pricing sub-step.
  machine.send(WizardEvent::edit_item("item-12", Some(ItemWizardStep::PriceCalculator)));
  log_position(&machine, "Editing item.");

  // Pricing fails validation first; NEXT_ITEM_STEP is absorbed.
  validate(&mut machine, StepValidation::invalid(["Price must be positive"]));
  let outcome = machine.send(WizardEvent::NextItemStep);
  info!(?outcome, errors = ?machine.context().validation.errors, "Blocked by validation.");

  validate(&mut machine, StepValidation::valid().with_warnings(["Discount exceeds 30%"]));
  machine.send(WizardEvent::NextItemStep);
  log_position(&machine, "On photos.");

  // Jumping between sub-steps is not part of the flow.
  let outcome = machine.send(WizardEvent::GotoItemStep {
    target_item_step: ItemWizardStep::ItemBasicInfo,
  });
  info!(?outcome, "GOTO_ITEM_STEP ignored.");

  validate(&mut machine, StepValidation::valid());
  machine.send(WizardEvent::CompleteItemWizard);
  log_position(&machine, "Back on the item list.");

  // Start a new item and abandon it.
  machine.send(WizardEvent::StartItemWizard);
  validate(&mut machine, StepValidation::valid());
  machine.send(WizardEvent::NextItemStep);
  machine.send(WizardEvent::CancelItemWizard { confirm_cancel: Some(true) });
  log_position(&machine, "New item cancelled.");
  info!(items_added = machine.context().items_count, "Done.");
}
