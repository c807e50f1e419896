// order_wizard/src/machine/state.rs

//! The hierarchical state value: top-level steps, with `ItemManager` carrying
//! its own nested list / item-wizard state.

use crate::core::catalog::{ItemWizardStep, WizardStep};
use crate::core::context::WizardContext;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemManagerState {
  #[default]
  List,
  ItemWizard(ItemWizardStep),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardState {
  ClientSelection,
  BranchSelection,
  ItemManager(ItemManagerState),
  OrderParameters,
  OrderConfirmation,
  /// Final. No outgoing transitions.
  Completed,
}

impl WizardState {
  pub const INITIAL: WizardState = WizardState::ClientSelection;

  /// Entry state for a top-level step. Composite states enter their default child.
  pub fn for_step(step: WizardStep) -> Self {
    match step {
      WizardStep::ClientSelection => WizardState::ClientSelection,
      WizardStep::BranchSelection => WizardState::BranchSelection,
      WizardStep::ItemManager => WizardState::ItemManager(ItemManagerState::List),
      WizardStep::OrderParameters => WizardState::OrderParameters,
      WizardStep::OrderConfirmation => WizardState::OrderConfirmation,
    }
  }

  pub fn item_wizard(step: ItemWizardStep) -> Self {
    WizardState::ItemManager(ItemManagerState::ItemWizard(step))
  }

  /// Re-derives the state a context describes. Used after a draft restore.
  pub fn from_context(ctx: &WizardContext) -> Self {
    match (ctx.current_step, ctx.current_item_step) {
      (WizardStep::ItemManager, Some(item_step)) => WizardState::item_wizard(item_step),
      (step, _) => WizardState::for_step(step),
    }
  }

  /// The top-level step this state belongs to, `None` once completed.
  pub fn step(self) -> Option<WizardStep> {
    match self {
      WizardState::ClientSelection => Some(WizardStep::ClientSelection),
      WizardState::BranchSelection => Some(WizardStep::BranchSelection),
      WizardState::ItemManager(_) => Some(WizardStep::ItemManager),
      WizardState::OrderParameters => Some(WizardStep::OrderParameters),
      WizardState::OrderConfirmation => Some(WizardStep::OrderConfirmation),
      WizardState::Completed => None,
    }
  }

  pub fn item_step(self) -> Option<ItemWizardStep> {
    match self {
      WizardState::ItemManager(ItemManagerState::ItemWizard(step)) => Some(step),
      _ => None,
    }
  }

  pub fn is_final(self) -> bool {
    self == WizardState::Completed
  }
}

impl fmt::Display for WizardState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WizardState::ItemManager(ItemManagerState::List) => write!(f, "itemManager.list"),
      WizardState::ItemManager(ItemManagerState::ItemWizard(step)) => write!(f, "itemManager.itemWizard.{}", step),
      WizardState::Completed => write!(f, "completed"),
      other => match other.step() {
        Some(step) => write!(f, "{}", step),
        None => write!(f, "unknown"),
      },
    }
  }
}
