// order_wizard/src/core/catalog.rs

//! The fixed ordering of top-level wizard steps and item sub-steps.
//!
//! Adjacency used by guards and actions is derived from these lists only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A top-level stage of the order wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
  ClientSelection,
  BranchSelection,
  ItemManager,
  OrderParameters,
  OrderConfirmation,
}

/// A sub-step of the item sub-wizard (adding or editing a single order item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemWizardStep {
  ItemBasicInfo,
  ItemProperties,
  DefectsStains,
  PriceCalculator,
  PhotoDocumentation,
}

/// A closed, totally ordered set of steps.
///
/// Implementors only provide `ORDER`; lookups are derived from it.
pub trait StepOrder: Copy + PartialEq + 'static {
  /// Every step, in the order the wizard visits them.
  const ORDER: &'static [Self];

  /// Position of `self` in `ORDER`.
  fn index_of(self) -> Option<usize> {
    Self::ORDER.iter().position(|s| *s == self)
  }

  /// The step right after `self`, `None` at the end.
  fn next(self) -> Option<Self> {
    self.index_of().and_then(|idx| Self::ORDER.get(idx + 1).copied())
  }

  /// The step right before `self`, `None` at the start.
  fn prev(self) -> Option<Self> {
    match self.index_of() {
      Some(idx) if idx > 0 => Self::ORDER.get(idx - 1).copied(),
      _ => None,
    }
  }

  fn first() -> Self {
    Self::ORDER[0]
  }

  fn last() -> Self {
    Self::ORDER[Self::ORDER.len() - 1]
  }

  fn count() -> usize {
    Self::ORDER.len()
  }
}

impl StepOrder for WizardStep {
  const ORDER: &'static [Self] = &[
    WizardStep::ClientSelection,
    WizardStep::BranchSelection,
    WizardStep::ItemManager,
    WizardStep::OrderParameters,
    WizardStep::OrderConfirmation,
  ];
}

impl StepOrder for ItemWizardStep {
  const ORDER: &'static [Self] = &[
    ItemWizardStep::ItemBasicInfo,
    ItemWizardStep::ItemProperties,
    ItemWizardStep::DefectsStains,
    ItemWizardStep::PriceCalculator,
    ItemWizardStep::PhotoDocumentation,
  ];
}

/// Steps that must be passed for an order to be valid. `OrderParameters` has defaults.
pub const REQUIRED_STEPS: &[WizardStep] = &[
  WizardStep::ClientSelection,
  WizardStep::BranchSelection,
  WizardStep::ItemManager,
  WizardStep::OrderConfirmation,
];

/// Item sub-steps an item cannot be saved without. Defects and photos are optional.
pub const REQUIRED_ITEM_STEPS: &[ItemWizardStep] = &[
  ItemWizardStep::ItemBasicInfo,
  ItemWizardStep::ItemProperties,
  ItemWizardStep::PriceCalculator,
];

pub fn is_step_required(step: WizardStep) -> bool {
  REQUIRED_STEPS.contains(&step)
}

pub fn is_item_step_required(step: ItemWizardStep) -> bool {
  REQUIRED_ITEM_STEPS.contains(&step)
}

/// Position-based progress: `round(100 * index / (N - 1))`.
///
/// 0 at the first step, 100 at the last.
pub fn calculate_progress(step: WizardStep) -> u8 {
  let last_idx = (WizardStep::count() - 1) as f64;
  let idx = step.index_of().unwrap_or(0) as f64;
  (100.0 * idx / last_idx).round() as u8
}

/// Item sub-wizard progress: completed sub-steps plus half a step for the active one.
pub fn calculate_item_progress(current: Option<ItemWizardStep>, completed: &[ItemWizardStep]) -> u8 {
  let started = if current.is_some() { 0.5 } else { 0.0 };
  let total = ItemWizardStep::count() as f64;
  let pct = ((completed.len() as f64 + started) / total * 100.0).round();
  pct.min(100.0) as u8
}

impl WizardStep {
  /// Wire name, identical to the serde representation.
  pub fn as_str(self) -> &'static str {
    match self {
      WizardStep::ClientSelection => "clientSelection",
      WizardStep::BranchSelection => "branchSelection",
      WizardStep::ItemManager => "itemManager",
      WizardStep::OrderParameters => "orderParameters",
      WizardStep::OrderConfirmation => "orderConfirmation",
    }
  }
}

impl ItemWizardStep {
  pub fn as_str(self) -> &'static str {
    match self {
      ItemWizardStep::ItemBasicInfo => "itemBasicInfo",
      ItemWizardStep::ItemProperties => "itemProperties",
      ItemWizardStep::DefectsStains => "defectsStains",
      ItemWizardStep::PriceCalculator => "priceCalculator",
      ItemWizardStep::PhotoDocumentation => "photoDocumentation",
    }
  }
}

impl fmt::Display for WizardStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl fmt::Display for ItemWizardStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
