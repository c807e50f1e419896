// src/lib.rs

//! Order Wizard: the navigation and progress state machine behind a
//! multi-step dry-cleaning order form.
//!
//! The wizard walks an operator through five top-level steps (client, branch,
//! items, order parameters, confirmation); the items step hosts a nested
//! five-step item sub-wizard. The crate provides:
//!  - A hierarchical state machine whose guards encode every business rule.
//!    Rejected events are absorbed, never errors.
//!  - Pure context actions for navigation, progress, validation and session upkeep.
//!  - An async session driver that calls validation/save/restore/completion
//!    services and feeds their results back into the machine.
//!  - A registry of live sessions, one context per session.

pub mod config;
pub mod core;
pub mod error;
pub mod machine;
pub mod registry;
pub mod services;
pub mod session;

// --- Re-exports for the Public API ---

pub use crate::config::WizardConfig;
pub use crate::core::catalog::{calculate_item_progress, calculate_progress, ItemWizardStep, StepOrder, WizardStep};
pub use crate::core::context::{WizardContext, WizardMode};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{AbsorbReason, ServiceKind, ServiceRequest, SessionStatus, TransitionOutcome};
pub use crate::core::event::{ServiceEvent, WizardEvent};

pub use crate::machine::definition::WizardMachine;
pub use crate::machine::state::{ItemManagerState, WizardState};

pub use crate::services::{CompletionResult, RestoreResult, SaveResult, StepValidation, WizardServices};
pub use crate::session::{DispatchReport, TransitionRecord, WizardSession};
pub use crate::registry::SessionRegistry;

pub use crate::error::{WizardError, WizardResult};

/*
    Typical driver loop:
    1. Build a `WizardConfig` (`WizardConfig::from_env()` or `Default`).
    2. Implement `WizardServices` over your API client.
    3. Open a session via `SessionRegistry::create()` or `WizardSession::new(config, services)`.
    4. Forward UI intents as `WizardEvent`s to `session.dispatch(event).await`.
    5. Call `session.tick().await` periodically to let auto-save fire.
    6. Render from `session.context()` / `session.state()`.
*/
