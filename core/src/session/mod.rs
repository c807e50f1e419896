// order_wizard/src/session/mod.rs

//! Async driver around one `WizardMachine`: dispatches events, performs the
//! service calls transitions ask for and feeds their results back.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::WizardSession;
pub use execution::DispatchReport;
pub use hooks::{TransitionHook, TransitionRecord};
