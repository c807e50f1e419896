pub mod catalog;
pub mod context;
pub mod context_data;
pub mod control;
pub mod event;

pub use catalog::{ItemWizardStep, StepOrder, WizardStep};
pub use context::{WizardContext, WizardMode};
pub use context_data::ContextData;
pub use control::{AbsorbReason, ServiceKind, ServiceRequest, SessionStatus, TransitionOutcome};
pub use event::{ServiceEvent, WizardEvent};
