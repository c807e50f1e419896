// order_wizard/src/machine/mod.rs

//! The hierarchical order-wizard state machine: states, guards, actions, the
//! transition table and the `send`/`resolve` entry points.

pub mod actions;
pub mod definition;
pub mod execution;
pub mod guards;
pub mod state;
pub mod transitions;

pub use actions::ContextPatch;
pub use definition::WizardMachine;
pub use state::{ItemManagerState, WizardState};
