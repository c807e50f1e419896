// order_wizard/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
  /// A service was handed an event it cannot work with. Always a caller bug.
  #[error("Malformed event for '{operation}': expected {expected}, got {actual}")]
  MalformedEvent {
    operation: String,
    expected: String,
    actual: String,
  },

  #[error("Service '{operation}' failed. Source: {source}")]
  Service {
    operation: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error for '{key}': {message}")]
  Configuration { key: String, message: String },

  #[error("Session not found: {session_id}")]
  SessionNotFound { session_id: String },

  #[error("Session already registered: {session_id}")]
  SessionExists { session_id: String },

  #[error("Draft (de)serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Internal wizard error: {0}")]
  Internal(String),
}

impl WizardError {
  pub fn service(operation: impl Into<String>, source: AnyhowError) -> Self {
    WizardError::Service {
      operation: operation.into(),
      source,
    }
  }
}

// Errors from collaborators arrive as anyhow::Error.
impl From<AnyhowError> for WizardError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap a WizardError that was boxed into anyhow on the way through a service.
    match err.downcast::<WizardError>() {
      Ok(wizard_err) => wizard_err,
      Err(other) => WizardError::Service {
        operation: "external".to_string(),
        source: other,
      },
    }
  }
}

pub type WizardResult<T, E = WizardError> = std::result::Result<T, E>;
