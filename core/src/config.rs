// order_wizard/src/config.rs

//! Session-level tunables: auto-save cadence, session timeouts, default mode.

use crate::core::context::WizardMode;
use crate::error::{WizardError, WizardResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_VALIDATION_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_SESSION_WARNING_MS: u64 = 1_800_000;
pub const DEFAULT_SESSION_TIMEOUT_MS: u64 = 3_600_000;

/// Converts a millisecond count into a `Duration`, `None` when it does not fit.
pub fn duration_from_ms(ms: u64) -> Option<Duration> {
  i64::try_from(ms).ok().and_then(Duration::try_milliseconds)
}

/// Like `duration_from_ms`, saturating at `Duration::MAX`.
pub(crate) fn saturating_duration_from_ms(ms: u64) -> Duration {
  duration_from_ms(ms).unwrap_or(Duration::MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WizardConfig {
  pub auto_save_interval_ms: u64,
  pub validation_debounce_ms: u64,
  /// Idle time after which the UI should warn that the session is about to expire.
  pub session_warning_ms: u64,
  pub session_timeout_ms: u64,
  pub default_mode: WizardMode,
  pub is_persistent: bool,
  pub auto_save_enabled: bool,
  pub return_url: Option<String>,
}

impl Default for WizardConfig {
  fn default() -> Self {
    Self {
      auto_save_interval_ms: DEFAULT_AUTO_SAVE_INTERVAL_MS,
      validation_debounce_ms: DEFAULT_VALIDATION_DEBOUNCE_MS,
      session_warning_ms: DEFAULT_SESSION_WARNING_MS,
      session_timeout_ms: DEFAULT_SESSION_TIMEOUT_MS,
      default_mode: WizardMode::Create,
      is_persistent: true,
      auto_save_enabled: true,
      return_url: None,
    }
  }
}

impl WizardConfig {
  /// Builds a config from `ORDER_WIZARD_*` environment variables, falling back
  /// to defaults for anything unset. A `.env` file is honoured if present.
  pub fn from_env() -> WizardResult<Self> {
    dotenvy::dotenv().ok();

    let defaults = Self::default();
    let get_env = |var_name: &str| env::var(var_name).ok();

    let parse_ms = |key: &str, fallback: u64| -> WizardResult<u64> {
      match get_env(key) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|e| WizardError::Configuration {
          key: key.to_string(),
          message: format!("expected milliseconds, got '{}': {}", raw, e),
        }),
        None => Ok(fallback),
      }
    };
    let parse_bool = |key: &str, fallback: bool| -> WizardResult<bool> {
      match get_env(key) {
        Some(raw) => raw.trim().parse::<bool>().map_err(|e| WizardError::Configuration {
          key: key.to_string(),
          message: format!("expected true/false, got '{}': {}", raw, e),
        }),
        None => Ok(fallback),
      }
    };

    let default_mode = match get_env("ORDER_WIZARD_DEFAULT_MODE") {
      Some(raw) => WizardMode::parse(&raw).ok_or_else(|| WizardError::Configuration {
        key: "ORDER_WIZARD_DEFAULT_MODE".to_string(),
        message: format!("unknown mode '{}', expected create, edit or view", raw),
      })?,
      None => defaults.default_mode,
    };

    let config = Self {
      auto_save_interval_ms: parse_ms("ORDER_WIZARD_AUTO_SAVE_INTERVAL_MS", defaults.auto_save_interval_ms)?,
      validation_debounce_ms: parse_ms("ORDER_WIZARD_VALIDATION_DEBOUNCE_MS", defaults.validation_debounce_ms)?,
      session_warning_ms: parse_ms("ORDER_WIZARD_SESSION_WARNING_MS", defaults.session_warning_ms)?,
      session_timeout_ms: parse_ms("ORDER_WIZARD_SESSION_TIMEOUT_MS", defaults.session_timeout_ms)?,
      default_mode,
      is_persistent: parse_bool("ORDER_WIZARD_PERSISTENT", defaults.is_persistent)?,
      auto_save_enabled: parse_bool("ORDER_WIZARD_AUTO_SAVE", defaults.auto_save_enabled)?,
      return_url: get_env("ORDER_WIZARD_RETURN_URL").filter(|s| !s.trim().is_empty()),
    };
    config.validate()?;

    tracing::info!(
      auto_save_interval_ms = config.auto_save_interval_ms,
      default_mode = ?config.default_mode,
      "Wizard configuration loaded."
    );
    Ok(config)
  }

  pub fn validate(&self) -> WizardResult<()> {
    let timings = [
      ("auto_save_interval_ms", self.auto_save_interval_ms),
      ("validation_debounce_ms", self.validation_debounce_ms),
      ("session_warning_ms", self.session_warning_ms),
      ("session_timeout_ms", self.session_timeout_ms),
    ];
    for (key, ms) in timings {
      if duration_from_ms(ms).is_none() {
        return Err(WizardError::Configuration {
          key: key.to_string(),
          message: format!("{} ms is out of range", ms),
        });
      }
    }
    if self.auto_save_interval_ms == 0 {
      return Err(WizardError::Configuration {
        key: "auto_save_interval_ms".to_string(),
        message: "auto-save interval must be greater than zero".to_string(),
      });
    }
    if self.session_warning_ms >= self.session_timeout_ms {
      return Err(WizardError::Configuration {
        key: "session_warning_ms".to_string(),
        message: format!(
          "warning ({} ms) must come before the timeout ({} ms)",
          self.session_warning_ms, self.session_timeout_ms
        ),
      });
    }
    Ok(())
  }

  pub fn auto_save_interval(&self) -> Duration {
    saturating_duration_from_ms(self.auto_save_interval_ms)
  }

  pub fn session_warning(&self) -> Duration {
    saturating_duration_from_ms(self.session_warning_ms)
  }

  pub fn session_timeout(&self) -> Duration {
    saturating_duration_from_ms(self.session_timeout_ms)
  }
}
