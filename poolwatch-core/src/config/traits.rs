//! Configuration traits for validation and environment overrides.

use crate::error::ConfigError;

/// Trait for types that can be validated.
///
/// # Example
///
/// ```rust
/// use poolwatch_core::config::Validatable;
/// use poolwatch_core::error::ConfigError;
///
/// struct Window {
///     size: u32,
/// }
///
/// impl Validatable for Window {
///     fn validate(&self) -> Result<(), ConfigError> {
///         if self.size == 0 {
///             return Err(ConfigError::invalid_value("size", "must be positive"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Trait for types that support environment variable overrides.
pub trait Configurable: Sized {
    /// Applies environment variable overrides using `prefix` (e.g. `POOLWATCH`).
    fn apply_env_overrides(&mut self, prefix: &str);

    /// Returns the environment variable names that can override this configuration.
    fn env_var_names(prefix: &str) -> Vec<String>;
}

/// Helpers for reading override values from the environment.
pub struct EnvOverride;

impl EnvOverride {
    /// Replaces `target` with the variable's value when it is set and non-empty.
    pub fn apply_string(var_name: &str, target: &mut String) {
        if let Ok(value) = std::env::var(var_name) {
            if !value.is_empty() {
                *target = value;
            }
        }
    }
}
