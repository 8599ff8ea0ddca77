// Environment variable loading

use crate::{ConfigError, FormOptions, Result};
use std::env;

/// Prefix used for every formwise variable
pub const ENV_PREFIX: &str = "FORMWISE";

/// Reads prefixed environment variables
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load `.env` from `path`, or from the working directory if it exists
    pub fn load_dotenv(&self, path: Option<&str>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Ok(())
    }

    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// `None` if the variable is unset or not unicode
    pub fn load_var_opt(&self, key: &str) -> Option<String> {
        self.load_var(key).ok()
    }

    /// Overwrite option fields that have a matching variable set
    pub fn apply_overrides(&self, options: &mut FormOptions) {
        let targets: [(&str, &mut String); 5] = [
            ("FORM", &mut options.form),
            ("GROUP_SELECTOR", &mut options.group_selector),
            ("ERROR_MESSAGE_SELECTOR", &mut options.error_message_selector),
            ("INVALID_CLASS", &mut options.invalid_class),
            ("SUBMIT_SELECTOR", &mut options.submit_selector),
        ];

        for (key, slot) in targets {
            if let Some(value) = self.load_var_opt(key) {
                *slot = value;
            }
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }
}
