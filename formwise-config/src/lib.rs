//! Configuration for formwise forms.
//!
//! A [`FormConfig`] holds the selectors that locate a form, its groups and
//! message slots ([`FormOptions`]) plus rules written as data
//! ([`RuleSpec`]). Configs load from JSON, TOML or `.env` text, and
//! `FORMWISE_*` environment variables override file options.
//!
//! ```
//! use formwise_config::{FileFormat, FormConfig, RuleSpec};
//!
//! let config = FormConfig::parse(
//!     r##"
//!     form = ".sign-in-htm"
//!     group_selector = ".group"
//!     error_message_selector = ".message"
//!
//!     [[rules]]
//!     kind = "required"
//!     selector = "#sign-in-user"
//!     "##,
//!     FileFormat::Toml,
//! )
//! .unwrap();
//!
//! assert_eq!(config.rules[0].selector(), "#sign-in-user");
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod options;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use options::{FormConfig, FormOptions, FormsFile, RadioPolicy, RuleSpec};
