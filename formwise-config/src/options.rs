// Form options and declarative rules

use crate::{ConfigError, ConfigLoader, EnvLoader, FileFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_invalid_class() -> String {
    "invalid".to_string()
}

fn default_submit_selector() -> String {
    ".button".to_string()
}

/// What aggregation records for a radio group with nothing checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioPolicy {
    /// Leave the name out of the record
    #[default]
    Omit,
    /// Record the name with an empty value
    Null,
}

/// Where a form and its message slots live in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOptions {
    /// Selector of the form element
    pub form: String,

    /// Ancestor selector marking a field's display group
    #[serde(default)]
    pub group_selector: String,

    /// Selector of the message slot inside a group
    #[serde(default)]
    pub error_message_selector: String,

    /// Class toggled on a group while its field is invalid
    #[serde(default = "default_invalid_class")]
    pub invalid_class: String,

    /// Selector, inside the form, of the element whose click submits
    #[serde(default = "default_submit_selector")]
    pub submit_selector: String,

    #[serde(default)]
    pub radio_policy: RadioPolicy,
}

impl FormOptions {
    pub fn new(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            group_selector: String::new(),
            error_message_selector: String::new(),
            invalid_class: default_invalid_class(),
            submit_selector: default_submit_selector(),
            radio_policy: RadioPolicy::default(),
        }
    }

    pub fn group_selector(mut self, selector: impl Into<String>) -> Self {
        self.group_selector = selector.into();
        self
    }

    pub fn error_message_selector(mut self, selector: impl Into<String>) -> Self {
        self.error_message_selector = selector.into();
        self
    }

    pub fn invalid_class(mut self, class: impl Into<String>) -> Self {
        self.invalid_class = class.into();
        self
    }

    pub fn submit_selector(mut self, selector: impl Into<String>) -> Self {
        self.submit_selector = selector.into();
        self
    }

    pub fn radio_policy(mut self, policy: RadioPolicy) -> Self {
        self.radio_policy = policy;
        self
    }

    /// Reject options that cannot locate anything
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("form", &self.form),
            ("group_selector", &self.group_selector),
            ("error_message_selector", &self.error_message_selector),
            ("invalid_class", &self.invalid_class),
            ("submit_selector", &self.submit_selector),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// A rule written down as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    Required {
        selector: String,
        #[serde(default)]
        message: Option<String>,
    },
    Email {
        selector: String,
        #[serde(default)]
        message: Option<String>,
    },
    MinLength {
        selector: String,
        min: usize,
        #[serde(default)]
        message: Option<String>,
    },
    /// Must equal the current value of the field matched by `reference`
    Confirmed {
        selector: String,
        reference: String,
        #[serde(default)]
        message: Option<String>,
    },
}

impl RuleSpec {
    pub fn selector(&self) -> &str {
        match self {
            RuleSpec::Required { selector, .. }
            | RuleSpec::Email { selector, .. }
            | RuleSpec::MinLength { selector, .. }
            | RuleSpec::Confirmed { selector, .. } => selector,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            RuleSpec::Required { message, .. }
            | RuleSpec::Email { message, .. }
            | RuleSpec::MinLength { message, .. }
            | RuleSpec::Confirmed { message, .. } => message.as_deref(),
        }
    }
}

/// One form's options together with its rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(flatten)]
    pub options: FormOptions,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl FormConfig {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        let config = Self::from_value(ConfigLoader::new(format).parse(content)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a file, detecting the format from its extension.
    ///
    /// `FORMWISE_*` variables override the file's options.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        let mut config = Self::from_value(value)?;

        EnvLoader::default().apply_overrides(&mut config.options);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.options.validate()?;

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.selector().trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "rule {} has an empty selector",
                    index
                )));
            }
            if let RuleSpec::Confirmed { reference, .. } = rule {
                if reference.trim().is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "rule {} has an empty reference",
                        index
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Several forms read from one file under `[[forms]]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormsFile {
    #[serde(default)]
    pub forms: Vec<FormConfig>,
}

impl FormsFile {
    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        let file: Self = serde_json::from_value(ConfigLoader::new(format).parse(content)?)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        for form in &file.forms {
            form.validate()?;
        }
        Ok(file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, FileFormat::from_path(path)?)
    }

    /// The form whose `form` selector equals `selector`
    pub fn form(&self, selector: &str) -> Option<&FormConfig> {
        self.forms.iter().find(|f| f.options.form == selector)
    }
}
