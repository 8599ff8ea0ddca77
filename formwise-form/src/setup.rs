// Form setup: options, rules and the submit handler

use crate::document::parse_selector;
use crate::{FormDocument, FormError, Result, SubmissionRecord};
use formwise_config::{FormConfig, FormOptions, RuleSpec};
use formwise_validation::{Rule, is_confirmed, is_email, is_required, min_length};
use std::fmt;

/// Callback receiving the aggregated record of a valid submission
pub type SubmitHandler = Box<dyn FnMut(&SubmissionRecord)>;

/// Everything needed to mount a [`FormController`](crate::FormController)
pub struct FormSetup {
    pub options: FormOptions,
    pub rules: Vec<Rule>,
    on_submit: Option<SubmitHandler>,
}

impl FormSetup {
    pub fn new(options: FormOptions) -> Self {
        Self {
            options,
            rules: Vec::new(),
            on_submit: None,
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Without a handler, a valid submission falls back to the native one
    pub fn on_submit<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&SubmissionRecord) + 'static,
    {
        self.on_submit = Some(Box::new(handler));
        self
    }

    pub fn has_submit_handler(&self) -> bool {
        self.on_submit.is_some()
    }

    /// Build rules from a declarative config.
    ///
    /// `confirmed` references are looked up inside the configured form each
    /// time the rule runs.
    pub fn from_config(document: &FormDocument, config: &FormConfig) -> Result<Self> {
        config.validate()?;

        let form_selector = parse_selector(&config.options.form)?;
        let form = document
            .select(document.root(), &form_selector)
            .ok_or_else(|| FormError::FormNotFound(config.options.form.clone()))?;

        let rules = config
            .rules
            .iter()
            .map(|spec| match spec {
                RuleSpec::Required { selector, message } => {
                    Ok(is_required(selector.as_str(), message.as_deref()))
                }
                RuleSpec::Email { selector, message } => {
                    Ok(is_email(selector.as_str(), message.as_deref()))
                }
                RuleSpec::MinLength {
                    selector,
                    min,
                    message,
                } => Ok(min_length(selector.as_str(), *min, message.as_deref())),
                RuleSpec::Confirmed {
                    selector,
                    reference,
                    message,
                } => {
                    let accessor = document.value_accessor(form, reference)?;
                    Ok(is_confirmed(selector.as_str(), accessor, message.as_deref()))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(config.options.clone()).rules(rules))
    }

    pub(crate) fn into_parts(self) -> (FormOptions, Vec<Rule>, Option<SubmitHandler>) {
        (self.options, self.rules, self.on_submit)
    }
}

impl fmt::Debug for FormSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSetup")
            .field("options", &self.options)
            .field("rules", &self.rules)
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Element;
    use formwise_config::FileFormat;

    const CONFIG: &str = r##"
        form = ".sign-up-htm"
        group_selector = ".group"
        error_message_selector = ".message"

        [[rules]]
        kind = "required"
        selector = "#sign-up-pass"

        [[rules]]
        kind = "confirmed"
        selector = "#pass-confirmation"
        reference = "#sign-up-pass"
        message = "Password must be repeated exactly!"
    "##;

    #[test]
    fn test_from_config_builds_rules_in_order() {
        let doc = FormDocument::new();
        let form = doc
            .append(doc.root(), Element::new("form").class("sign-up-htm"))
            .unwrap();
        let pass = doc.append(form, Element::input("password").id("sign-up-pass")).unwrap();

        let config = FormConfig::parse(CONFIG, FileFormat::Toml).unwrap();
        let setup = FormSetup::from_config(&doc, &config).unwrap();

        assert_eq!(setup.rules.len(), 2);
        assert_eq!(setup.rules[0].constraint(), "isRequired");
        assert_eq!(setup.rules[1].constraint(), "isConfirmed");
        assert!(!setup.has_submit_handler());

        let confirm = &setup.rules[1];
        doc.set_value(pass, "hunter22").unwrap();
        assert_eq!(confirm.test(Some("hunter22")), None);
        assert_eq!(
            confirm.test(Some("hunter2")).as_deref(),
            Some("Password must be repeated exactly!")
        );
    }

    #[test]
    fn test_from_config_requires_form() {
        let doc = FormDocument::new();
        let config = FormConfig::parse(CONFIG, FileFormat::Toml).unwrap();
        assert!(matches!(
            FormSetup::from_config(&doc, &config),
            Err(FormError::FormNotFound(_))
        ));
    }
}
