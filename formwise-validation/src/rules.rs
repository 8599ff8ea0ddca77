// Rules and the rule engine

use crate::ValidationError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A rule test: `None` means the value passed, `Some(message)` that it failed.
///
/// The value is `None` when the field resolved to nothing, such as a radio
/// group with no checked option.
pub type RuleTest = Arc<dyn Fn(Option<&str>) -> Option<String> + Send + Sync>;

/// A selector paired with one test
#[derive(Clone)]
pub struct Rule {
    selector: String,
    constraint: String,
    test: RuleTest,
}

impl Rule {
    /// Create a custom rule for `selector`
    pub fn new<F>(selector: impl Into<String>, test: F) -> Self
    where
        F: Fn(Option<&str>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            selector: selector.into(),
            constraint: "custom".to_string(),
            test: Arc::new(test),
        }
    }

    /// Set the constraint name reported in errors
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn constraint(&self) -> &str {
        &self.constraint
    }

    /// Run the test against a value
    pub fn test(&self, value: Option<&str>) -> Option<String> {
        (self.test)(value).filter(|message| !message.is_empty())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("selector", &self.selector)
            .field("constraint", &self.constraint)
            .finish_non_exhaustive()
    }
}

/// Rules grouped by selector.
///
/// Within a selector, rules keep registration order. Selectors themselves
/// iterate in the order they were first registered.
#[derive(Clone, Default)]
pub struct RuleSet {
    order: Vec<String>,
    rules: HashMap<String, Vec<Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, builder style
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, rule: Rule) -> Self {
        self.register(rule);
        self
    }

    /// Append a rule to its selector's list
    pub fn register(&mut self, rule: Rule) {
        match self.rules.get_mut(rule.selector()) {
            Some(list) => list.push(rule),
            None => {
                self.order.push(rule.selector().to_string());
                self.rules.insert(rule.selector().to_string(), vec![rule]);
            }
        }
    }

    /// Selectors in first-registration order
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Rules registered for a selector, empty if unknown
    pub fn rules_for(&self, selector: &str) -> &[Rule] {
        self.rules.get(selector).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.rules.contains_key(selector)
    }

    /// Total number of rules across all selectors
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.register(rule);
        }
        set
    }
}

impl Extend<Rule> for RuleSet {
    fn extend<I: IntoIterator<Item = Rule>>(&mut self, iter: I) {
        for rule in iter {
            self.register(rule);
        }
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for selector in &self.order {
            map.entry(selector, &self.rules_for(selector).len());
        }
        map.finish()
    }
}

/// Read-only evaluator over a frozen [`RuleSet`].
///
/// Cloning shares the underlying rules.
#[derive(Clone, Debug, Default)]
pub struct RuleEngine {
    rules: Arc<RuleSet>,
}

impl RuleEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// First failing message for `selector`, or `None` if every rule passed.
    ///
    /// Unknown selectors have no rules and always pass.
    pub fn evaluate(&self, selector: &str, value: Option<&str>) -> Option<String> {
        self.rules
            .rules_for(selector)
            .iter()
            .find_map(|rule| rule.test(value))
    }

    /// Like [`evaluate`](Self::evaluate) but reports which constraint failed
    pub fn evaluate_detailed(
        &self,
        selector: &str,
        value: Option<&str>,
    ) -> Result<(), ValidationError> {
        for rule in self.rules.rules_for(selector) {
            if let Some(message) = rule.test(value) {
                return Err(ValidationError::new(selector, message)
                    .with_constraint(rule.constraint())
                    .with_value(value));
            }
        }
        Ok(())
    }
}

impl From<RuleSet> for RuleEngine {
    fn from(rules: RuleSet) -> Self {
        Self::new(rules)
    }
}
