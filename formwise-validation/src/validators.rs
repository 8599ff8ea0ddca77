// Built-in validators and the rule factories built on them

use crate::Rule;
use once_cell::sync::Lazy;
use regex::Regex;

// `\w` is spelled out so it stays ASCII-only
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$",
    )
    .expect("email pattern compiles")
});

pub const REQUIRED_MESSAGE: &str = "Please fill in this field!";
pub const EMAIL_MESSAGE: &str = "Please enter this field in correct format!";
pub const CONFIRMED_MESSAGE: &str = "This field must be repeated exactly!";

pub fn min_length_message(min: usize) -> String {
    format!("This field must be at least {} characters!", min)
}

fn message_or(message: Option<&str>, default: impl FnOnce() -> String) -> String {
    message.map(str::to_string).unwrap_or_else(default)
}

/// Value is present and non-empty
pub struct Required;

impl Required {
    pub fn check(value: Option<&str>) -> bool {
        value.is_some_and(|v| !v.is_empty())
    }
}

/// Simple `local@domain.tld` shape.
///
/// Word characters with optional `.`/`-` separated segments and a TLD of 2 or
/// 3 characters. Plus-addressing and longer TLDs such as `.info` are rejected.
pub struct Email;

impl Email {
    pub fn check(value: Option<&str>) -> bool {
        value.is_some_and(|v| EMAIL_REGEX.is_match(v))
    }
}

/// At least `n` characters; a missing value has length 0.
///
/// Length is counted in Unicode scalar values, not UTF-16 code units, so
/// `"😀😀"` has length 2.
pub struct MinLength(pub usize);

impl MinLength {
    pub fn check(&self, value: Option<&str>) -> bool {
        value.map_or(0, |v| v.chars().count()) >= self.0
    }
}

/// Equal to whatever the accessor returns at the moment of the check
pub struct Confirmed<F>(pub F);

impl<F> Confirmed<F>
where
    F: Fn() -> Option<String>,
{
    pub fn check(&self, value: Option<&str>) -> bool {
        value == (self.0)().as_deref()
    }
}

/// Fails when the value is missing or empty
pub fn is_required(selector: impl Into<String>, message: Option<&str>) -> Rule {
    let message = message_or(message, || REQUIRED_MESSAGE.to_string());
    Rule::new(selector, move |value| {
        (!Required::check(value)).then(|| message.clone())
    })
    .with_constraint("isRequired")
}

/// Fails when the value is not a simple email address
pub fn is_email(selector: impl Into<String>, message: Option<&str>) -> Rule {
    let message = message_or(message, || EMAIL_MESSAGE.to_string());
    Rule::new(selector, move |value| {
        (!Email::check(value)).then(|| message.clone())
    })
    .with_constraint("isEmail")
}

/// Fails when the value has fewer than `min` characters
pub fn min_length(selector: impl Into<String>, min: usize, message: Option<&str>) -> Rule {
    let message = message_or(message, || min_length_message(min));
    let validator = MinLength(min);
    Rule::new(selector, move |value| {
        (!validator.check(value)).then(|| message.clone())
    })
    .with_constraint("minLength")
}

/// Fails when the value differs from `reference()`.
///
/// The accessor runs on every test so it sees the current reference value.
pub fn is_confirmed<F>(selector: impl Into<String>, reference: F, message: Option<&str>) -> Rule
where
    F: Fn() -> Option<String> + Send + Sync + 'static,
{
    let message = message_or(message, || CONFIRMED_MESSAGE.to_string());
    let validator = Confirmed(reference);
    Rule::new(selector, move |value| {
        (!validator.check(value)).then(|| message.clone())
    })
    .with_constraint("isConfirmed")
}
