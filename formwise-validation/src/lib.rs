//! Validation rules for formwise.
//!
//! A [`Rule`] pairs a field selector with a test that returns an error
//! message on failure. Rules are grouped by selector in a [`RuleSet`] and
//! evaluated by a [`RuleEngine`], which stops at the first failing rule.
//!
//! # Examples
//!
//! ```
//! use formwise_validation::{is_required, min_length, RuleEngine, RuleSet};
//!
//! let engine = RuleEngine::new(
//!     RuleSet::new()
//!         .add(is_required("#sign-in-pass", Some("Please fill in your password!")))
//!         .add(min_length("#sign-in-pass", 6, None)),
//! );
//!
//! assert_eq!(
//!     engine.evaluate("#sign-in-pass", Some("")).as_deref(),
//!     Some("Please fill in your password!")
//! );
//! assert_eq!(
//!     engine.evaluate("#sign-in-pass", Some("abc")).as_deref(),
//!     Some("This field must be at least 6 characters!")
//! );
//! assert_eq!(engine.evaluate("#sign-in-pass", Some("hunter22")), None);
//! ```
//!
//! ## Confirmation fields
//!
//! ```
//! use formwise_validation::is_confirmed;
//! use std::sync::{Arc, Mutex};
//!
//! let password = Arc::new(Mutex::new(Some("s3cret".to_string())));
//! let live = password.clone();
//! let rule = is_confirmed("#pass-confirmation", move || live.lock().unwrap().clone(), None);
//!
//! assert!(rule.test(Some("s3cret")).is_none());
//! *password.lock().unwrap() = Some("other".to_string());
//! assert!(rule.test(Some("s3cret")).is_some());
//! ```

mod errors;
mod rules;
mod validators;

pub use errors::*;
pub use rules::*;
pub use validators::*;
