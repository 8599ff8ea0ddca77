//! Declarative validation for form documents.
//!
//! A [`FormDocument`] holds an element tree. A [`FormController`] is mounted
//! on one form inside it with a [`FormSetup`] and binds every element that a
//! rule selector matches to its group and message slot. Blur and change
//! events validate a field and show or clear its message. Input events
//! clear it. Clicking the submit control validates everything, then hands
//! a [`SubmissionRecord`] to the submit handler or submits natively.
//!
//! # Examples
//!
//! ```
//! use formwise_form::{Element, FormController, FormDocument, FormOptions, FormSetup};
//! use formwise_validation::is_required;
//!
//! let doc = FormDocument::new();
//! let form = doc.append(doc.root(), Element::new("form").id("login")).unwrap();
//! let group = doc.append(form, Element::new("div").class("form-group")).unwrap();
//! let user = doc.append(group, Element::input("text").id("user").name("user")).unwrap();
//! let message = doc.append(group, Element::new("span").class("form-message")).unwrap();
//!
//! let setup = FormSetup::new(
//!     FormOptions::new("#login")
//!         .group_selector(".form-group")
//!         .error_message_selector(".form-message"),
//! )
//! .rule(is_required("#user", None));
//! let controller = FormController::mount(&doc, setup).unwrap();
//!
//! controller.blur(user).unwrap();
//! assert_eq!(doc.text(message).as_deref(), Some("Please fill in this field!"));
//! assert!(doc.has_class(group, "invalid"));
//! ```

mod aggregate;
mod controller;
pub mod document;
mod error;
mod field;
mod selector;
mod setup;

pub use aggregate::{SubmissionRecord, aggregate};
pub use controller::{EventOutcome, FormController, FormEvent, SubmitOutcome};
pub use document::{Element, ElementId, FormDocument};
pub use error::{FormError, Result};
pub use field::{FieldKind, FieldValue, FileHandle};
pub use selector::{Selector, SelectorError};
pub use setup::{FormSetup, SubmitHandler};

pub use formwise_config::{FormOptions, RadioPolicy};
