// Formwise - declarative form validation
//
// Rules are bound to fields by CSS selector, failures are shown inline in the
// field's group, and a valid submission is aggregated into a record for the
// submit handler.

// Re-export the form layer
pub use formwise_form::*;

// Re-export component crates
pub use formwise_log;
pub use formwise_validation;

#[cfg(feature = "config")]
pub use formwise_config;

pub use formwise_validation::{
    Rule, RuleEngine, RuleSet, RuleTest, ValidationError, ValidationErrors, is_confirmed,
    is_email, is_required, min_length,
};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Element, ElementId, EventOutcome, FieldKind, FieldValue, FileHandle, FormController,
        FormDocument, FormError, FormEvent, FormOptions, FormSetup, RadioPolicy, Rule,
        SubmissionRecord, SubmitOutcome, ValidationErrors, is_confirmed, is_email, is_required,
        min_length,
    };

    #[cfg(feature = "config")]
    pub use formwise_config::{FileFormat, FormConfig, FormsFile, RuleSpec};
}
