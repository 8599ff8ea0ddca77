// Error types for form setup and document access

use crate::{ElementId, SelectorError};
use formwise_config::ConfigError;
use thiserror::Error;

/// Structural problems with a form. Failed field rules are not errors; they
/// are reported as messages.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("No element matches form selector {0}")]
    FormNotFound(String),

    #[error("Field {element} matched by {selector} has no ancestor matching {group_selector}")]
    MissingGroup {
        selector: String,
        element: ElementId,
        group_selector: String,
    },

    #[error("Group {group} of field {element} has no element matching {message_selector}")]
    MissingMessageSlot {
        element: ElementId,
        group: ElementId,
        message_selector: String,
    },

    #[error("Invalid selector {selector:?}: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("Element {0} does not exist in this document")]
    UnknownElement(ElementId),

    #[error("Element {0} is not bound to any rule")]
    NotBound(ElementId),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, FormError>;
