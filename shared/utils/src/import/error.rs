//! Failure taxonomy for XML order imports.

use orderdesk_models::OrderField;
use thiserror::Error;

/// Why an XML order document could not be turned into a record.
///
/// No variant ever carries a partial record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("the file is not well-formed XML: {message}")]
    MalformedXml { message: String },

    #[error("unexpected root element: expected <{expected}>, found {}", describe_found(.found))]
    UnexpectedRootElement {
        expected: String,
        found: Option<String>,
    },

    #[error("missing required element <{tag}> ({element})")]
    MissingRequiredElement { element: String, tag: String },

    #[error("missing essential order data: {}", join_fields(.missing))]
    IncompleteOrderData { missing: Vec<OrderField> },

    #[error("unexpected error while reading the order: {message}")]
    GenericParseError { message: String },
}

impl ImportError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedXml { .. } => "MALFORMED_XML",
            Self::UnexpectedRootElement { .. } => "UNEXPECTED_ROOT_ELEMENT",
            Self::MissingRequiredElement { .. } => "MISSING_REQUIRED_ELEMENT",
            Self::IncompleteOrderData { .. } => "INCOMPLETE_ORDER_DATA",
            Self::GenericParseError { .. } => "GENERIC_PARSE_ERROR",
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedXml {
            message: message.into(),
        }
    }
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(name) => format!("<{}>", name),
        None => "no root element".to_string(),
    }
}

fn join_fields(fields: &[OrderField]) -> String {
    fields
        .iter()
        .map(OrderField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
