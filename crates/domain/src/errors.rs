use std::{collections::BTreeMap, fmt};

use cqrs_es::AggregateError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Entity not found: {entity}")]
    NotFound { entity: String },

    #[error("Uniqueness conflict: {field}")]
    Uniqueness { field: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation error: {fields}")]
    Validation { fields: FieldErrors },

    #[error("Delivery estimates are still being calculated")]
    EstimatePending,

    #[error("Event store error: {message}")]
    Store { message: String },

    #[error("Estimate calculation failed: {message}")]
    Calculation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl From<AggregateError<Error>> for Error {
    fn from(err: AggregateError<Error>) -> Self {
        match err {
            AggregateError::UserError(err) => err,
            other => Error::Store {
                message: other.to_string(),
            },
        }
    }
}

/// Field-level validation messages keyed by the submitted field name.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error
    /// carrying every recorded field.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { fields: self })
        }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Error {
        let mut fields = Self::new();
        fields.insert(field, message);
        Error::Validation { fields }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "{}", fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_errors_pass() {
        assert_eq!(FieldErrors::new().into_result(), Ok(()));
    }

    #[test]
    fn field_errors_list_fields_in_message() {
        let mut fields = FieldErrors::new();
        fields.insert("street", "Street address is required");
        fields.insert("city", "City is required");

        let err = fields.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: city, street");
    }

    #[test]
    fn user_errors_unwrap_from_aggregate_errors() {
        let err: Error = AggregateError::UserError(Error::EstimatePending).into();
        assert_eq!(err, Error::EstimatePending);
    }
}
