//! Request payloads accepted by the studio routes.

use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

pub mod auth;
pub mod generation;

#[derive(Debug, Error, PartialEq, Eq)]
/// Errors that can occur when processing request data.
pub enum FormError {
    /// Human-readable message shown to the user as is.
    #[error("{0}")]
    Validation(String),
}

impl FormError {
    /// Reports the first failing field, walking `order` first and any other
    /// field by name afterwards.
    pub fn first_of(errors: &ValidationErrors, order: &[&str]) -> Self {
        let fields = errors.field_errors();

        let mut names = fields.keys().map(|name| &**name).collect::<Vec<&str>>();
        names.sort_by_key(|name| {
            let rank = order
                .iter()
                .position(|field| field == name)
                .unwrap_or(order.len());
            (rank, *name)
        });

        let message = names
            .into_iter()
            .find_map(|name| {
                fields
                    .get(name)
                    .and_then(|errors| errors.first())
                    .map(|error| describe(name, error))
            })
            .unwrap_or_else(|| "Invalid request".to_string());

        FormError::Validation(message)
    }
}

/// Uses the attribute message when present, otherwise spells out a length bound.
fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let mut label = field.to_string();
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    if error.code == "length" {
        let param = |key: &str| error.params.get(key).and_then(|value| value.as_u64());
        let len = error
            .params
            .get("value")
            .and_then(|value| value.as_str())
            .map(|value| value.chars().count() as u64);

        match (len, param("min"), param("max")) {
            (Some(len), Some(min), _) if len < min => {
                return format!("{label} must be at least {min} characters");
            }
            (Some(_), _, Some(max)) => return format!("{label} must be at most {max} characters"),
            (None, Some(min), Some(max)) => {
                return format!("{label} must be between {min} and {max} characters");
            }
            _ => {}
        }
    }

    format!("Invalid {field}")
}
