use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
};
use tracing::debug;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::errors::ErrorModel;

/// Key used for errors that concern the request body as a whole.
pub const BODY_KEY: &str = "$";

/// Ordered collection of field-level validation messages.
///
/// Entries keep insertion order and each entry keeps its messages in the
/// order they were added, so flattening is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelState {
    entries: Vec<(String, Vec<String>)>,
}

impl ModelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_model_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        let key = key.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((key, vec![message])),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Every message across all entries, entry order first, then per-entry order.
    pub fn error_messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(_, messages)| messages.iter().cloned())
            .collect()
    }

    pub fn into_error_model(self) -> ErrorModel {
        ErrorModel::bad_request(self.error_messages())
    }

    /// Build from validator output.
    ///
    /// Fields are enumerated in sorted key order; nested structs become
    /// `parent.child` and list items `parent[i].child`.
    pub fn from_validation_errors(errors: &ValidationErrors) -> Self {
        let mut state = Self::new();
        collect(&mut state, "", errors);
        state
    }
}

fn collect(state: &mut ModelState, prefix: &str, errors: &ValidationErrors) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let key = join_key(prefix, field);
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    state.add_model_error(key.clone(), message_for(&key, error));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(state, &key, nested),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(state, &format!("{}[{}]", key, index), nested);
                }
            }
        }
    }
}

fn join_key(prefix: &str, field: &str) -> String {
    // struct-level errors are reported under "__all__"
    if field == "__all__" {
        prefix.to_string()
    } else if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn message_for(key: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let field = if key.is_empty() { "request" } else { key };
    match error.code.as_ref() {
        "required" => format!("The {} field is required.", field),
        "email" => format!("The {} field is not a valid e-mail address.", field),
        "url" => format!(
            "The {} field is not a valid fully-qualified http, https, or ftp URL.",
            field
        ),
        "length" => format!("The field {} has an invalid length.", field),
        "range" => format!("The field {} is out of range.", field),
        _ => format!("The field {} is invalid.", field),
    }
}

impl From<&ValidationErrors> for ModelState {
    fn from(errors: &ValidationErrors) -> Self {
        Self::from_validation_errors(errors)
    }
}

impl From<JsonRejection> for ModelState {
    fn from(rejection: JsonRejection) -> Self {
        let mut state = Self::new();
        state.add_model_error(BODY_KEY, rejection.body_text());
        state
    }
}

impl From<QueryRejection> for ModelState {
    fn from(rejection: QueryRejection) -> Self {
        let mut state = Self::new();
        state.add_model_error("", rejection.body_text());
        state
    }
}

impl From<PathRejection> for ModelState {
    fn from(rejection: PathRejection) -> Self {
        let mut state = Self::new();
        state.add_model_error("", rejection.body_text());
        state
    }
}

impl IntoResponse for ModelState {
    fn into_response(self) -> Response {
        debug!(
            errors = self.error_count(),
            fields = ?self.keys().collect::<Vec<_>>(),
            "Invalid model state"
        );
        self.into_error_model().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::borrow::Cow;

    fn error(code: &'static str, message: Option<&'static str>) -> ValidationError {
        let mut error = ValidationError::new(code);
        error.message = message.map(Cow::Borrowed);
        error
    }

    #[test]
    fn test_add_model_error_groups_by_key() {
        let mut state = ModelState::new();
        state.add_model_error("name", "first");
        state.add_model_error("address", "second");
        state.add_model_error("name", "third");

        assert_eq!(state.error_count(), 3);
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["name", "address"]);
        assert_eq!(state.error_messages(), vec!["first", "third", "second"]);
    }

    #[test]
    fn test_from_validation_errors_sorts_fields_and_keeps_per_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add("zeta", error("length", Some("zeta too long")));
        errors.add("alpha", error("required", Some("alpha required")));
        errors.add("alpha", error("length", Some("alpha too long")));

        let state = ModelState::from(&errors);
        assert_eq!(
            state.error_messages(),
            vec!["alpha required", "alpha too long", "zeta too long"]
        );
    }

    #[test]
    fn test_default_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("email", error("email", None));
        errors.add("code", error("custom_rule", None));

        let state = ModelState::from(&errors);
        assert_eq!(
            state.error_messages(),
            vec![
                "The field code is invalid.",
                "The email field is not a valid e-mail address.",
            ]
        );
    }

    #[test]
    fn test_into_response_is_bad_request() {
        let mut state = ModelState::new();
        state.add_model_error("name", "The Name field is required.");
        let response = state.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_empty_state_is_valid() {
        let state = ModelState::new();
        assert!(state.is_valid());
        assert_eq!(state.into_error_model().data, Some(vec![]));
    }
}
