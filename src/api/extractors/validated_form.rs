//! Validated form extractor - Combines deserialization with validation.
//!
//! Unlike a JSON API, an invalid admin form is not rejected: the
//! handler re-renders it with the submitted values and the messages
//! collected in [`FormErrors`].

use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use axum_extra::extract::{Form, FormRejection};
use serde::{de::DeserializeOwned, Serialize};
use validator::{Validate, ValidationErrors};

use crate::errors::AppError;

/// Field name to messages, as bound to the `errors` view attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut collected = Self::new();
        for (field, errs) in errors.field_errors() {
            for e in errs {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                collected.add(field.to_string(), message);
            }
        }
        collected
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// One line for logs
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" / ")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Urlencoded form plus the result of validating it.
///
/// # Example
///
/// ```rust,ignore
/// async fn save(ValidatedForm { form, errors }: ValidatedForm<BrandForm>) {
///     if !errors.is_empty() {
///         // re-render with errors
///     }
/// }
/// ```
pub struct ValidatedForm<T> {
    pub form: T,
    pub errors: FormErrors,
}

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(form) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.to_string()))?;

        let errors = match form.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from_validation(&e),
        };

        Ok(ValidatedForm { form, errors })
    }
}
