//! Request extractors for the admin forms.

pub(crate) mod product_form;
mod validated_form;

pub use product_form::{ProductForm, ProductSubmission};
pub use validated_form::{FormErrors, ValidatedForm};
