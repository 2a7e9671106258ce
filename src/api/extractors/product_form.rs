//! Multipart product form extractor.
//!
//! The product form posts its fields and an optional image file as
//! `multipart/form-data`. Numeric fields that do not parse are
//! reported as form errors rather than rejecting the request, so the
//! form can be shown again with the submitted values.

use std::str::FromStr;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
};
use serde::Serialize;
use validator::Validate;

use super::FormErrors;
use crate::config::MAX_PRODUCT_NAME_LENGTH;
use crate::domain::{Brand, Category, Product};
use crate::errors::AppError;
use crate::services::UploadedImage;

/// Name of the file input
pub const IMAGE_FIELD: &str = "image_file";

const MSG_NOT_A_NUMBER: &str = "数値を入力してください";
const MSG_BAD_REFERENCE: &str = "選択肢が不正です";

/// Product form fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
pub struct ProductForm {
    #[validate(length(
        min = 1,
        max = MAX_PRODUCT_NAME_LENGTH,
        message = "商品名は1文字以上256文字以内で入力してください"
    ))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0, message = "在庫数は0以上で入力してください"))]
    pub stock: i32,
    #[validate(range(min = 0.0, message = "価格は0以上で入力してください"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "仕入価格は0以上で入力してください"))]
    pub purchase_price: f64,
    #[validate(range(min = 0.0, message = "送料は0以上で入力してください"))]
    pub shipping_cost: f64,
    #[validate(range(min = 0.0, message = "税率は0以上で入力してください"))]
    pub tax_rate: f64,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
}

impl ProductForm {
    /// Build the product to save. Brand and category carry only their ids;
    /// the image is left for the handler to fill from storage.
    pub fn into_product(self, id: Option<i64>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            stock: self.stock,
            image: None,
            price: self.price,
            purchase_price: self.purchase_price,
            shipping_cost: self.shipping_cost,
            tax_rate: self.tax_rate,
            category: self.category_id.map(|id| Category {
                id: Some(id),
                ..Default::default()
            }),
            brand: self.brand_id.map(|id| Brand {
                id: Some(id),
                ..Default::default()
            }),
        }
    }
}

/// Everything posted by the product form.
#[derive(Debug)]
pub struct ProductSubmission {
    pub form: ProductForm,
    /// `None` when no file was chosen
    pub image: Option<UploadedImage>,
    pub errors: FormErrors,
}

#[async_trait]
impl<S> FromRequest<S> for ProductSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let mut form = ProductForm::default();
        let mut image = None;
        let mut errors = FormErrors::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(e.body_text()))?;

                // browsers send an empty part when no file is chosen
                if !(file_name.is_empty() && bytes.is_empty()) {
                    image = Some(UploadedImage::new(file_name, content_type, bytes));
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;

            match name.as_str() {
                "name" => form.name = value,
                "description" => form.description = value,
                "stock" => form.stock = parse_number(&name, &value, &mut errors),
                "price" => form.price = parse_amount(&name, &value, &mut errors),
                "purchase_price" => {
                    form.purchase_price = parse_amount(&name, &value, &mut errors)
                }
                "shipping_cost" => form.shipping_cost = parse_amount(&name, &value, &mut errors),
                "tax_rate" => form.tax_rate = parse_amount(&name, &value, &mut errors),
                "category_id" => {
                    form.category_id = parse_reference(&name, &value, &mut errors)
                }
                "brand_id" => form.brand_id = parse_reference(&name, &value, &mut errors),
                _ => tracing::debug!(field = %name, "Ignoring unknown product form field"),
            }
        }

        if let Err(e) = form.validate() {
            errors.merge(FormErrors::from_validation(&e));
        }

        Ok(ProductSubmission {
            form,
            image,
            errors,
        })
    }
}

fn parse_number<T: FromStr + Default>(field: &str, raw: &str, errors: &mut FormErrors) -> T {
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            errors.add(field, MSG_NOT_A_NUMBER);
            T::default()
        }
    }
}

/// `NaN` and infinities parse as `f64` but are not amounts
fn parse_amount(field: &str, raw: &str, errors: &mut FormErrors) -> f64 {
    let value: f64 = parse_number(field, raw, errors);
    if value.is_finite() {
        value
    } else {
        errors.add(field, MSG_NOT_A_NUMBER);
        0.0
    }
}

/// Empty selection means no reference
fn parse_reference(field: &str, raw: &str, errors: &mut FormErrors) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, MSG_BAD_REFERENCE);
            None
        }
    }
}
