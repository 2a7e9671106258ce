//! Brand handlers.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use super::ListQuery;
use crate::api::extractors::{FormErrors, ValidatedForm};
use crate::api::view::{Flash, FlashRedirect, View};
use crate::api::AppState;
use crate::config::{MAX_NAME_LENGTH, MSG_DUPLICATE_NAME};
use crate::domain::Brand;
use crate::errors::AppResult;

const LIST_PATH: &str = "/brands";

/// Brand form fields
#[derive(Debug, Deserialize, Validate)]
pub struct BrandForm {
    #[validate(length(
        min = 1,
        max = MAX_NAME_LENGTH,
        message = "ブランド名は1文字以上128文字以内で入力してください"
    ))]
    pub name: String,
}

impl BrandForm {
    fn into_brand(self, id: Option<i64>) -> Brand {
        Brand {
            id,
            name: self.name,
        }
    }
}

/// Create brand routes
pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands))
        .route("/new", get(new_brand))
        .route("/save", post(save_brand))
        .route("/detail/:id", get(detail_brand))
        .route("/edit/:id", get(edit_brand_form).post(edit_brand))
        .route("/delete/:id", get(delete_brand))
}

/// Brand list, optionally narrowed by `keyword`
pub async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<View> {
    let brands = state.brand_service.list_all(query.keyword.clone()).await?;

    Ok(View::new("brands/brands")
        .with("listBrands", &brands)
        .with("keyword", &query.keyword))
}

pub async fn new_brand() -> View {
    View::new("brands/brand_form").with("brand", &Brand::default())
}

pub async fn save_brand(
    State(state): State<AppState>,
    ValidatedForm { form, errors }: ValidatedForm<BrandForm>,
) -> AppResult<Response> {
    let brand = form.into_brand(None);
    submit(&state, brand, errors, true, "brands/brand_form", Flash::Created).await
}

pub async fn detail_brand(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<View> {
    let brand = state.brand_service.get(id).await?;
    Ok(View::new("brands/brand_detail").with("brand", &brand))
}

pub async fn edit_brand_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<View> {
    let brand = state.brand_service.get(id).await?;
    Ok(View::new("brands/brand_edit").with("brand", &brand))
}

pub async fn edit_brand(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedForm { form, errors }: ValidatedForm<BrandForm>,
) -> AppResult<Response> {
    let current = state.brand_service.get(id).await?;
    let brand = form.into_brand(Some(id));
    let renamed = current.name != brand.name;

    submit(&state, brand, errors, renamed, "brands/brand_edit", Flash::Updated).await
}

pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<FlashRedirect> {
    state.brand_service.delete(id).await?;
    tracing::info!(brand_id = id, "Brand deleted");

    Ok(FlashRedirect::new(LIST_PATH, Flash::Deleted))
}

/// Validate, check the name is free, save, then redirect to the list.
/// Any rejection shows `form_view` again with the submitted values.
async fn submit(
    state: &AppState,
    brand: Brand,
    errors: FormErrors,
    check_name: bool,
    form_view: &'static str,
    flash: Flash,
) -> AppResult<Response> {
    if !errors.is_empty() {
        tracing::warn!(errors = %errors.summary(), "Brand form rejected");
        return Ok(View::new(form_view)
            .with("brand", &brand)
            .with("errors", &errors)
            .into_response());
    }

    let duplicate = View::new(form_view)
        .with("brand", &brand)
        .with("error_message", MSG_DUPLICATE_NAME);

    if check_name && !state.brand_service.check_unique(&brand).await? {
        tracing::warn!(name = %brand.name, "Brand name already registered");
        return Ok(duplicate.into_response());
    }

    match state.brand_service.save(brand).await {
        Ok(saved) => {
            tracing::info!(brand_id = ?saved.id, "Brand saved");
            Ok(FlashRedirect::new(LIST_PATH, flash).into_response())
        }
        Err(e) if e.is_conflict() => Ok(duplicate.into_response()),
        Err(e) => Err(e),
    }
}
