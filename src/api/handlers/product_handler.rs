//! Product handlers.
//!
//! The product form is the only multipart form; it also needs the brand
//! and category lists for its selects and hands uploaded images to the
//! image service.

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use super::ListQuery;
use crate::api::extractors::{FormErrors, ProductSubmission};
use crate::api::view::{Flash, FlashRedirect, View};
use crate::api::AppState;
use crate::config::{MAX_MULTIPART_BYTES, MSG_DUPLICATE_NAME, MSG_INVALID_IMAGE};
use crate::domain::Product;
use crate::errors::AppResult;

const LIST_PATH: &str = "/products";

/// Create product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/new", get(new_product))
        .route("/save", post(save_product))
        .route("/detail/:id", get(detail_product))
        .route("/edit/:id", get(edit_product_form).post(edit_product))
        .route("/delete/:id", get(delete_product))
        .layer(DefaultBodyLimit::max(MAX_MULTIPART_BYTES))
}

/// Product list, optionally narrowed by `keyword`
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<View> {
    let products = state.product_service.list_all(query.keyword.clone()).await?;

    Ok(View::new("products/products")
        .with("listProducts", &products)
        .with("keyword", &query.keyword))
}

pub async fn new_product(State(state): State<AppState>) -> AppResult<View> {
    form_view(&state, "products/product_form", &Product::default()).await
}

pub async fn save_product(
    State(state): State<AppState>,
    submission: ProductSubmission,
) -> AppResult<Response> {
    submit(
        &state,
        submission,
        None,
        "products/product_form",
        Flash::Created,
    )
    .await
}

pub async fn detail_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<View> {
    let product = state.product_service.get(id).await?;
    Ok(View::new("products/product_detail").with("product", &product))
}

pub async fn edit_product_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<View> {
    let product = state.product_service.get(id).await?;
    form_view(&state, "products/product_edit", &product).await
}

pub async fn edit_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    submission: ProductSubmission,
) -> AppResult<Response> {
    let current = state.product_service.get(id).await?;
    submit(
        &state,
        submission,
        Some(current),
        "products/product_edit",
        Flash::Updated,
    )
    .await
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<FlashRedirect> {
    state.product_service.delete(id).await?;
    tracing::info!(product_id = id, "Product deleted");

    Ok(FlashRedirect::new(LIST_PATH, Flash::Deleted))
}

/// Product form with the brand and category options bound.
async fn form_view(state: &AppState, name: &'static str, product: &Product) -> AppResult<View> {
    let (brands, categories) = tokio::try_join!(
        state.brand_service.list_all(None),
        state.category_service.list_all(None)
    )?;

    Ok(View::new(name)
        .with("product", product)
        .with("listBrands", &brands)
        .with("listCategories", &categories))
}

/// Validate fields and image, check the name is free, store the image,
/// save, then redirect to the list. `current` is the stored row on edit.
async fn submit(
    state: &AppState,
    submission: ProductSubmission,
    current: Option<Product>,
    view: &'static str,
    flash: Flash,
) -> AppResult<Response> {
    let ProductSubmission {
        form,
        image,
        errors,
    } = submission;

    let previous_image = current.as_ref().and_then(|c| c.image.clone());
    let mut product = form.into_product(current.as_ref().and_then(|c| c.id));
    product.image = previous_image.clone();

    if !errors.is_empty() {
        tracing::warn!(errors = %errors.summary(), "Product form rejected");
        return rejected(state, view, &product, Some(&errors), None).await;
    }

    if let Some(image) = &image {
        if !state.image_service.is_valid(image) {
            tracing::warn!(content_type = %image.content_type, "Product image rejected");
            return rejected(state, view, &product, None, Some(MSG_INVALID_IMAGE)).await;
        }
    }

    let check_name = current.map_or(true, |c| c.name != product.name);
    if check_name && !state.product_service.check_unique(&product).await? {
        tracing::warn!(name = %product.name, "Product name already registered");
        return rejected(state, view, &product, None, Some(MSG_DUPLICATE_NAME)).await;
    }

    let uploaded = match &image {
        Some(image) => Some(state.image_service.store(image).await?),
        None => None,
    };
    if uploaded.is_some() {
        product.image = uploaded.clone();
    }

    match state.product_service.save(product.clone()).await {
        Ok(saved) => {
            if let (Some(_), Some(previous)) = (&uploaded, &previous_image) {
                discard_image(state, previous).await;
            }
            tracing::info!(product_id = ?saved.id, "Product saved");
            Ok(FlashRedirect::new(LIST_PATH, flash).into_response())
        }
        Err(e) => {
            if let Some(stored) = &uploaded {
                discard_image(state, stored).await;
            }
            if !e.is_conflict() {
                return Err(e);
            }
            product.image = previous_image;
            rejected(state, view, &product, None, Some(MSG_DUPLICATE_NAME)).await
        }
    }
}

/// Remove an image no row refers to. Failures are only logged.
async fn discard_image(state: &AppState, file_name: &str) {
    if let Err(e) = state.image_service.remove(file_name).await {
        tracing::warn!(file = %file_name, error = %e, "Product image left behind");
    }
}

async fn rejected(
    state: &AppState,
    view: &'static str,
    product: &Product,
    errors: Option<&FormErrors>,
    message: Option<&str>,
) -> AppResult<Response> {
    let mut view = form_view(state, view, product).await?;
    if let Some(errors) = errors {
        view = view.with("errors", errors);
    }
    if let Some(message) = message {
        view = view.with("error_message", message);
    }
    Ok(view.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::extractors::product_form::tests::{multipart_request, valid_fields};
    use crate::api::state::testing::MockServices;
    use crate::domain::{Brand, Category};
    use crate::errors::AppError;
    use crate::services::{ImageStore, MockProductImageService};
    use axum::extract::FromRequest;
    use axum::http::{
        header::{LOCATION, SET_COOKIE},
        StatusCode,
    };
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn stored_product(id: i64) -> Product {
        Product {
            id: Some(id),
            name: "productA".to_string(),
            description: "description".to_string(),
            stock: 1,
            image: Some("image.png".to_string()),
            price: 1.0,
            purchase_price: 1.0,
            shipping_cost: 1.0,
            tax_rate: 1.0,
            category: Some(Category::new(1, "categoryA")),
            brand: Some(Brand::new(1, "brandA")),
        }
    }

    fn with_options(services: &mut MockServices) {
        services
            .brands
            .expect_list_all()
            .returning(|_| Ok(vec![Brand::new(1, "brandA")]));
        services
            .categories
            .expect_list_all()
            .returning(|_| Ok(vec![Category::new(1, "categoryA")]));
    }

    async fn submission(
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> ProductSubmission {
        ProductSubmission::from_request(multipart_request(fields, file), &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_products() {
        let mut services = MockServices::new();
        services
            .products
            .expect_list_all()
            .returning(|_| Ok(vec![]));

        let view = list_products(State(services.into_state()), Query(ListQuery::default()))
            .await
            .unwrap();

        assert_eq!(view.name(), "products/products");
        assert_eq!(view.get("listProducts").unwrap().as_array().unwrap().len(), 0);
        assert!(view.get("keyword").unwrap().is_null());
    }

    #[tokio::test]
    async fn test_new_product_form_has_options() {
        let mut services = MockServices::new();
        with_options(&mut services);

        let view = new_product(State(services.into_state())).await.unwrap();

        assert_eq!(view.name(), "products/product_form");
        assert!(view.get("product").unwrap().is_object());
        assert_eq!(view.get("listBrands").unwrap()[0]["name"], "brandA");
        assert_eq!(view.get("listCategories").unwrap()[0]["name"], "categoryA");
    }

    #[tokio::test]
    async fn test_save_product_with_valid_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = MockServices::new();
        services.images = Arc::new(ImageStore::new(dir.path(), 1024));
        services
            .products
            .expect_check_unique()
            .withf(|product| product.name == "productA")
            .returning(|_| Ok(true));
        services
            .products
            .expect_save()
            .withf(|product| {
                product.id.is_none()
                    && product.brand_id() == Some(1)
                    && product.image.as_deref().map_or(false, |i| i.ends_with(".png"))
            })
            .times(1)
            .returning(|mut product| {
                product.id = Some(1);
                Ok(product)
            });

        let submission = submission(
            &valid_fields(),
            Some(("photo.png", "image/png", &b"\x89PNG"[..])),
        )
        .await;
        let response = save_product(State(services.into_state()), submission)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/products");
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("flash=created"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_save_product_with_invalid_image_rerenders() {
        let mut services = MockServices::new();
        with_options(&mut services);
        services.products.expect_check_unique().never();
        services.products.expect_save().never();

        let submission = submission(
            &valid_fields(),
            Some(("notes.txt", "text/plain", &b"hello"[..])),
        )
        .await;
        let response = save_product(State(services.into_state()), submission)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let view = response.extensions().get::<View>().unwrap();
        assert_eq!(view.name(), "products/product_form");
        assert_eq!(view.get("error_message").unwrap(), MSG_INVALID_IMAGE);
    }

    #[tokio::test]
    async fn test_save_product_non_numeric_price_rerenders() {
        let mut services = MockServices::new();
        with_options(&mut services);
        services.products.expect_save().never();

        let mut fields = valid_fields();
        fields.retain(|(name, _)| *name != "price");
        fields.push(("price", "abc"));
        let response = save_product(State(services.into_state()), submission(&fields, None).await)
            .await
            .unwrap();

        let view = response.extensions().get::<View>().unwrap();
        assert!(view.get("errors").unwrap()["price"].is_array());
        assert_eq!(view.get("product").unwrap()["name"], "productA");
    }

    #[tokio::test]
    async fn test_detail_product() {
        let mut services = MockServices::new();
        services
            .products
            .expect_get()
            .with(eq(1))
            .returning(|id| Ok(stored_product(id)));

        let view = detail_product(State(services.into_state()), Path(1))
            .await
            .unwrap();

        assert_eq!(view.name(), "products/product_detail");
        assert_eq!(view.get("product").unwrap()["id"], 1);
    }

    #[tokio::test]
    async fn test_edit_product_keeps_stored_image() {
        let mut services = MockServices::new();
        services
            .products
            .expect_get()
            .with(eq(1))
            .returning(|id| Ok(stored_product(id)));
        services.products.expect_check_unique().never();
        services
            .products
            .expect_save()
            .withf(|product| {
                product.id == Some(1) && product.image.as_deref() == Some("image.png")
            })
            .times(1)
            .returning(Ok);

        let submission = submission(&valid_fields(), None).await;
        let response = edit_product(State(services.into_state()), Path(1), submission)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("flash=updated"));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let mut services = MockServices::new();
        services
            .products
            .expect_delete()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));

        let response = delete_product(State(services.into_state()), Path(1))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/products");
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("flash=deleted"));
    }

    fn files_in(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_store_conflict_removes_uploaded_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = MockServices::new();
        services.images = Arc::new(ImageStore::new(dir.path(), 1024));
        with_options(&mut services);
        services.products.expect_check_unique().returning(|_| Ok(true));
        services
            .products
            .expect_save()
            .returning(|_| Err(AppError::conflict("Product")));

        let submission = submission(
            &valid_fields(),
            Some(("photo.png", "image/png", &b"\x89PNG"[..])),
        )
        .await;
        let response = save_product(State(services.into_state()), submission)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let view = response.extensions().get::<View>().unwrap();
        assert_eq!(view.get("error_message").unwrap(), MSG_DUPLICATE_NAME);
        assert!(view.get("product").unwrap()["image"].is_null());
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_database_error_removes_uploaded_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut services = MockServices::new();
        services.images = Arc::new(ImageStore::new(dir.path(), 1024));
        services.products.expect_check_unique().returning(|_| Ok(true));
        services
            .products
            .expect_save()
            .returning(|_| Err(AppError::internal("connection reset")));

        let submission = submission(
            &valid_fields(),
            Some(("photo.png", "image/png", &b"\x89PNG"[..])),
        )
        .await;
        let result = save_product(State(services.into_state()), submission).await;

        assert!(result.is_err());
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_edit_with_new_image_removes_previous_file() {
        let mut images = MockProductImageService::new();
        images.expect_is_valid().returning(|_| true);
        images
            .expect_store()
            .times(1)
            .returning(|_| Ok("new.png".to_string()));
        images
            .expect_remove()
            .withf(|name| name == "image.png")
            .times(1)
            .returning(|_| Ok(()));

        let mut services = MockServices::new();
        services.images = Arc::new(images);
        services
            .products
            .expect_get()
            .returning(|id| Ok(stored_product(id)));
        services
            .products
            .expect_save()
            .withf(|product| product.image.as_deref() == Some("new.png"))
            .times(1)
            .returning(Ok);

        let submission = submission(
            &valid_fields(),
            Some(("photo.png", "image/png", &b"\x89PNG"[..])),
        )
        .await;
        let response = edit_product(State(services.into_state()), Path(1), submission)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_image_rejected_by_image_service_is_not_stored() {
        let mut images = MockProductImageService::new();
        images.expect_is_valid().times(1).returning(|_| false);
        images.expect_store().never();

        let mut services = MockServices::new();
        services.images = Arc::new(images);
        with_options(&mut services);
        services.products.expect_save().never();

        let submission = submission(
            &valid_fields(),
            Some(("photo.png", "image/png", &b"\x89PNG"[..])),
        )
        .await;
        let response = save_product(State(services.into_state()), submission)
            .await
            .unwrap();

        let view = response.extensions().get::<View>().unwrap();
        assert_eq!(view.get("error_message").unwrap(), MSG_INVALID_IMAGE);
    }

    #[tokio::test]
    async fn test_posted_image_name_is_not_saved() {
        let mut images = MockProductImageService::new();
        images.expect_store().never();

        let mut services = MockServices::new();
        services.images = Arc::new(images);
        services.products.expect_check_unique().returning(|_| Ok(true));
        services
            .products
            .expect_save()
            .withf(|product| product.image.is_none())
            .times(1)
            .returning(Ok);

        let mut fields = valid_fields();
        fields.push(("image", "not-an-uploaded-file.exe"));
        let response = save_product(State(services.into_state()), submission(&fields, None).await)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
    }
}
