//! Category handlers.

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
use crate::domain::Category;
use crate::errors::AppResult;

const LIST_PATH: &str = "/categories";

/// Category form fields
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(
        min = 1,
        max = MAX_NAME_LENGTH,
        message = "カテゴリー名は1文字以上128文字以内で入力してください"
    ))]
    pub name: String,
}

impl CategoryForm {
    fn into_category(self, id: Option<i64>) -> Category {
        Category {
            id,
            name: self.name,
        }
    }
}

/// Create category routes
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/new", get(new_category))
        .route("/save", post(save_category))
        .route("/detail/:id", get(detail_category))
        .route("/edit/:id", get(edit_category_form).post(edit_category))
        .route("/delete/:id", get(delete_category))
}

/// Category list, optionally narrowed by `keyword`
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<View> {
    let categories = state.category_service.list_all(query.keyword.clone()).await?;

    Ok(View::new("categories/categories")
        .with("listCategories", &categories)
        .with("keyword", &query.keyword))
}

pub async fn new_category() -> View {
    View::new("categories/category_form").with("category", &Category::default())
}

pub async fn save_category(
    State(state): State<AppState>,
    ValidatedForm { form, errors }: ValidatedForm<CategoryForm>,
) -> AppResult<Response> {
    let category = form.into_category(None);
    submit(&state, category, errors, true, "categories/category_form", Flash::Created).await
}

pub async fn detail_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<View> {
    let category = state.category_service.get(id).await?;
    Ok(View::new("categories/category_detail").with("category", &category))
}

pub async fn edit_category_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<View> {
    let category = state.category_service.get(id).await?;
    Ok(View::new("categories/category_edit").with("category", &category))
}

pub async fn edit_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedForm { form, errors }: ValidatedForm<CategoryForm>,
) -> AppResult<Response> {
    let current = state.category_service.get(id).await?;
    let category = form.into_category(Some(id));
    let renamed = current.name != category.name;

    submit(&state, category, errors, renamed, "categories/category_edit", Flash::Updated).await
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<FlashRedirect> {
    state.category_service.delete(id).await?;
    tracing::info!(category_id = id, "Category deleted");

    Ok(FlashRedirect::new(LIST_PATH, Flash::Deleted))
}

/// Validate, check the name is free, save, then redirect to the list.
/// Any rejection shows `form_view` again with the submitted values.
async fn submit(
    state: &AppState,
    category: Category,
    errors: FormErrors,
    check_name: bool,
    form_view: &'static str,
    flash: Flash,
) -> AppResult<Response> {
    if !errors.is_empty() {
        tracing::warn!(errors = %errors.summary(), "Category form rejected");
        return Ok(View::new(form_view)
            .with("category", &category)
            .with("errors", &errors)
            .into_response());
    }

    let duplicate = View::new(form_view)
        .with("category", &category)
        .with("error_message", MSG_DUPLICATE_NAME);

    if check_name && !state.category_service.check_unique(&category).await? {
        tracing::warn!(name = %category.name, "Category name already registered");
        return Ok(duplicate.into_response());
    }

    match state.category_service.save(category).await {
        Ok(saved) => {
            tracing::info!(category_id = ?saved.id, "Category saved");
            Ok(FlashRedirect::new(LIST_PATH, flash).into_response())
        }
        Err(e) if e.is_conflict() => Ok(duplicate.into_response()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::testing::MockServices;
    use crate::errors::AppError;
    use axum::http::{header::LOCATION, StatusCode};
    use mockall::predicate::eq;

    fn valid_form(name: &str) -> ValidatedForm<CategoryForm> {
        ValidatedForm {
            form: CategoryForm {
                name: name.to_string(),
            },
            errors: FormErrors::new(),
        }
    }

    #[tokio::test]
    async fn test_list_categories_with_keyword() {
        let mut services = MockServices::new();
        services
            .categories
            .expect_list_all()
            .withf(|keyword| keyword.as_deref() == Some("food"))
            .returning(|_| Ok(vec![Category::new(3, "food")]));

        let query = ListQuery {
            keyword: Some("food".to_string()),
        };
        let view = list_categories(State(services.into_state()), Query(query))
            .await
            .unwrap();

        assert_eq!(view.name(), "categories/categories");
        assert_eq!(view.get("keyword").unwrap(), "food");
        assert_eq!(view.get("listCategories").unwrap()[0]["name"], "food");
    }

    #[tokio::test]
    async fn test_save_category() {
        let mut services = MockServices::new();
        services
            .categories
            .expect_check_unique()
            .withf(|category| category.name == "categoryA")
            .returning(|_| Ok(true));
        services
            .categories
            .expect_save()
            .times(1)
            .returning(|category| Ok(Category::new(1, category.name)));

        let response = save_category(State(services.into_state()), valid_form("categoryA"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/categories");
    }

    #[tokio::test]
    async fn test_rename_to_taken_name_rerenders_edit_form() {
        let mut services = MockServices::new();
        services
            .categories
            .expect_get()
            .with(eq(1))
            .returning(|id| Ok(Category::new(id, "categoryA")));
        services
            .categories
            .expect_check_unique()
            .times(1)
            .returning(|_| Ok(false));
        services.categories.expect_save().never();

        let response = edit_category(
            State(services.into_state()),
            Path(1),
            valid_form("categoryB"),
        )
        .await
        .unwrap();

        let view = response.extensions().get::<View>().unwrap();
        assert_eq!(view.name(), "categories/category_edit");
        assert_eq!(view.get("category").unwrap()["name"], "categoryB");
        assert_eq!(view.get("error_message").unwrap(), MSG_DUPLICATE_NAME);
    }

    #[tokio::test]
    async fn test_edit_form_for_missing_category() {
        let mut services = MockServices::new();
        services
            .categories
            .expect_get()
            .returning(|_| Err(AppError::not_found("Category 1000 not found")));

        let result = edit_category_form(State(services.into_state()), Path(1000)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_category() {
        let mut services = MockServices::new();
        services
            .categories
            .expect_delete()
            .with(eq(4))
            .returning(|_| Ok(()));

        let redirect = delete_category(State(services.into_state()), Path(4))
            .await
            .unwrap();

        assert_eq!(redirect.location(), "/categories");
        assert_eq!(redirect.flash(), Flash::Deleted);
    }
}
