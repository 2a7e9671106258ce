//! User handlers.

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
use crate::config::{MAX_DISPLAY_NAME_LENGTH, MIN_PASSWORD_LENGTH, MSG_DUPLICATE_EMAIL};
use crate::domain::{Password, User};
use crate::errors::AppResult;

const LIST_PATH: &str = "/users";

/// User form fields. `roles` repeats once per checked role.
#[derive(Debug, Deserialize, Validate)]
pub struct UserForm {
    #[validate(email(message = "メールアドレスの形式が正しくありません"))]
    pub email: String,
    /// Plain text; empty on edit keeps the stored password
    #[serde(default)]
    pub password: String,
    #[validate(length(
        min = 1,
        max = MAX_DISPLAY_NAME_LENGTH,
        message = "氏名は1文字以上64文字以内で入力してください"
    ))]
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub roles: Vec<i64>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/new", get(new_user))
        .route("/save", post(save_user))
        .route("/detail/:id", get(detail_user))
        .route("/edit/:id", get(edit_user_form).post(edit_user))
        .route("/delete/:id", get(delete_user))
}

/// User list, optionally narrowed by `keyword` (email or name)
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<View> {
    let users = state.user_service.list_all(query.keyword.clone()).await?;

    Ok(View::new("users/users")
        .with("listUsers", &users)
        .with("keyword", &query.keyword))
}

pub async fn new_user(State(state): State<AppState>) -> AppResult<View> {
    form_view(&state, "users/user_form", &User::default()).await
}

pub async fn save_user(
    State(state): State<AppState>,
    ValidatedForm { form, errors }: ValidatedForm<UserForm>,
) -> AppResult<Response> {
    submit(&state, form, errors, None, "users/user_form", Flash::Created).await
}

pub async fn detail_user(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<View> {
    let user = state.user_service.get(id).await?;
    Ok(View::new("users/user_detail").with("user", &user))
}

pub async fn edit_user_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<View> {
    let user = state.user_service.get(id).await?;
    form_view(&state, "users/user_edit", &user).await
}

pub async fn edit_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedForm { form, errors }: ValidatedForm<UserForm>,
) -> AppResult<Response> {
    let current = state.user_service.get(id).await?;
    submit(&state, form, errors, Some(current), "users/user_edit", Flash::Updated).await
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<FlashRedirect> {
    state.user_service.delete(id).await?;
    tracing::info!(user_id = id, "User deleted");

    Ok(FlashRedirect::new(LIST_PATH, Flash::Deleted))
}

/// User form with every role offered as a checkbox.
async fn form_view(state: &AppState, name: &'static str, user: &User) -> AppResult<View> {
    let roles = state.user_service.list_roles().await?;

    Ok(View::new(name)
        .with("user", user)
        .with("listRoles", &roles)
        .with("selectedRoleIds", &user.role_ids()))
}

async fn submit(
    state: &AppState,
    form: UserForm,
    mut errors: FormErrors,
    current: Option<User>,
    view: &'static str,
    flash: Flash,
) -> AppResult<Response> {
    let roles = state.user_service.roles_by_ids(form.roles).await?;
    let stored_hash = current.as_ref().map(|c| c.password.clone());

    let mut user = User {
        id: current.as_ref().and_then(|c| c.id),
        email: form.email,
        password: String::new(),
        name: form.name,
        disabled: form.disabled,
        roles: Vec::new(),
    };
    user.set_roles(roles);

    let plain = form.password;
    if plain.is_empty() {
        if stored_hash.is_none() {
            errors.add("password", "パスワードを入力してください");
        }
    } else if (plain.chars().count() as u64) < MIN_PASSWORD_LENGTH {
        let message = format!(
            "パスワードは{}文字以上で入力してください",
            MIN_PASSWORD_LENGTH
        );
        errors.add("password", message);
    }

    if !errors.is_empty() {
        tracing::warn!(errors = %errors.summary(), "User form rejected");
        let view = form_view(state, view, &user).await?.with("errors", &errors);
        return Ok(view.into_response());
    }

    let check_email = current.map_or(true, |c| c.email != user.email);
    if check_email && !state.user_service.check_unique(&user).await? {
        tracing::warn!(email = %user.email, "Email already registered");
        return duplicate(state, view, &user).await;
    }

    user.password = match stored_hash {
        Some(hash) if plain.is_empty() => hash,
        _ => Password::new(&plain)?.into_string(),
    };

    let shown = user.clone();
    match state.user_service.save(user).await {
        Ok(saved) => {
            tracing::info!(user_id = ?saved.id, "User saved");
            Ok(FlashRedirect::new(LIST_PATH, flash).into_response())
        }
        Err(e) if e.is_conflict() => duplicate(state, view, &shown).await,
        Err(e) => Err(e),
    }
}

async fn duplicate(state: &AppState, view: &'static str, user: &User) -> AppResult<Response> {
    let view = form_view(state, view, user)
        .await?
        .with("error_message", MSG_DUPLICATE_EMAIL);
    Ok(view.into_response())
}
