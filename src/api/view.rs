//! Server-rendered views and flash messages.
//!
//! Handlers return a [`View`] (template name plus model). The
//! [`render_views`] middleware turns it into HTML with the shared
//! `Tera` instance, so handlers stay testable without templates.
//!
//! A [`FlashRedirect`] answers a successful write with `302 Found` and
//! a `flash` cookie; the next rendered page shows the message as
//! `success_message` and clears the cookie.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header::{CONTENT_TYPE, LOCATION},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use tera::{Context, Tera};

use super::AppState;
use crate::config::{FLASH_COOKIE, MSG_CREATED, MSG_DELETED, MSG_UPDATED};
use crate::errors::AppResult;

/// A template to render and the model bound to it.
#[derive(Debug, Clone)]
pub struct View {
    name: &'static str,
    context: Context,
}

impl View {
    /// `name` is the template path without the `.html` suffix, e.g. `brands/brands`
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            context: Context::new(),
        }
    }

    /// Bind a model attribute
    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bound model attribute, as the template will see it
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.context.contains_key(key)
    }

    /// Render to HTML, exposing `flash` as `success_message`.
    pub fn render(&self, templates: &Tera, flash: Option<Flash>) -> AppResult<String> {
        let mut context = self.context.clone();
        if let Some(flash) = flash {
            context.insert("success_message", flash.message());
        }

        Ok(templates.render(&format!("{}.html", self.name), &context)?)
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        let mut response = StatusCode::OK.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// One-shot success message carried across a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Created,
    Updated,
    Deleted,
}

impl Flash {
    /// Cookie value
    pub fn code(&self) -> &'static str {
        match self {
            Flash::Created => "created",
            Flash::Updated => "updated",
            Flash::Deleted => "deleted",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::Created => MSG_CREATED,
            Flash::Updated => MSG_UPDATED,
            Flash::Deleted => MSG_DELETED,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "created" => Some(Flash::Created),
            "updated" => Some(Flash::Updated),
            "deleted" => Some(Flash::Deleted),
            _ => None,
        }
    }
}

/// `302 Found` to `to`, leaving `flash` for the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashRedirect {
    to: &'static str,
    flash: Flash,
}

impl FlashRedirect {
    pub fn new(to: &'static str, flash: Flash) -> Self {
        Self { to, flash }
    }

    pub fn location(&self) -> &'static str {
        self.to
    }

    pub fn flash(&self) -> Flash {
        self.flash
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let cookie = Cookie::build((FLASH_COOKIE, self.flash.code()))
            .path("/")
            .http_only(true);

        (
            StatusCode::FOUND,
            [(LOCATION, self.to)],
            CookieJar::new().add(cookie),
        )
            .into_response()
    }
}

/// Render any [`View`] left in the response by a handler.
pub async fn render_views(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(view) = response.extensions_mut().remove::<View>() else {
        return response;
    };

    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| Flash::from_code(cookie.value()));

    let html = match view.render(&state.templates, flash) {
        Ok(html) => html,
        Err(e) => return e.into_response(),
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    let response = Response::from_parts(parts, Body::from(html));

    if jar.get(FLASH_COOKIE).is_some() {
        let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
        return (jar, response).into_response();
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;

    #[test]
    fn test_flash_codes_round_trip() {
        for flash in [Flash::Created, Flash::Updated, Flash::Deleted] {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("bogus"), None);
        assert_eq!(Flash::Deleted.message(), "削除に成功しました");
    }

    #[test]
    fn test_flash_redirect_is_302_with_cookie() {
        let response = FlashRedirect::new("/brands", Flash::Created).into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/brands");
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash=created"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn test_view_into_response_keeps_view() {
        let response = View::new("brands/brands")
            .with("keyword", &"abc")
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let view = response.extensions().get::<View>().unwrap();
        assert_eq!(view.name(), "brands/brands");
        assert_eq!(view.get("keyword").unwrap(), "abc");
    }

    #[test]
    fn test_render_adds_success_message() {
        let mut tera = Tera::default();
        tera.add_raw_template(
            "brands/brands.html",
            "{% if success_message %}{{ success_message }}|{% endif %}{{ keyword }}",
        )
        .unwrap();
        let view = View::new("brands/brands").with("keyword", "abc");

        assert_eq!(view.render(&tera, None).unwrap(), "abc");
        assert_eq!(
            view.render(&tera, Some(Flash::Updated)).unwrap(),
            "更新に成功しました|abc"
        );
    }

    #[test]
    fn test_render_missing_template_is_error() {
        let view = View::new("nowhere/none");
        assert!(view.render(&Tera::default(), None).is_err());
    }
}
