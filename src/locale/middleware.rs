//! Locale routing middleware and the explicit language switch.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::cookie::{extract_cookie, set_locale_cookie};
use super::resolver::{LocaleResolver, Resolution};
use super::Locale;
use crate::config::LocaleConfig;
use crate::error::ApiError;
use crate::observability::metrics;

/// State shared by the locale middleware and switch handler.
#[derive(Clone)]
pub struct LocaleState {
    pub resolver: Arc<LocaleResolver>,
    pub cookie_name: Arc<str>,
}

impl LocaleState {
    pub fn from_config(config: &LocaleConfig) -> Self {
        Self {
            resolver: Arc::new(LocaleResolver::from_config(config)),
            cookie_name: Arc::from(config.cookie_name.as_str()),
        }
    }
}

fn with_query(location: String, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", location, q),
        _ => location,
    }
}

/// Redirect unlocalized content paths and keep the preference cookie in sync.
pub async fn locale_middleware(
    State(state): State<LocaleState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let resolution = {
        let headers = request.headers();
        let cookie = extract_cookie(headers, &state.cookie_name);
        let accept_language = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        state
            .resolver
            .resolve(request.uri().path(), cookie.as_deref(), accept_language)
    };
    let query = request.uri().query().map(str::to_owned);

    match resolution {
        Resolution::Bypass => next.run(request).await,
        Resolution::Localized(locale) => {
            let mut response = next.run(request).await;
            set_locale_cookie(response.headers_mut(), &state.cookie_name, locale);
            response
        }
        Resolution::Redirect { location, locale } => {
            let location = with_query(location, query.as_deref());
            tracing::debug!(path = %request.uri().path(), location = %location, "Locale redirect");
            metrics::record_locale_redirect("locale");
            let mut response = Redirect::temporary(&location).into_response();
            set_locale_cookie(response.headers_mut(), &state.cookie_name, locale);
            response
        }
        Resolution::Legacy { location } => {
            let location = with_query(location, query.as_deref());
            metrics::record_locale_redirect("legacy");
            Redirect::permanent(&location).into_response()
        }
    }
}

/// `GET /api/locale/{code}`: explicit language switch.
pub async fn switch_locale(
    State(state): State<LocaleState>,
    Path(code): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let locale: Locale = code.parse().map_err(|_| ApiError::NotFound)?;

    tracing::debug!(locale = %locale, "Locale switched");
    let location = with_query(format!("/{}", locale), query.as_deref());
    let mut response = Redirect::to(&location).into_response();
    set_locale_cookie(response.headers_mut(), &state.cookie_name, locale);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderValue, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let state = LocaleState::from_config(&LocaleConfig::default());
        Router::new()
            .route("/api/locale/{code}", get(switch_locale))
            .fallback(|| async { "page" })
            .with_state(state.clone())
            .layer(from_fn_with_state(state, locale_middleware))
    }

    async fn get_path(uri: &str, headers: &[(&'static str, &'static str)]) -> Response {
        let mut builder = Request::builder().uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, HeaderValue::from_static(v));
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    fn set_cookie(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap())
    }

    #[tokio::test]
    async fn test_redirects_with_query_and_cookie() {
        let res = get_path("/pricing?ref=ad", &[("accept-language", "sr-RS,en;q=0.5")]).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&res), "/sr/pricing?ref=ad");
        assert!(set_cookie(&res).unwrap().starts_with("lang=sr;"));
    }

    #[tokio::test]
    async fn test_localized_passes_through_and_persists() {
        let res = get_path("/en/pricing", &[("cookie", "lang=hu")]).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(set_cookie(&res).unwrap().starts_with("lang=en;"));
    }

    #[tokio::test]
    async fn test_legacy_is_permanent() {
        let res = get_path("/rs/about", &[]).await;
        assert_eq!(res.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(location(&res), "/sr/about");
        assert!(set_cookie(&res).is_none());
    }

    #[tokio::test]
    async fn test_favicon_untouched() {
        let res = get_path("/favicon.ico", &[("cookie", "lang=hu"), ("accept-language", "sr")]).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(set_cookie(&res).is_none());
    }

    #[tokio::test]
    async fn test_switch_locale() {
        let res = get_path("/api/locale/hu?tab=faq", &[]).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/hu?tab=faq");
        assert!(set_cookie(&res).unwrap().starts_with("lang=hu;"));

        let res = get_path("/api/locale/rs", &[]).await;
        assert_eq!(location(&res), "/sr");

        let res = get_path("/api/locale/de", &[]).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
