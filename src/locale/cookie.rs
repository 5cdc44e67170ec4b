//! Locale preference cookie.

use axum::http::{header, HeaderMap, HeaderValue};

use super::Locale;

/// One year.
pub const MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

/// Build the `Set-Cookie` value persisting `locale`.
pub fn build_locale_cookie(name: &str, locale: Locale) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        name, locale, MAX_AGE_SECS
    )
}

/// Append a `Set-Cookie` header persisting `locale`.
pub fn set_locale_cookie(headers: &mut HeaderMap, name: &str, locale: Locale) {
    match HeaderValue::from_str(&build_locale_cookie(name, locale)) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(cookie = %name, error = %e, "Invalid locale cookie"),
    }
}

/// Extract a cookie value from request headers.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cookie() {
        assert_eq!(
            build_locale_cookie("lang", Locale::Hu),
            "lang=hu; Path=/; Max-Age=31536000; SameSite=Lax"
        );
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; lang=sr; other=1"),
        );
        assert_eq!(extract_cookie(&headers, "lang").as_deref(), Some("sr"));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_set_cookie_appends() {
        let mut headers = HeaderMap::new();
        headers.insert(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        set_locale_cookie(&mut headers, "lang", Locale::En);
        assert_eq!(headers.get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
