//! Browser-profile request headers for the search API.
//!
//! The public endpoint only answers requests that look like they come from
//! its own web front end, so every request carries the same origin/referer
//! pair and a desktop browser User-Agent.

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER,
    USER_AGENT,
};

/// Desktop browser User-Agent sent with every request.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";

const FRONTEND_ORIGIN: &str = "https://www.interpol.int";
const FRONTEND_REFERER: &str = "https://www.interpol.int/";

/// Builds the default header set, optionally with a raw `Cookie` header.
///
/// A cookie value that is not a valid header value is dropped.
pub(crate) fn default_headers(cookie: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static(FRONTEND_ORIGIN));
    headers.insert(REFERER, HeaderValue::from_static(FRONTEND_REFERER));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    for (name, value) in [
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-site"),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    if let Some(cookie) = cookie.map(str::trim).filter(|c| !c.is_empty())
        && let Ok(value) = HeaderValue::from_str(cookie)
    {
        headers.insert(COOKIE, value);
    }
    headers
}
