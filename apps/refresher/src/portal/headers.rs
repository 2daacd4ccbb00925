//! Browser-mimicking header sets. The portal rejects requests that do not
//! look like they came from its own web client.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CACHE_CONTROL,
    CONTENT_TYPE, COOKIE, ORIGIN, REFERER, USER_AGENT,
};

use crate::portal::TransportError;
use crate::refresh::SessionState;

const PORTAL_ORIGIN: &str = "https://www.naukri.com";
const PORTAL_REFERER: &str = "https://www.naukri.com/";
const PROFILE_REFERER: &str = "https://www.naukri.com/mnjuser/profile";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";
const SEC_CH_UA: &str =
    "\"Google Chrome\";v=\"143\", \"Chromium\";v=\"143\", \"Not A(Brand\";v=\"24\"";

fn browser_headers(fetch_site: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ORIGIN, HeaderValue::from_static(PORTAL_ORIGIN));
    headers.insert(REFERER, HeaderValue::from_static(PORTAL_REFERER));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    set(&mut headers, "sec-ch-ua", SEC_CH_UA);
    set(&mut headers, "sec-ch-ua-mobile", "?0");
    set(&mut headers, "sec-ch-ua-platform", "\"Windows\"");
    set(&mut headers, "sec-fetch-dest", "empty");
    set(&mut headers, "sec-fetch-mode", "cors");
    set(&mut headers, "sec-fetch-site", fetch_site);
    headers
}

fn set(headers: &mut HeaderMap, name: &'static str, value: &'static str) {
    headers.insert(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    );
}

pub fn login_headers() -> HeaderMap {
    let mut headers = browser_headers("same-origin");
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    set(&mut headers, "appid", "103");
    set(&mut headers, "clientid", "d3skt0p");
    set(&mut headers, "systemid", "jobseeker");
    headers
}

/// Content type is left to the multipart encoder, which adds the boundary.
pub fn upload_headers() -> HeaderMap {
    let mut headers = browser_headers("same-site");
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    set(&mut headers, "access-control-allow-origin", "*");
    set(&mut headers, "appid", "105");
    set(&mut headers, "systemid", "fileupload");
    headers
}

/// Authenticated headers for the profile update, sent as POST with a PUT override.
pub fn profile_headers(session: &SessionState) -> Result<HeaderMap, TransportError> {
    let mut headers = browser_headers("same-origin");
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(REFERER, HeaderValue::from_static(PROFILE_REFERER));
    set(&mut headers, "appid", "105");
    set(&mut headers, "systemid", "105");
    set(&mut headers, "x-http-method-override", "PUT");
    set(&mut headers, "x-requested-with", "XMLHttpRequest");

    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", session.auth_token()))
        .map_err(|_| TransportError::InvalidRequest("auth token is not a valid header value".into()))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    if !session.cookie_header().is_empty() {
        let mut cookie = HeaderValue::from_str(session.cookie_header()).map_err(|_| {
            TransportError::InvalidRequest("session cookies are not a valid header value".into())
        })?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);
    }

    Ok(headers)
}
