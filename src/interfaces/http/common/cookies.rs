//! `token` cookie issue, clear and lookup

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, Duration, Utc};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub expire_days: i64,
    pub secure: bool,
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn build(value: &str, expires: DateTime<Utc>, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Expires={}",
        TOKEN_COOKIE,
        value,
        http_date(expires)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

impl CookieSettings {
    pub fn token_cookie(&self, token: &str, now: DateTime<Utc>) -> String {
        build(token, now + Duration::days(self.expire_days), self.secure)
    }

    /// Overwrites the token with `none`, expiring in ten seconds.
    pub fn cleared_cookie(&self, now: DateTime<Utc>) -> String {
        build("none", now + Duration::seconds(10), self.secure)
    }
}

pub fn set_cookie_header(cookie: &str) -> Option<(header::HeaderName, HeaderValue)> {
    HeaderValue::from_str(cookie)
        .ok()
        .map(|value| (header::SET_COOKIE, value))
}

/// Value of the `token` cookie, if present.
pub fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty() && value != "none")
}
