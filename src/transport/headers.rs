// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Standard request headers.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE,
};

use super::TransportError;
use crate::config::ApiConfig;
use crate::credentials::ApiKey;

pub const HEADER_REFERER: &str = "http-referer";
pub const HEADER_TITLE: &str = "x-title";

/// Attribution sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub referer: String,
    pub title: String,
}

impl ClientIdentity {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self { referer: config.referer.clone(), title: config.title.clone() }
    }
}

/// Merge the standard headers into `caller`.
///
/// A caller-supplied `Authorization` wins over `api_key`. Streaming requests
/// ask for `text/event-stream` and disable caching.
pub fn request_headers(
    identity: &ClientIdentity,
    api_key: Option<&ApiKey>,
    streaming: bool,
    caller: HeaderMap,
) -> Result<HeaderMap, TransportError> {
    let mut headers = caller;

    if !headers.contains_key(AUTHORIZATION) {
        if let Some(key) = api_key {
            headers.insert(AUTHORIZATION, bearer_value(key)?);
        }
    }

    headers.insert(
        HeaderName::from_static(HEADER_REFERER),
        text_value("HTTP-Referer", &identity.referer)?,
    );
    headers.insert(
        HeaderName::from_static(HEADER_TITLE),
        text_value("X-Title", &identity.title)?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if streaming {
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    } else {
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    }

    Ok(headers)
}

/// `Authorization: Bearer <key>`, marked sensitive so it is never logged.
pub(crate) fn bearer_value(key: &ApiKey) -> Result<HeaderValue, TransportError> {
    let mut value = HeaderValue::from_str(&key.bearer())
        .map_err(|_| TransportError::InvalidHeader("Authorization".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

fn text_value(name: &str, value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader(name.into()))
}

#[cfg(test)]
#[path = "headers_tests.rs"]
mod tests;
