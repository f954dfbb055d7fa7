// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Authenticated HTTP access to the completion provider.
//!
//! The [`CompletionTransport`] trait is the seam between the generation
//! pipeline and the network; [`HttpTransport`] is the reqwest-backed
//! implementation.

mod error;
mod headers;
mod http;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::api::{CompletionRequest, ModelDescriptor};
use crate::credentials::ApiKey;

pub use error::TransportError;
pub use headers::{request_headers, ClientIdentity, HEADER_REFERER, HEADER_TITLE};
pub use http::HttpTransport;

/// Raw response body, chunked as it arrives off the wire.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// POST the request and return the body stream once a 2xx status arrives.
    ///
    /// Non-2xx responses resolve to [`TransportError::Http`] carrying the
    /// response body. Dropping the stream closes the connection.
    async fn open_stream(
        &self,
        request: &CompletionRequest,
        api_key: &ApiKey,
    ) -> Result<ByteStream, TransportError>;

    /// True iff the auth endpoint answers 2xx for this key.
    async fn validate_key(&self, candidate: &ApiKey) -> bool;

    /// Fetch the provider's model list.
    async fn list_models(&self, api_key: &ApiKey) -> Result<Vec<ModelDescriptor>, TransportError>;
}
