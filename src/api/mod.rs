// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire format for the chat-completion API.
//!
//! - `types`: request, stream event and model list schemas
//! - `request`: the pure request builder

mod request;
mod types;

pub use request::*;
pub use types::*;

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
