// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Command implementations for the `notebook-cli` binary.
//!
//! Each runner returns a process exit code.

pub mod config_cmd;
pub mod format;
pub mod generate;
pub mod models_cmd;

pub use generate::run_generate;

use crate::session::GenerationError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_CONNECTION: i32 = 3;

pub fn exit_code_for(error: &GenerationError) -> i32 {
    match error {
        GenerationError::Configuration { .. } => EXIT_CONFIG,
        GenerationError::Network { .. } => EXIT_CONNECTION,
        _ => EXIT_FAILURE,
    }
}
