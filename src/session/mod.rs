// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Generation sessions: lifecycle control, delivery and observable state.

mod controller;
mod handle;
mod pipeline;
mod state;
mod types;

pub use controller::GenerationController;
pub use handle::GenerationStream;
pub use types::{
    GenerationError, GenerationOutcome, GenerationUpdate, SessionSnapshot, SessionStatus,
};
