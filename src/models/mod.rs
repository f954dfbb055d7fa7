// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model discovery and selection.

mod directory;

pub use directory::{
    default_model, ensure_default_model, fallback_models, rank_models, ModelDirectory,
    DEFAULT_MODEL_ID, FALLBACK_MODEL_IDS, PREFERRED_FAMILIES,
};
