// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! `models` and `validate` commands.

use std::sync::Arc;

use super::format::print_models_human;
use super::{EXIT_CONFIG, EXIT_FAILURE, EXIT_SUCCESS};
use crate::context::ClientContext;
use crate::credentials::{validate_and_store, ApiKey};
use crate::models::ModelDirectory;

/// List available models, ranked. Falls back to built-in lists on failure.
pub async fn run_list(context: Arc<ClientContext>, json: bool) -> i32 {
    let directory = ModelDirectory::new(Arc::clone(&context.transport));
    let api_key = context.credentials.get();
    let models = directory.fetch(api_key.as_ref()).await;

    if json {
        match serde_json::to_string_pretty(&models) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Failed to render model list: {}", e);
                return EXIT_FAILURE;
            }
        }
    } else {
        let selected = context.settings.snapshot().model_id;
        print_models_human(&models, selected.as_deref());
    }
    EXIT_SUCCESS
}

/// Check an API key against the provider. `candidate` overrides the stored key.
pub async fn run_validate(context: Arc<ClientContext>, candidate: Option<String>) -> i32 {
    let key = match candidate {
        Some(raw) => ApiKey::new(raw),
        None => context.credentials.get(),
    };
    let Some(key) = key else {
        eprintln!("No API key given. Pass --key or set NOTEBOOK_API_KEY.");
        return EXIT_CONFIG;
    };

    let fingerprint = key.fingerprint();
    if validate_and_store(context.transport.as_ref(), context.credentials.as_ref(), key).await {
        println!("API key {} is valid", fingerprint);
        EXIT_SUCCESS
    } else {
        println!("API key {} was rejected", fingerprint);
        EXIT_FAILURE
    }
}
