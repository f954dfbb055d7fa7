// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! `generate` command: stream a continuation to stdout.

use std::sync::Arc;

use tokio::io::AsyncWriteExt;

use super::exit_code_for;
use super::format::format_session_summary;
use crate::context::ClientContext;
use crate::session::{GenerationController, GenerationOutcome, GenerationUpdate};

/// Stream a continuation of `prompt`. Ctrl-C stops the generation and
/// keeps what was already printed.
pub async fn run_generate(context: Arc<ClientContext>, prompt: &str) -> i32 {
    let controller = GenerationController::new(context);
    let mut stream = match controller.start(prompt).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code_for(&e);
        }
    };

    let mut stdout = tokio::io::stdout();
    let outcome = loop {
        let update = tokio::select! {
            update = stream.recv() => update,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nStopping generation...");
                controller.stop().await;
                continue;
            }
        };

        match update {
            Some(GenerationUpdate::Chunk(text)) => {
                let written = async {
                    stdout.write_all(text.as_bytes()).await?;
                    stdout.flush().await
                };
                if let Err(e) = written.await {
                    eprintln!("Error writing output: {}", e);
                    controller.stop().await;
                    return 1;
                }
            }
            Some(GenerationUpdate::Finished(outcome)) => break outcome,
            None => break GenerationOutcome::Stopped,
        }
    };

    let _ = stdout.write_all(b"\n").await;
    let _ = stdout.flush().await;
    eprintln!("{}", format_session_summary(&controller.snapshot()));

    match outcome {
        GenerationOutcome::Completed { finish_reason, .. } => {
            if let Some(reason) = finish_reason {
                tracing::debug!(reason = %reason, "Generation finished");
            }
            0
        }
        GenerationOutcome::Stopped => 0,
        GenerationOutcome::Failed { error } => {
            eprintln!("Error: {}", error);
            exit_code_for(&error)
        }
    }
}
