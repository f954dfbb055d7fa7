// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration, logging and context setup for CLI commands.

use std::sync::Arc;

use notebook_core::cli::{models_cmd, run_generate, EXIT_CONFIG, EXIT_FAILURE};
use notebook_core::config::{self as nb_config, ClientConfig};
use notebook_core::{logging, ClientContext};

/// Load configuration and install logging. Prints the error on failure.
fn prepare_config() -> Result<ClientConfig, i32> {
    let config = nb_config::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        EXIT_CONFIG
    })?;
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Logging disabled: {}", e);
    }
    Ok(config)
}

fn build_context(config: ClientConfig) -> Result<Arc<ClientContext>, i32> {
    ClientContext::from_config(config).map(Arc::new).map_err(|e| {
        eprintln!("Failed to initialize HTTP client: {}", e);
        EXIT_FAILURE
    })
}

/// Run the generate CLI command.
pub async fn run_generate_cmd(args: &[String]) -> i32 {
    let mut config = match prepare_config() {
        Ok(config) => config,
        Err(code) => return code,
    };

    let mut prompt: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--prompt" => {
                if i + 1 < args.len() {
                    prompt = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Missing value for --prompt");
                    return EXIT_CONFIG;
                }
            }
            "--prompt-file" => {
                if i + 1 < args.len() {
                    match std::fs::read_to_string(&args[i + 1]) {
                        Ok(text) => prompt = Some(text),
                        Err(e) => {
                            eprintln!("Cannot read {}: {}", args[i + 1], e);
                            return EXIT_CONFIG;
                        }
                    }
                    i += 2;
                } else {
                    eprintln!("Missing value for --prompt-file");
                    return EXIT_CONFIG;
                }
            }
            "--model" => {
                if i + 1 < args.len() {
                    config.sampling.model_id = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Missing value for --model");
                    return EXIT_CONFIG;
                }
            }
            "--max-tokens" => {
                match args.get(i + 1).and_then(|v| v.parse().ok()) {
                    Some(n) => config.sampling.max_tokens = n,
                    None => {
                        eprintln!("--max-tokens needs a positive integer");
                        return EXIT_CONFIG;
                    }
                }
                i += 2;
            }
            "--temperature" => {
                match args.get(i + 1).and_then(|v| v.parse().ok()) {
                    Some(t) => config.sampling.temperature = t,
                    None => {
                        eprintln!("--temperature needs a number");
                        return EXIT_CONFIG;
                    }
                }
                i += 2;
            }
            "--echo-suppression" => {
                config.generation.echo_suppression = true;
                i += 1;
            }
            "--system-preamble" => {
                config.generation.include_system_preamble = true;
                i += 1;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                return EXIT_CONFIG;
            }
        }
    }

    let Some(prompt) = prompt else {
        eprintln!(
            "Usage: notebook-cli generate (--prompt <TEXT> | --prompt-file <FILE>) [--model MODEL] \
             [--max-tokens N] [--temperature T] [--echo-suppression] [--system-preamble]"
        );
        return EXIT_CONFIG;
    };
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        return EXIT_CONFIG;
    }

    match build_context(config) {
        Ok(context) => run_generate(context, &prompt).await,
        Err(code) => code,
    }
}

/// Run the models CLI command.
pub async fn run_models_cmd(args: &[String]) -> i32 {
    let json = args.iter().skip(2).any(|a| a == "--json");
    let config = match prepare_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    match build_context(config) {
        Ok(context) => models_cmd::run_list(context, json).await,
        Err(code) => code,
    }
}

/// Parse `validate` options; returns the candidate key, if one was given.
fn parse_validate_args(args: &[String]) -> Result<Option<String>, String> {
    let mut candidate = None;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--key" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("Missing value for --key".to_string());
                };
                candidate = Some(value.clone());
                i += 2;
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(candidate)
}

/// Run the validate CLI command.
pub async fn run_validate_cmd(args: &[String]) -> i32 {
    let candidate = match parse_validate_args(args) {
        Ok(candidate) => candidate,
        Err(message) => {
            eprintln!("{}", message);
            return EXIT_CONFIG;
        }
    };

    let config = match prepare_config() {
        Ok(config) => config,
        Err(code) => return code,
    };
    match build_context(config) {
        Ok(context) => models_cmd::run_validate(context, candidate).await,
        Err(code) => code,
    }
}
