// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! notebook-cli entry point.
//!
//! Loads configuration, installs logging, and dispatches to the command
//! runners in `notebook_core::cli`.

mod cli_parser;
mod runtime_init;

use std::process::ExitCode;

use notebook_core::cli::{config_cmd, EXIT_FAILURE};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "generate" | "gen" => exit(runtime_init::run_generate_cmd(&args).await),
        "models" => exit(runtime_init::run_models_cmd(&args).await),
        "validate" => exit(runtime_init::run_validate_cmd(&args).await),
        "config" => run_config_cmd(&args),
        "help" | "--help" | "-h" => {
            if let Some(sub) = args.get(2) {
                cli_parser::print_command_help(sub);
            } else {
                cli_parser::print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("notebook-cli {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            cli_parser::print_usage();
            exit(EXIT_FAILURE)
        }
    }
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn run_config_cmd(args: &[String]) -> ExitCode {
    let sub = args.get(2).map(|s| s.as_str()).unwrap_or("show");
    match sub {
        "show" => exit(config_cmd::run_show()),
        "defaults" => exit(config_cmd::run_defaults()),
        "validate" => exit(config_cmd::run_validate()),
        _ => {
            eprintln!("Unknown config subcommand: {}", sub);
            cli_parser::print_command_help("config");
            exit(EXIT_FAILURE)
        }
    }
}
