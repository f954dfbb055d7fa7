// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Help text for notebook-cli.

/// Print general usage information.
pub fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "notebook-cli - streaming text continuation v{}

USAGE:
    notebook-cli [COMMAND] [OPTIONS]

COMMANDS:
    generate     Stream a continuation of a prompt to stdout
    models       List available models
    validate     Check an API key against the provider
    config       Show or validate configuration
    version      Show version information
    help         Show this help message

EXAMPLES:
    notebook-cli generate --prompt \"Once upon a time\"
    notebook-cli generate --prompt-file draft.txt --echo-suppression
    notebook-cli models --json
    notebook-cli validate --key sk-or-...
    notebook-cli config show

ENVIRONMENT:
    NOTEBOOK_CONFIG      Path to a TOML configuration file
    NOTEBOOK_API_KEY     API key for the provider
    NOTEBOOK_BASE_URL    Provider base URL (default https://openrouter.ai/api/v1)
    NOTEBOOK_MODEL       Model id to use
    NOTEBOOK_LOG         Log filter (overridden by RUST_LOG)
    NOTEBOOK_LOG_FORMAT  pretty or json

EXIT CODES:
    0  Success
    1  Failure
    2  Configuration error
    3  Connection error
",
        version
    );
}

/// Print detailed help for a specific command.
pub fn print_command_help(command: &str) {
    match command {
        "generate" | "gen" => print_generate_help(),
        "models" => print_models_help(),
        "validate" => print_validate_help(),
        "config" => print_config_help(),
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'notebook-cli help' for general usage.",
                command
            );
        }
    }
}

fn print_generate_help() {
    eprintln!(
        "notebook-cli generate - Stream a continuation

USAGE:
    notebook-cli generate (--prompt <TEXT> | --prompt-file <FILE>) [OPTIONS]

OPTIONS:
    --prompt <TEXT>        Text to continue
    --prompt-file <FILE>   Read the text to continue from a file
    --model <MODEL>        Model id (overrides config and NOTEBOOK_MODEL)
    --max-tokens <N>       Maximum tokens to generate (default: 500)
    --temperature <T>      Sampling temperature, 0 to 2 (default: 0.7)
    --echo-suppression     Drop a leading restatement of the prompt
    --system-preamble      Send the writing-assistant system message

DESCRIPTION:
    Output is written to stdout as it arrives. Ctrl-C stops the generation
    and keeps what was already printed.

EXIT CODES:
    0  Completed or stopped
    1  Provider returned an error
    2  Configuration error (no key, no model, bad option)
    3  Connection error
"
    );
}

fn print_models_help() {
    eprintln!(
        "notebook-cli models - List available models

USAGE:
    notebook-cli models [--json]

DESCRIPTION:
    Claude 3, Claude, GPT-4 and Mistral models are listed first. Without
    an API key only the free default model is shown. If the provider
    cannot be reached a built-in list is shown.
"
    );
}

fn print_validate_help() {
    eprintln!(
        "notebook-cli validate - Check an API key

USAGE:
    notebook-cli validate [--key <KEY>]

OPTIONS:
    --key <KEY>  Key to check (default: NOTEBOOK_API_KEY)

EXIT CODES:
    0  Key accepted
    1  Key rejected
    2  No key given
"
    );
}

fn print_config_help() {
    eprintln!(
        "notebook-cli config - Manage configuration

USAGE:
    notebook-cli config <SUBCOMMAND>

SUBCOMMANDS:
    show           Show effective configuration (API key omitted)
    validate       Validate configuration file and environment
    defaults       Show default configuration
"
    );
}
