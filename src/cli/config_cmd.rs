// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! `config` command.

use super::{EXIT_CONFIG, EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::{self, ClientConfig, ConfigError};

/// Print the effective configuration (file plus environment) as TOML.
pub fn run_show() -> i32 {
    match config::load() {
        Ok(config) => print_toml(&config),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            EXIT_CONFIG
        }
    }
}

pub fn run_defaults() -> i32 {
    print_toml(&ClientConfig::default())
}

pub fn run_validate() -> i32 {
    report_validation(config::load())
}

fn report_validation(result: Result<ClientConfig, ConfigError>) -> i32 {
    match result {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  base_url:  {}", config.api.base_url);
            println!("  model:     {}", config.sampling.model().unwrap_or("(none)"));
            println!("  api key:   {}", if config.api.api_key.is_some() { "set" } else { "not set" });
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Configuration is invalid: {}", e);
            EXIT_CONFIG
        }
    }
}

fn print_toml(config: &ClientConfig) -> i32 {
    match config.to_toml_string() {
        Ok(rendered) => {
            print!("{}", rendered);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to render configuration: {}", e);
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_validation_exit_codes() {
        assert_eq!(report_validation(Ok(ClientConfig::default())), EXIT_SUCCESS);
        assert_eq!(
            report_validation(Err(ConfigError::Invalid("bad".into()))),
            EXIT_CONFIG
        );
    }

    #[test]
    fn test_defaults_render() {
        assert_eq!(run_defaults(), EXIT_SUCCESS);
    }
}
