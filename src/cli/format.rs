// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Formatting helpers for human-readable command output.

use crate::api::{ModelDescriptor, Pricing};
use crate::session::SessionSnapshot;

/// Print the model table.
pub fn print_models_human(models: &[ModelDescriptor], selected: Option<&str>) {
    println!("Models ({} available)", models.len());
    println!("    Id                                       | Name                     | Context  | $/M in / out");
    println!("  --------------------------------------------+--------------------------+----------+---------------");
    for model in models {
        println!("{}", format_model_row(model, selected == Some(model.id.as_str())));
    }
}

pub fn format_model_row(model: &ModelDescriptor, selected: bool) -> String {
    format!(
        "  {} {:40} | {:24} | {:>8} | {}",
        if selected { "*" } else { " " },
        truncate(&model.id, 40),
        truncate(model.display_name(), 24),
        model.context_length.map(format_context).unwrap_or_else(|| "-".into()),
        model.pricing.as_ref().map(format_pricing).unwrap_or_else(|| "-".into())
    )
}

/// Context window in tokens, e.g. `4K`, `128K`, `1M`.
pub fn format_context(tokens: u64) -> String {
    const K: u64 = 1024;
    const M: u64 = K * 1024;

    if tokens >= M && tokens % M == 0 {
        format!("{}M", tokens / M)
    } else if tokens >= K && tokens % K == 0 {
        format!("{}K", tokens / K)
    } else if tokens >= 1000 {
        format!("{:.1}K", tokens as f64 / 1000.0)
    } else {
        tokens.to_string()
    }
}

/// Per-token prices shown per million tokens.
pub fn format_pricing(pricing: &Pricing) -> String {
    match (pricing.prompt, pricing.completion) {
        (Some(p), Some(c)) if p == 0.0 && c == 0.0 => "free".into(),
        (p, c) => format!("{} / {}", format_price(p), format_price(c)),
    }
}

fn format_price(per_token: Option<f64>) -> String {
    match per_token {
        Some(price) => format!("{:.2}", price * 1_000_000.0),
        None => "?".into(),
    }
}

/// One-line session summary for stderr.
pub fn format_session_summary(snapshot: &SessionSnapshot) -> String {
    format!(
        "[{}] ~{} tokens, {} chars",
        snapshot.status, snapshot.estimated_tokens, snapshot.output_chars
    )
}

/// Shorten to `max_len` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
