//! Workflow step outputs
//!
//! Downstream steps (image retag, floating-tag push, conditional skips)
//! consume the engine's results as Actions step outputs. When
//! `$GITHUB_OUTPUT` is unset (local runs) the key=value lines go to
//! stdout instead.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;

use anyhow::{Context, Result};

/// Accumulated key=value outputs for one run
#[derive(Debug, Default)]
pub struct StepOutputs {
    entries: Vec<(String, String)>,
}

impl StepOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Display) {
        self.entries.push((key.to_string(), value.to_string()));
    }

    /// Comma-joined list value
    pub fn set_list(&mut self, key: &str, values: &[String]) {
        self.entries.push((key.to_string(), values.join(",")));
    }

    /// Append to `$GITHUB_OUTPUT`, or print when running locally
    pub fn write(&self) -> Result<()> {
        match std::env::var("GITHUB_OUTPUT") {
            Ok(path) if !path.is_empty() => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("Failed to open GITHUB_OUTPUT file: {}", path))?;
                for (key, value) in &self.entries {
                    writeln!(file, "{}={}", key, value).context("Failed to write step output")?;
                }
            }
            _ => {
                for (key, value) in &self.entries {
                    println!("{}={}", key, value);
                }
            }
        }
        Ok(())
    }
}
