/// Action definitions loaded from `config.json`
///
/// The file is read once at startup, placeholders are expanded against the
/// environment, and the result is held read-only for the process lifetime.

use crate::config::env_subst;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{collections::HashMap, path::Path};

/// Processed configuration file
#[derive(Debug, Clone)]
pub struct ActionsConfig {
    /// Full tree after placeholder substitution
    pub tree: Value,
    /// Typed action entries keyed by action name
    pub actions: HashMap<String, ActionEntry>,
}

/// A single outbound call definition
///
/// Only `url` and `method` are needed to dispatch; both are optional here so
/// that incomplete entries are skipped at dispatch time instead of failing startup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionEntry {
    /// Target URL
    #[serde(default)]
    pub url: Option<String>,
    /// HTTP method, matched case-insensitively
    #[serde(default)]
    pub method: Option<String>,
    /// Extra request headers
    #[serde(default)]
    pub headers: Map<String, Value>,
    /// Body template, sent only for POST
    #[serde(default)]
    pub body: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFile {
    #[serde(default)]
    actions: HashMap<String, ActionEntry>,
}

impl ActionsConfig {
    /// Load and process the file using the process environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &env_subst::process_env)
    }

    /// Load and process the file with a custom variable lookup
    pub fn load_with<F>(path: impl AsRef<Path>, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read action config {}", path.display()))?;
        Self::from_str_with(&text, lookup)
            .with_context(|| format!("Invalid action config {}", path.display()))
    }

    /// Parse and process configuration text
    pub fn from_str_with<F>(text: &str, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed: Value = serde_json::from_str(text).context("Config is not valid JSON")?;
        let tree = env_subst::substitute(&parsed, lookup);

        let raw: RawFile = if tree.is_null() {
            RawFile::default()
        } else {
            serde_json::from_value(tree.clone()).context("Config does not match the actions schema")?
        };

        tracing::debug!("📋 Parsed {} action entries", raw.actions.len());

        Ok(Self {
            tree,
            actions: raw.actions,
        })
    }

    /// Look up an action entry by name
    pub fn action(&self, name: &str) -> Option<&ActionEntry> {
        self.actions.get(name)
    }
}
