//! Database configuration via `chronicle.toml`
//!
//! On first open, a default `chronicle.toml` is written into the data
//! directory. To change settings, edit the file and reopen the database.

use crate::resolver::{TieBreak, TieBreakOrder};
use crate::taxonomy::ContradictionPolicy;
use chronicle_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the database data directory.
pub const CONFIG_FILE_NAME: &str = "chronicle.toml";

/// Taxonomy settings, persisted under the `[taxonomy]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxonomyConfig {
    /// Zero-based field index holding the child NID (default: 0)
    #[serde(default)]
    pub child_field: usize,
    /// Treatment of contradicted edges: `"include"` or `"exclude"`
    #[serde(default = "default_contradictions")]
    pub contradictions: String,
}

fn default_contradictions() -> String {
    ContradictionPolicy::default().as_str().to_string()
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            child_field: 0,
            contradictions: default_contradictions(),
        }
    }
}

/// Database configuration loaded from `chronicle.toml`.
///
/// # Example
///
/// ```toml
/// initial_capacity = 1024
/// tie_break = ["path_specificity", "module_priority"]
///
/// [taxonomy]
/// child_field = 0
/// contradictions = "include"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChronicleConfig {
    /// Expected number of components, used to pre-size the shard maps.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
    /// Tie-break rules applied across paths, in order.
    #[serde(default = "default_tie_break")]
    pub tie_break: Vec<String>,
    /// Taxonomy snapshot settings.
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
}

fn default_initial_capacity() -> usize {
    1024
}

fn default_tie_break() -> Vec<String> {
    TieBreakOrder::default()
        .rules()
        .iter()
        .map(|rule| rule.as_str().to_string())
        .collect()
}

impl Default for ChronicleConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            tie_break: default_tie_break(),
            taxonomy: TaxonomyConfig::default(),
        }
    }
}

impl ChronicleConfig {
    /// Parse the tie-break list.
    ///
    /// # Errors
    ///
    /// `Config` on an unknown rule name or a rule listed twice.
    pub fn tie_break_order(&self) -> Result<TieBreakOrder> {
        let mut rules = Vec::with_capacity(self.tie_break.len());
        for name in &self.tie_break {
            let rule = TieBreak::parse(name).ok_or_else(|| {
                Error::Config(format!(
                    "Invalid tie-break '{}' in {}. Expected \"path_specificity\" or \"module_priority\".",
                    name, CONFIG_FILE_NAME
                ))
            })?;
            rules.push(rule);
        }
        TieBreakOrder::new(rules)
    }

    /// Parse the taxonomy contradiction policy.
    pub fn contradiction_policy(&self) -> Result<ContradictionPolicy> {
        ContradictionPolicy::parse(&self.taxonomy.contradictions).ok_or_else(|| {
            Error::Config(format!(
                "Invalid contradiction policy '{}' in {}. Expected \"include\" or \"exclude\".",
                self.taxonomy.contradictions, CONFIG_FILE_NAME
            ))
        })
    }

    /// Check every setting eagerly.
    pub fn validate(&self) -> Result<()> {
        self.tie_break_order()?;
        self.contradiction_policy()?;
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Chronicle database configuration
#
# Expected number of components, used to pre-size shard maps.
initial_capacity = 1024

# Tie-break order applied when several paths contribute a candidate.
# Any permutation of "path_specificity" and "module_priority".
tie_break = ["path_specificity", "module_priority"]

[taxonomy]
# Zero-based field index holding the child NID in the taxonomy assemblage.
child_field = 0
# How the taxonomy engine treats a contradicted edge: "include" or "exclude".
contradictions = "include"
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ChronicleConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: ChronicleConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
