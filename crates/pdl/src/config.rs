//! Configuration types for PDL code generation.
//!
//! All types implement [`serde::Deserialize`] so that they can be loaded
//! from a TOML file by the command-line tool.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`EmitConfig`] - Controls the shape of the generated Rust source.
//!
//! # Example
//!
//! ```
//! # use pdl::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.emit().runtime_crate(), "::pdl_core");
//! assert!(config.emit().header());
//! ```

use serde::Deserialize;

const DEFAULT_RUNTIME_CRATE: &str = "::pdl_core";
const DEFAULT_DERIVES: &[&str] = &["Debug", "Clone", "PartialEq"];

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Code generation section.
    #[serde(default)]
    emit: EmitConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the given code generation settings.
    pub fn new(emit: EmitConfig) -> Self {
        Self { emit }
    }

    /// Returns the code generation configuration.
    pub fn emit(&self) -> &EmitConfig {
        &self.emit
    }
}

/// Settings of the generated artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Path under which generated code reaches the runtime tree crate.
    runtime_crate: String,

    /// Derives added to every generated struct and enum.
    derives: Vec<String>,

    /// Whether to start the artifact with a "generated" banner.
    header: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            derives: DEFAULT_DERIVES.iter().map(|d| d.to_string()).collect(),
            header: true,
        }
    }
}

impl EmitConfig {
    /// Creates emit settings.
    ///
    /// # Arguments
    ///
    /// * `runtime_crate` - Path of the runtime crate, e.g. `::pdl_core` or `crate::runtime`.
    /// * `derives` - Derive macros applied to every generated type.
    /// * `header` - Whether to emit the "generated" banner.
    pub fn new(runtime_crate: impl Into<String>, derives: Vec<String>, header: bool) -> Self {
        Self {
            runtime_crate: runtime_crate.into(),
            derives,
            header,
        }
    }

    pub fn runtime_crate(&self) -> &str {
        &self.runtime_crate
    }

    pub fn derives(&self) -> &[String] {
        &self.derives
    }

    pub fn header(&self) -> bool {
        self.header
    }
}
