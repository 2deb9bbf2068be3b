//! Configuration management for the metamodel compiler
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (metamodel-graphql.toml)
//! - Environment variables (METAGQL__*)
//!
//! ## Example config file (metamodel-graphql.toml):
//! ```toml
//! [input]
//! extensions = ["json"]
//! skip_prefixes = ["target/", ".git/"]
//!
//! [output]
//! extension = "graphqls"
//! descriptions = true
//! header = true
//! schema_definition = true
//!
//! [diagnostics]
//! deny_warnings = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::checksum::Checksum;
use crate::metamodel::LoadConfig;
use crate::schema::PrintOptions;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Resource discovery
    #[serde(default)]
    pub input: InputConfig,

    /// SDL rendering and file naming
    #[serde(default)]
    pub output: OutputConfig,

    /// Diagnostic policy
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extensions treated as metamodel resources
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Relative path prefixes to skip while walking the input directory
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Extension replacing each resource's own extension in the output tree
    #[serde(default = "default_output_extension")]
    pub extension: String,

    /// Print metamodel and synthesized descriptions
    #[serde(default = "default_true")]
    pub descriptions: bool,

    /// Print a header comment naming the source resource and its digest
    #[serde(default = "default_true")]
    pub header: bool,

    /// Print the `schema { ... }` definition
    #[serde(default = "default_true")]
    pub schema_definition: bool,
}

/// Diagnostics configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Treat warnings as failures for the resource
    #[serde(default)]
    pub deny_warnings: bool,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string()]
}

fn default_skip_prefixes() -> Vec<String> {
    LoadConfig::default().skip_prefixes
}

fn default_output_extension() -> String {
    "graphqls".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_prefixes: default_skip_prefixes(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: default_output_extension(),
            descriptions: true,
            header: true,
            schema_definition: true,
        }
    }
}

impl TransformConfig {
    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "metamodel-graphql.toml",
            ".metamodel-graphql.toml",
            "config/metamodel-graphql.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "metamodel", "metamodel-graphql") {
            let xdg_config = config_dir.config_dir().join("metamodel-graphql.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // Load from environment variables (METAGQL__OUTPUT__HEADER=false)
        builder = builder.add_source(
            Environment::with_prefix("METAGQL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Resource discovery settings for the loader
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            extensions: self.input.extensions.clone(),
            skip_prefixes: self.input.skip_prefixes.clone(),
        }
    }

    /// Printer options for one resource
    pub fn print_options(&self, resource: &Path, digest: &Checksum) -> PrintOptions {
        let header = if self.output.header {
            vec![
                format!("Generated from {}", resource.display()),
                format!("sha256 {}", digest.short()),
            ]
        } else {
            Vec::new()
        };

        PrintOptions {
            descriptions: self.output.descriptions,
            header,
            schema_definition: self.output.schema_definition,
        }
    }

    /// Output path for a resource: `<output>/<relative>` with the configured extension
    pub fn output_path(&self, output_dir: &Path, relative: &Path) -> PathBuf {
        output_dir.join(relative.with_extension(&self.output.extension))
    }
}
