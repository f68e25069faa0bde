//! Render configuration.
//!
//! Loaded from TOML. Every section and field is optional:
//! ```toml
//! [python]
//! indent = 2
//! type_hints = false
//! ```
//!
//! [`RenderConfig::discover`] looks for `.arbor/config.toml` under a
//! project root and falls back to defaults when there is none.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for the Python writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    /// Emit annotations for declared types.
    pub type_hints: bool,
}

impl Default for PythonOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            type_hints: true,
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub python: PythonOptions,
}

impl RenderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded render config");
        Ok(config)
    }

    /// Load `.arbor/config.toml` under `root`, or defaults if it does not exist.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(".arbor").join("config.toml");
        if path.is_file() {
            Self::load(&path)
        } else {
            tracing::debug!(root = %root.display(), "no render config, using defaults");
            Ok(Self::default())
        }
    }

    /// A Python writer configured by this file.
    #[cfg(feature = "write-python")]
    pub fn python_writer(&self) -> crate::output::PythonWriter {
        crate::output::PythonWriter::new(self.python.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.python.indent, 4);
        assert!(config.python.type_hints);
    }

    #[test]
    fn test_partial_config() {
        let config = RenderConfig::from_toml_str("[python]\nindent = 2\n").unwrap();
        assert_eq!(config.python.indent, 2);
        assert!(config.python.type_hints);
    }

    #[test]
    fn test_invalid_config() {
        let err = RenderConfig::from_toml_str("[python]\nindent = \"wide\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        let arbor_dir = dir.path().join(".arbor");
        std::fs::create_dir_all(&arbor_dir).unwrap();

        let mut file = std::fs::File::create(arbor_dir.join("config.toml")).unwrap();
        writeln!(
            file,
            r#"
[python]
indent = 8
type_hints = false
"#
        )
        .unwrap();

        let config = RenderConfig::discover(dir.path()).unwrap();
        assert_eq!(config.python.indent, 8);
        assert!(!config.python.type_hints);
    }

    #[test]
    fn test_discover_without_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(RenderConfig::discover(dir.path()).unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = RenderConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
