use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub render: RenderConfig,
}

/// Where the reader finds its anchors in the model document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// `xmi.id` of the logical view that owns every package
    pub logical_view_id: String,
    /// Pseudo-package holding primitive data types
    pub datatypes_package: String,
    /// Folder holding the sequence diagrams
    pub sequence_package: String,
    /// Classes in this package are never cross-referenced
    pub std_package: String,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination file, stdout when unset
    pub file: Option<PathBuf>,
    pub image_dir: PathBuf,
    pub override_dir: PathBuf,
}

/// External diagram rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub enabled: bool,
    /// Renders the model's diagrams to SVG
    pub renderer: String,
    /// Converts SVG to PDF
    pub converter: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            logical_view_id: "Logical_View".to_string(),
            datatypes_package: "Datatypes".to_string(),
            sequence_package: "Sequence Diagrams".to_string(),
            std_package: "std".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: None,
            image_dir: PathBuf::from("outImages"),
            override_dir: PathBuf::from("template_override"),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            renderer: "umbrello5".to_string(),
            converter: "rsvg-convert".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        output: Option<PathBuf>,
        templates: Option<PathBuf>,
        out_images: Option<PathBuf>,
        no_pics: bool,
    ) {
        if let Some(out) = output {
            self.output.file = Some(out);
        }

        if let Some(dir) = templates {
            self.output.override_dir = dir;
        }

        if let Some(dir) = out_images {
            self.output.image_dir = dir;
        }

        if no_pics {
            self.render.enabled = false;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let anchors = [
            ("logical_view_id", &self.model.logical_view_id),
            ("datatypes_package", &self.model.datatypes_package),
            ("sequence_package", &self.model.sequence_package),
            ("std_package", &self.model.std_package),
        ];
        for (key, value) in anchors {
            if value.trim().is_empty() {
                return Err(Error::config_validation(format!("{} must not be empty", key)));
            }
        }

        if self.render.enabled {
            if self.render.renderer.trim().is_empty() {
                return Err(Error::config_validation("renderer command required"));
            }
            if self.render.converter.trim().is_empty() {
                return Err(Error::config_validation("converter command required"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.logical_view_id, "Logical_View");
        assert_eq!(config.model.std_package, "std");
        assert_eq!(config.output.image_dir, PathBuf::from("outImages"));
        assert!(config.output.file.is_none());
        assert!(config.render.enabled);
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[model]
sequence_package = "Sequenzdiagramme"

[output]
image_dir = "build/images"

[render]
enabled = false
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.model.sequence_package, "Sequenzdiagramme");
        assert_eq!(config.model.datatypes_package, "Datatypes");
        assert_eq!(config.output.image_dir, PathBuf::from("build/images"));
        assert!(!config.render.enabled);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/umltex.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/umltex.toml"));
        assert_eq!(config.model.sequence_package, "Sequence Diagrams");
    }

    #[test]
    fn test_validation_empty_anchor() {
        let mut config = Config::default();
        config.model.logical_view_id = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_renderer() {
        let mut config = Config::default();
        config.render.renderer.clear();
        assert!(config.validate().is_err());

        config.render.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_cli_paths() {
        let mut config = Config::default();
        config.merge_cli(
            Some(PathBuf::from("doc.tex")),
            Some(PathBuf::from("custom")),
            Some(PathBuf::from("pics")),
            false,
        );
        assert_eq!(config.output.file, Some(PathBuf::from("doc.tex")));
        assert_eq!(config.output.override_dir, PathBuf::from("custom"));
        assert_eq!(config.output.image_dir, PathBuf::from("pics"));
        assert!(config.render.enabled);
    }

    #[test]
    fn test_merge_cli_keeps_config_values() {
        let mut config = Config::default();
        config.output.image_dir = PathBuf::from("from-file");
        config.merge_cli(None, None, None, false);
        assert_eq!(config.output.image_dir, PathBuf::from("from-file"));
    }

    #[test]
    fn test_merge_cli_no_pics() {
        let mut config = Config::default();
        config.merge_cli(None, None, None, true);
        assert!(!config.render.enabled);
    }
}
