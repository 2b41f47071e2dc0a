use std::path::PathBuf;
use thiserror::Error;

/// umltex error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Malformed model XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Required model element not found: {0}")]
    MissingAnchor(String),

    #[error("Model element `{element}` is missing attribute `{attribute}`")]
    MissingAttribute { element: String, attribute: String },

    #[error("Unsupported classifier kind `{tag}` (id {id})")]
    UnknownClassKind { tag: String, id: String },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Failed to write diagram XML: {0}")]
    XmlWrite(String),

    #[error("Failed to run {tool}: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for umltex operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a missing anchor error
    pub fn missing_anchor(what: impl Into<String>) -> Self {
        Error::MissingAnchor(what.into())
    }

    /// Create a missing attribute error
    pub fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an external tool error
    pub fn external_tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
