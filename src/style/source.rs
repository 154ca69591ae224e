//! Resolution of style source identifiers to documents
//!
//! Style sheets refer to each other by identifier (`"import": ["base"]`).
//! A [`StyleSource`] turns such an identifier into the text of a document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Serialization format of a style document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Toml,
}

impl SourceFormat {
    /// Guess the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => SourceFormat::Toml,
            _ => SourceFormat::Json,
        }
    }
}

/// Raw text of one style document
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Identifier the document was requested under
    pub id: String,
    pub text: String,
    pub format: SourceFormat,
}

/// Resolves style source identifiers
pub trait StyleSource {
    fn read(&self, id: &str) -> Result<SourceDocument, ConfigError>;
}

/// Reads style documents from a directory
///
/// An identifier with an extension names a file directly. Without one,
/// `<id>.json` is tried first, then `<id>.toml`.
#[derive(Debug, Clone)]
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let direct = self.base_dir.join(id);
        if direct.extension().is_some() {
            return direct;
        }
        let json = direct.with_extension("json");
        if json.exists() {
            return json;
        }
        let toml = direct.with_extension("toml");
        if toml.exists() {
            toml
        } else {
            json
        }
    }
}

impl StyleSource for FileSource {
    fn read(&self, id: &str) -> Result<SourceDocument, ConfigError> {
        let path = self.resolve(id);
        let text = std::fs::read_to_string(&path).map_err(|error| ConfigError::Io {
            source_id: path.display().to_string(),
            error,
        })?;
        Ok(SourceDocument {
            id: id.to_string(),
            text,
            format: SourceFormat::from_path(&path),
        })
    }
}

/// Style documents held in memory, keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, (String, SourceFormat)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(id, text, SourceFormat::Json);
        self
    }

    pub fn with_toml(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(id, text, SourceFormat::Toml);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>, format: SourceFormat) {
        self.documents.insert(id.into(), (text.into(), format));
    }
}

impl StyleSource for MemorySource {
    fn read(&self, id: &str) -> Result<SourceDocument, ConfigError> {
        let (text, format) = self.documents.get(id).ok_or_else(|| ConfigError::Io {
            source_id: id.to_string(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "no such style source"),
        })?;
        Ok(SourceDocument {
            id: id.to_string(),
            text: text.clone(),
            format: *format,
        })
    }
}
