//! Error types for style sheet loading and validation

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Malformed or unreadable style configuration
///
/// Loading stops at the first error; no partial style sheet is produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown meta key '{key}'")]
    UnknownMetaKey { key: String },

    #[error("no rules given")]
    NoRules,

    #[error("unknown $type '{value}' (expected node, way or relation)")]
    UnknownType { value: String },

    #[error("invalid value for '{key}': expected {expected}")]
    InvalidValue { key: String, expected: &'static str },

    #[error("unknown style '{name}'")]
    UnknownStyle { name: String },

    #[error("circular import: {}", chain.join(" -> "))]
    CircularImport { chain: Vec<String> },

    #[error("failed to read style source '{source_id}': {error}")]
    Io {
        source_id: String,
        #[source]
        error: std::io::Error,
    },

    /// Syntax or document shape error, with the offending text kept for reporting
    #[error("cannot parse '{source_id}': {message}")]
    Parse {
        source_id: String,
        span: Span,
        message: String,
        text: String,
    },

    #[error("rule #{index}: {error}")]
    InRule {
        index: usize,
        #[source]
        error: Box<ConfigError>,
    },

    #[error("style '{name}': {error}")]
    InStyle {
        name: String,
        #[source]
        error: Box<ConfigError>,
    },

    #[error("in '{source_id}': {error}")]
    InSource {
        source_id: String,
        #[source]
        error: Box<ConfigError>,
    },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidValue {
            key: key.into(),
            expected,
        }
    }

    /// Wrap a `serde_json` failure, translating its line/column into a span
    pub fn json(source_id: &str, text: &str, err: serde_json::Error) -> Self {
        let start = offset_of(text, err.line(), err.column());
        Self::Parse {
            source_id: source_id.to_string(),
            span: widen(start..start, text.len()),
            message: strip_position(&err.to_string()),
            text: text.to_string(),
        }
    }

    pub fn toml(source_id: &str, text: &str, err: toml::de::Error) -> Self {
        let span = err.span().unwrap_or(0..0);
        Self::Parse {
            source_id: source_id.to_string(),
            span: widen(span, text.len()),
            message: err.message().to_string(),
            text: text.to_string(),
        }
    }

    pub fn in_rule(self, index: usize) -> Self {
        Self::InRule {
            index,
            error: Box::new(self),
        }
    }

    pub fn in_style(self, name: impl Into<String>) -> Self {
        Self::InStyle {
            name: name.into(),
            error: Box::new(self),
        }
    }

    /// Attach the source identifier unless the error already names one
    pub fn in_source(self, source_id: &str) -> Self {
        match self {
            Self::Io { .. }
            | Self::Parse { .. }
            | Self::CircularImport { .. }
            | Self::InSource { .. } => self,
            other => Self::InSource {
                source_id: source_id.to_string(),
                error: Box::new(other),
            },
        }
    }

    /// Name the importing document when an imported one cannot be read
    pub fn imported_by(self, importer: &str) -> Self {
        match self {
            Self::Io { .. } => Self::InSource {
                source_id: importer.to_string(),
                error: Box::new(self),
            },
            other => other,
        }
    }

    /// Format the error for humans, with a source excerpt for parse errors
    pub fn format(&self) -> String {
        let Self::Parse {
            source_id,
            span,
            message,
            text,
        } = self
        else {
            return self.to_string();
        };

        let filename = source_id.as_str();
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_config(Config::default().with_color(false))
            .with_message(message)
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(text.as_str())), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Byte offset of a 1-based line/column position, clamped to the text
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Make sure the span covers at least one character when the text allows it
fn widen(span: Span, len: usize) -> Span {
    let start = span.start.min(len);
    let end = span.end.max(start + 1).min(len);
    start..end.max(start)
}

/// serde_json appends " at line X column Y"; the report shows that already
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
