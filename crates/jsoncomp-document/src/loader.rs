//! Content loading
//!
//! Reads files and strings into [`Value`] trees. JSON input may carry `//`
//! line comments and `/* */` block comments; they are stripped before parsing.
//! YAML goes through `serde_yaml`, anything else is kept as plain text.

use crate::error::LoadError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Label used for content that did not come from a file
const INLINE_SOURCE: &str = "<inline>";

/// Content format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON with optional comments
    #[default]
    Json,
    /// YAML
    Yaml,
    /// Raw text, kept as a string value
    Text,
}

impl Format {
    /// Infer format from a file extension
    ///
    /// Unknown or missing extensions are treated as text.
    #[must_use]
    pub fn from_extension(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Text,
        }
    }

    /// Parse an explicit format name
    ///
    /// # Errors
    /// Returns [`LoadError::UnknownFormat`] for unrecognized names
    pub fn from_name(name: &str) -> Result<Self, LoadError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(LoadError::UnknownFormat(name.to_string())),
        }
    }

    /// Canonical lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Text => "text",
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remove `//` and `/* */` comments outside of string literals
///
/// Newlines inside block comments are kept so that line numbers reported by
/// the parser still point at the original source.
#[must_use]
pub fn strip_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parse inline content
///
/// # Errors
/// Returns [`LoadError::Syntax`] if the content is not valid for `format`
pub fn parse_str(content: &str, format: Format) -> Result<Value, LoadError> {
    parse_source(content, format, Path::new(INLINE_SOURCE))
}

/// Read and parse a file
///
/// # Errors
/// - [`LoadError::Io`] if the file cannot be read
/// - [`LoadError::Syntax`] if the content is not valid for `format`
pub fn read_file(path: &Path, format: Format) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::io_error(path, e))?;
    parse_source(&content, format, path)
}

/// Read and parse a file, inferring the format from its extension
///
/// # Errors
/// Same as [`read_file`]
pub fn read_file_auto(path: &Path) -> Result<Value, LoadError> {
    read_file(path, Format::from_extension(path))
}

fn parse_source(content: &str, format: Format, path: &Path) -> Result<Value, LoadError> {
    match format {
        Format::Json => {
            let stripped = strip_comments(content);
            serde_json::from_str::<serde_json::Value>(&stripped)
                .map(Value::from)
                .map_err(|e| {
                    LoadError::syntax_error(
                        path,
                        e.line(),
                        e.column(),
                        describe_json_error(&e, &stripped),
                    )
                })
        }
        Format::Yaml => {
            if content.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_yaml::from_str::<Value>(content).map_err(|e| {
                let (line, column) = e
                    .location()
                    .map_or((0, 0), |loc| (loc.line(), loc.column()));
                LoadError::syntax_error(path, line, column, e.to_string())
            })
        }
        Format::Text => Ok(Value::String(content.to_string())),
    }
}

fn describe_json_error(err: &serde_json::Error, content: &str) -> String {
    if content.trim().is_empty() {
        return "no content to parse".to_string();
    }
    let line = err
        .line()
        .checked_sub(1)
        .and_then(|n| content.lines().nth(n))
        .unwrap_or_default();
    if line.trim().is_empty() {
        err.to_string()
    } else {
        format!("{err} (near `{}`)", line.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn strip_line_and_block_comments() {
        let src = "{\n  // comment\n  \"a\": 1, /* inline */ \"b\": 2\n}";
        let stripped = strip_comments(src);
        assert!(!stripped.contains("comment"));
        assert!(!stripped.contains("inline"));
        assert_eq!(stripped.lines().count(), src.lines().count());
        assert_eq!(
            parse_str(src, Format::Json).unwrap(),
            Value::from(json!({"a": 1, "b": 2}))
        );
    }

    #[test]
    fn strip_keeps_comment_markers_in_strings() {
        let src = r#"{"url": "http://host/*path*/", "q": "a \" // b"}"#;
        assert_eq!(strip_comments(src), src);
    }

    #[test]
    fn block_comment_keeps_line_numbers() {
        let src = "{\n/* one\ntwo\n*/\n\"a\": }";
        let err = parse_str(src, Format::Json).unwrap_err();
        match err {
            LoadError::Syntax { line, .. } => assert_eq!(line, 5),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_extension(Path::new("a/b.json")), Format::Json);
        assert_eq!(Format::from_extension(Path::new("b.YML")), Format::Yaml);
        assert_eq!(Format::from_extension(Path::new("b.yaml")), Format::Yaml);
        assert_eq!(Format::from_extension(Path::new("b.txt")), Format::Text);
        assert_eq!(Format::from_extension(Path::new("README")), Format::Text);
    }

    #[test]
    fn format_from_name() {
        assert_eq!(Format::from_name("JSON").unwrap(), Format::Json);
        assert_eq!(Format::from_name("txt").unwrap(), Format::Text);
        assert!(matches!(
            Format::from_name("xml"),
            Err(LoadError::UnknownFormat(_))
        ));
    }

    #[test]
    fn parse_yaml_and_text() {
        let yaml = "name: demo\nitems:\n  - 1\n  - two\n";
        assert_eq!(
            parse_str(yaml, Format::Yaml).unwrap(),
            Value::from(json!({"name": "demo", "items": [1, "two"]}))
        );
        assert_eq!(
            parse_str("plain // text", Format::Text).unwrap(),
            Value::from("plain // text")
        );
    }

    #[test]
    fn empty_json_is_syntax_error() {
        let err = parse_str("  \n", Format::Json).unwrap_err();
        assert!(err.to_string().contains("no content to parse"));
    }

    #[test]
    fn read_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{{\"a\": [1, 2,]}}").unwrap();

        let err = read_file_auto(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
        assert!(matches!(err, LoadError::Syntax { line: 1, .. }));
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join("absent.json"), Format::Json).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
