use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while reading or writing a configuration document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Failed to read or write the document file.
    #[error("failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// Input bytes are not UTF-8.
    #[error("configuration file is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// Input was not valid JSON once comments were removed.
    #[error("failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A `/*` comment was never closed.
    #[error("unterminated block comment starting on line {0}")]
    UnterminatedComment(usize),
    /// The top-level value is a list, string or scalar.
    #[error("configuration document root is not an object")]
    NotAnObject,
}

/// Which daemon section a document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Dhcp4,
    Dhcp6,
}

impl Display for AddressFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Dhcp4 => f.write_str("Dhcp4"),
            AddressFamily::Dhcp6 => f.write_str("Dhcp6"),
        }
    }
}

/// Parse configuration bytes into a JSON object.
///
/// `#` and `//` line comments and `/* */` block comments are accepted outside
/// string literals, as in Kea's own configuration files.
pub fn parse_document(bytes: &[u8]) -> Result<Value, DocumentError> {
    let text = std::str::from_utf8(bytes)?;
    let stripped = strip_comments(text)?;
    let value: Value = serde_json::from_str(&stripped)?;
    if !value.is_object() {
        return Err(DocumentError::NotAnObject);
    }
    Ok(value)
}

/// Read and parse a configuration file from disk.
pub fn read_document(path: impl AsRef<Path>) -> Result<Value, DocumentError> {
    let bytes = fs::read(path)?;
    parse_document(&bytes)
}

/// Serialize a document as pretty-printed JSON with a trailing newline.
pub fn write_document(document: &Value) -> Result<Vec<u8>, DocumentError> {
    let mut out = serde_json::to_vec_pretty(document)?;
    out.push(b'\n');
    Ok(out)
}

/// Serialize a document and write it to disk.
pub fn write_document_file(document: &Value, path: impl AsRef<Path>) -> Result<(), DocumentError> {
    let bytes = write_document(document)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// The daemon section present at the document root. A root holding both
/// `Dhcp4` and `Dhcp6` is ambiguous and yields `None`.
pub fn detect_family(document: &Value) -> Option<AddressFamily> {
    let root = document.as_object()?;
    match (root.contains_key("Dhcp4"), root.contains_key("Dhcp6")) {
        (true, false) => Some(AddressFamily::Dhcp4),
        (false, true) => Some(AddressFamily::Dhcp6),
        _ => None,
    }
}

/// Remove comments outside string literals. Newlines inside comments are kept
/// so JSON error positions still point at the original line.
fn strip_comments(text: &str) -> Result<String, DocumentError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut line = 1;
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }

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

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('#', _) | ('/', Some('/')) => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                let start = line;
                chars.next();
                let mut closed = false;
                while let Some(next) = chars.next() {
                    match next {
                        '\n' => {
                            line += 1;
                            out.push('\n');
                        }
                        '*' if chars.peek() == Some(&'/') => {
                            chars.next();
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                }
                if !closed {
                    return Err(DocumentError::UnterminatedComment(start));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{detect_family, parse_document, strip_comments, AddressFamily, DocumentError};

    #[test]
    fn comments_are_stripped_outside_strings() {
        let input = r#"{
            # hash comment
            "Dhcp4": {
                // line comment
                "server-tag": "a//b#c", /* inline */
                "boot-file-name": "/*not a comment*/"
            }
        }"#;

        let document = parse_document(input.as_bytes()).expect("parse");
        assert_eq!(
            document,
            json!({"Dhcp4": {"server-tag": "a//b#c", "boot-file-name": "/*not a comment*/"}})
        );
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let stripped = strip_comments(r##"{"a": "x\"#y"}"##).expect("strip");
        assert_eq!(stripped, r##"{"a": "x\"#y"}"##);
    }

    #[test]
    fn block_comments_keep_line_count() {
        let stripped = strip_comments("{\n/* one\ntwo */\n}").expect("strip");
        assert_eq!(stripped.lines().count(), 4);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let err = parse_document(b"{\n/* open").expect_err("unterminated");
        assert!(matches!(err, DocumentError::UnterminatedComment(2)));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let err = parse_document(b"{\"Dhcp4\": {\"server-tag\": \"caf\xe9\"}}")
            .expect_err("latin-1 byte");
        assert!(matches!(err, DocumentError::Utf8(_)));
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = parse_document(b"[1, 2]").expect_err("list root");
        assert!(matches!(err, DocumentError::NotAnObject));
    }

    #[test]
    fn family_detection() {
        assert_eq!(detect_family(&json!({"Dhcp4": {}})), Some(AddressFamily::Dhcp4));
        assert_eq!(detect_family(&json!({"Dhcp6": {}})), Some(AddressFamily::Dhcp6));
        assert_eq!(detect_family(&json!({"Dhcp4": {}, "Dhcp6": {}})), None);
        assert_eq!(detect_family(&json!({"Control-agent": {}})), None);
    }
}
