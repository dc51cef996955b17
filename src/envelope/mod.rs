//! Save and load of documents as a JSON envelope.
//!
//! The envelope is the persisted, wire-compatible form of a document:
//!
//! ```json
//! {
//!   "type": "blocknote",
//!   "content": [ ...blocks... ],
//!   "documentName": "Untitled Document",
//!   "timestamp": "2026-10-19T08:30:00.000Z"
//! }
//! ```
//!
//! Reading distinguishes three ways a file can be unusable (not JSON, not an
//! envelope, content that is not a block list); each has its own alert text.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::document::{Block, HostError, PartialBlock};

/// Fixed discriminator of the envelope's `type` field.
pub const ENVELOPE_TYPE: &str = "blocknote";

/// File extension of saved documents.
pub const DOCUMENT_EXTENSION: &str = "json";

/// File stem used when a document name has no usable characters.
pub const FALLBACK_FILE_STEM: &str = "document";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeOut<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a [Block],
    document_name: &'a str,
    timestamp: String,
}

/// A parsed envelope, ready to be handed to the host's replace operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub content: Vec<PartialBlock>,
    pub document_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Why a document could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("file is not a blocknote document")]
    UnsupportedFormat,
    #[error("document content is not a list of blocks: {0}")]
    MalformedContent(#[source] serde_json::Error),
    #[error("editor rejected the document: {0}")]
    Rejected(#[from] HostError),
}

impl LoadError {
    /// Text shown to the user.
    pub const fn alert_message(&self) -> &'static str {
        match self {
            Self::Io { .. } => "Could not read the selected file",
            Self::InvalidJson(_) => "File format error, please select a valid JSON file",
            Self::UnsupportedFormat => {
                "File format not supported, please select a valid BlockNote document"
            }
            Self::MalformedContent(_) | Self::Rejected(_) => {
                "Document loading failed, please check file format"
            }
        }
    }
}

/// Why a document could not be saved.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g.
/// `2026-10-19T08:30:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Encode blocks as a pretty-printed envelope (2-space indent).
///
/// # Errors
/// Returns an error if a block cannot be encoded.
pub fn serialize_document(
    blocks: &[Block],
    document_name: &str,
    at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&EnvelopeOut {
        kind: ENVELOPE_TYPE,
        content: blocks,
        document_name,
        timestamp: format_timestamp(at),
    })
}

/// Decode an envelope.
///
/// # Errors
/// [`LoadError::InvalidJson`] when `text` is not JSON,
/// [`LoadError::UnsupportedFormat`] when `type` is not `"blocknote"` or
/// `content` is missing, [`LoadError::MalformedContent`] when `content` is
/// not a list of blocks.
pub fn parse_envelope(text: &str) -> Result<Envelope, LoadError> {
    let mut value: Value = serde_json::from_str(text).map_err(LoadError::InvalidJson)?;
    if value.get("type").and_then(Value::as_str) != Some(ENVELOPE_TYPE) {
        return Err(LoadError::UnsupportedFormat);
    }
    let content = match value.get_mut("content").map(Value::take) {
        None | Some(Value::Null) => return Err(LoadError::UnsupportedFormat),
        Some(content) => content,
    };
    let content: Vec<PartialBlock> =
        serde_json::from_value(content).map_err(LoadError::MalformedContent)?;
    let document_name = value
        .get("documentName")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc));
    Ok(Envelope {
        content,
        document_name,
        timestamp,
    })
}

/// File name a document is saved under: `<name>.json`.
///
/// The name always stays a single path component: separators, drive colons
/// and control characters become `_`, leading dots are dropped, and a name
/// with nothing left falls back to [`FALLBACK_FILE_STEM`].
pub fn document_file_name(document_name: &str) -> String {
    let cleaned: String = document_name
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let stem = cleaned.trim().trim_start_matches('.');
    let stem = if stem.is_empty() {
        FALLBACK_FILE_STEM
    } else {
        stem
    };
    format!("{stem}.{DOCUMENT_EXTENSION}")
}

/// Document name derived from a file name: the `.json` suffix is removed.
pub fn name_from_file_name(file_name: &str) -> String {
    file_name
        .strip_suffix(".json")
        .unwrap_or(file_name)
        .to_string()
}

/// Read an envelope from disk.
///
/// Returns the envelope and the file name it was read from.
///
/// # Errors
/// Fails when the file cannot be read or parsed.
pub fn read_envelope(path: &Path) -> Result<(Envelope, String), LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok((parse_envelope(&text)?, file_name))
}

/// Write an encoded envelope to `path`.
///
/// # Errors
/// Fails when the file cannot be written.
pub fn write_envelope(path: &Path, json: &str) -> Result<(), SaveError> {
    std::fs::write(path, format!("{json}\n")).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockId, BlockKind, InlineItem, PartialContent};
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()
    }

    fn paragraph(id: &str, items: Vec<InlineItem>) -> Block {
        Block {
            id: BlockId::from(id),
            kind: BlockKind::Paragraph,
            props: serde_json::Map::new(),
            content: Some(items),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_serialize_writes_envelope_shape() {
        let blocks = vec![paragraph("a", vec![InlineItem::text("hi")])];
        let json = serialize_document(&blocks, "Notes", fixed_time()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "blocknote");
        assert_eq!(value["documentName"], "Notes");
        assert_eq!(value["timestamp"], "2026-10-19T08:30:00.000Z");
        assert_eq!(value["content"][0]["id"], "a");
        assert_eq!(value["content"][0]["content"][0]["text"], "hi");
    }

    #[test]
    fn test_serialize_uses_two_space_indent() {
        let json = serialize_document(&[], "x", fixed_time()).unwrap();
        assert!(json.starts_with("{\n  \"type\": \"blocknote\""));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(
            parse_envelope("{not json"),
            Err(LoadError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        let err = parse_envelope(r#"{"type":"markdown","content":[]}"#).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat));
    }

    #[test]
    fn test_parse_rejects_missing_content() {
        assert!(matches!(
            parse_envelope(r#"{"type":"blocknote"}"#),
            Err(LoadError::UnsupportedFormat)
        ));
        assert!(matches!(
            parse_envelope(r#"{"type":"blocknote","content":null}"#),
            Err(LoadError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_parse_rejects_content_that_is_not_blocks() {
        assert!(matches!(
            parse_envelope(r#"{"type":"blocknote","content":"text"}"#),
            Err(LoadError::MalformedContent(_))
        ));
    }

    #[test]
    fn test_parse_accepts_shorthand_blocks() {
        let envelope = parse_envelope(
            r#"{"type":"blocknote","content":[{"type":"paragraph","content":["a",{"type":"inlineButton","props":{"title":"B"}}]}]}"#,
        )
        .unwrap();
        assert_eq!(envelope.document_name, None);
        assert_eq!(envelope.timestamp, None);
        assert_eq!(
            envelope.content[0].content,
            Some(PartialContent::Items(vec![
                InlineItem::text("a"),
                InlineItem::button("B")
            ]))
        );
    }

    #[test]
    fn test_parse_reads_name_and_timestamp() {
        let envelope = parse_envelope(
            r#"{"type":"blocknote","content":[],"documentName":"Plan","timestamp":"2026-10-19T08:30:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(envelope.document_name.as_deref(), Some("Plan"));
        assert_eq!(envelope.timestamp, Some(fixed_time()));
    }

    #[test]
    fn test_alert_messages_are_distinct() {
        let invalid = parse_envelope("nope").unwrap_err();
        let unsupported = parse_envelope(r#"{"type":"other","content":[]}"#).unwrap_err();
        let rejected = LoadError::Rejected(HostError::NoInsertionPoint);
        assert_ne!(invalid.alert_message(), unsupported.alert_message());
        assert_ne!(unsupported.alert_message(), rejected.alert_message());
        assert_ne!(invalid.alert_message(), rejected.alert_message());
    }

    #[test]
    fn test_name_from_file_name_strips_suffix() {
        assert_eq!(name_from_file_name("Plan.json"), "Plan");
        assert_eq!(name_from_file_name("my.json.backup"), "my.json.backup");
        assert_eq!(name_from_file_name("README"), "README");
        assert_eq!(document_file_name("Plan"), "Plan.json");
    }

    #[test]
    fn test_document_file_name_stays_one_component() {
        assert_eq!(document_file_name("../escaped"), "_escaped.json");
        assert_eq!(document_file_name("/etc/passwd"), "_etc_passwd.json");
        assert_eq!(document_file_name("a\\b:c"), "a_b_c.json");
        assert_eq!(document_file_name(".hidden"), "hidden.json");
        assert_eq!(document_file_name(".."), "document.json");
        assert_eq!(document_file_name("  "), "document.json");
        assert_eq!(document_file_name("v1.2 notes"), "v1.2 notes.json");
    }

    #[test]
    fn test_write_then_read_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Doc.json");
        let blocks = vec![paragraph("a", vec![InlineItem::button("Go")])];
        let json = serialize_document(&blocks, "Doc", fixed_time()).unwrap();
        write_envelope(&path, &json).unwrap();
        let (envelope, file_name) = read_envelope(&path).unwrap();
        assert_eq!(file_name, "Doc.json");
        assert_eq!(envelope.content, vec![PartialBlock::from(blocks[0].clone())]);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_envelope(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
