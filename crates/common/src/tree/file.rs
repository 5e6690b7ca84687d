use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blobs::BlobId;
use crate::ids::ShortId;

/// Type tag carried by every file.
///
/// Unknown tags from older documents (or newer writers) survive a
/// load/save cycle through [`FileKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileKind {
    Text,
    Code,
    Document,
    Photo,
    Video,
    Audio,
    Dataset,
    Other(String),
}

impl FileKind {
    pub fn as_str(&self) -> &str {
        match self {
            FileKind::Text => "text",
            FileKind::Code => "code",
            FileKind::Document => "document",
            FileKind::Photo => "photo",
            FileKind::Video => "video",
            FileKind::Audio => "audio",
            FileKind::Dataset => "dataset",
            FileKind::Other(tag) => tag,
        }
    }

    /// Kinds whose content reads as text, wherever it is stored.
    pub fn is_textual(&self) -> bool {
        matches!(self, FileKind::Text | FileKind::Code)
    }
}

impl From<String> for FileKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => FileKind::Text,
            "code" => FileKind::Code,
            "document" => FileKind::Document,
            "photo" => FileKind::Photo,
            "video" => FileKind::Video,
            "audio" => FileKind::Audio,
            "dataset" => FileKind::Dataset,
            _ => FileKind::Other(tag),
        }
    }
}

impl From<&str> for FileKind {
    fn from(tag: &str) -> Self {
        FileKind::from(tag.to_string())
    }
}

impl From<FileKind> for String {
    fn from(kind: FileKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a file's bytes live.
// NOTE: variant order matters for the untagged decode. A record carrying
//  a blob reference must never fall through to `Inline`, which accepts
//  anything because its field defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileContent {
    Blob {
        #[serde(alias = "message_id")]
        blob_id: BlobId,
    },
    Inline {
        #[serde(default)]
        content: String,
    },
}

/// A leaf content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(rename = "type")]
    kind: FileKind,
    short_id: ShortId,
    name: String,
    #[serde(flatten)]
    content: FileContent,
}

impl FileEntry {
    pub fn new(kind: FileKind, short_id: ShortId, name: impl Into<String>, content: FileContent) -> Self {
        Self {
            kind,
            short_id,
            name: name.into(),
            content,
        }
    }

    /// A text file with inline content.
    pub fn text(short_id: ShortId, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            FileKind::Text,
            short_id,
            name,
            FileContent::Inline {
                content: text.into(),
            },
        )
    }

    /// A file whose bytes live in a blob store.
    pub fn blob(kind: FileKind, short_id: ShortId, name: impl Into<String>, blob_id: BlobId) -> Self {
        Self::new(kind, short_id, name, FileContent::Blob { blob_id })
    }

    pub fn kind(&self) -> &FileKind {
        &self.kind
    }

    pub fn short_id(&self) -> &ShortId {
        &self.short_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Inline text, if this file carries any.
    pub fn inline(&self) -> Option<&str> {
        match &self.content {
            FileContent::Inline { content } => Some(content),
            FileContent::Blob { .. } => None,
        }
    }

    pub fn blob_id(&self) -> Option<&BlobId> {
        match &self.content {
            FileContent::Blob { blob_id } => Some(blob_id),
            FileContent::Inline { .. } => None,
        }
    }

    pub(crate) fn set_short_id(&mut self, short_id: ShortId) {
        self.short_id = short_id;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_legacy_records() {
        let text: FileEntry = serde_json::from_str(
            r#"{"type": "text", "content": "hello", "short_id": "0a1b2c3d", "name": "message_0a1b2c3d"}"#,
        )
        .unwrap();
        assert_eq!(text.kind(), &FileKind::Text);
        assert_eq!(text.inline(), Some("hello"));

        let photo: FileEntry = serde_json::from_str(
            r#"{"type": "photo", "message_id": 913, "short_id": "ffee0011", "name": "file_ffee0011"}"#,
        )
        .unwrap();
        assert_eq!(photo.kind(), &FileKind::Photo);
        assert_eq!(photo.blob_id().map(|b| b.as_str()), Some("913"));
        assert_eq!(photo.inline(), None);
    }

    #[test]
    fn test_encode_shape() {
        let entry = FileEntry::blob(
            FileKind::Document,
            "12345678".parse().unwrap(),
            "report.pdf",
            BlobId::new("b1"),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "document");
        assert_eq!(value["blob_id"], "b1");
        assert_eq!(value["short_id"], "12345678");
        assert!(value.get("content").is_none());
    }

    #[test]
    fn test_unknown_kind_survives() {
        let entry: FileEntry = serde_json::from_str(
            r#"{"type": "sticker", "blob_id": "x", "short_id": "00000000", "name": "s"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind(), &FileKind::Other("sticker".to_string()));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "sticker");
    }
}
