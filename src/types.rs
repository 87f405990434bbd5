//! Core types for the Box folder tree crawl.

use serde::{Deserialize, Serialize};
use std::fmt;

/// NodeId: opaque, stable identifier of a remote folder or file.
///
/// Box hands out numeric ids as strings; they are compared and stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// The root folder of every Box account.
    pub fn root() -> Self {
        NodeId("0".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Frontier entry: a folder still to be expanded and the path it was found under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: NodeId,
    pub path: String,
}

/// A discovered folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: NodeId,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A discovered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: NodeId,
    pub file_name: String,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Anything with an identity and a path can go through dedupe and glob filtering.
pub trait Node {
    fn node_id(&self) -> &NodeId;
    fn node_path(&self) -> &str;
}

impl Node for Folder {
    fn node_id(&self) -> &NodeId {
        &self.id
    }

    fn node_path(&self) -> &str {
        &self.path
    }
}

impl Node for FileEntry {
    fn node_id(&self) -> &NodeId {
        &self.id
    }

    fn node_path(&self) -> &str {
        &self.file_path
    }
}

/// Entry kind as reported by the `type` field of a listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
    /// Web links and anything newer than this client; ignored by the crawl.
    Other(String),
}

impl EntryKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "folder" => EntryKind::Folder,
            "file" => EntryKind::File,
            other => EntryKind::Other(other.to_string()),
        }
    }
}

/// One child entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub kind: EntryKind,
    pub id: NodeId,
    pub name: String,
    pub tags: Vec<String>,
}

/// One page of a listing. `next_cursor == None` marks the final page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub entries: Vec<RawEntry>,
    pub next_cursor: Option<String>,
}

/// The command a crawl is run for; part of the checkpoint identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    ListFolders,
    ListFiles,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::ListFolders => "list-folders",
            CommandKind::ListFiles => "list-files",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_parse() {
        assert_eq!(EntryKind::parse("folder"), EntryKind::Folder);
        assert_eq!(EntryKind::parse("file"), EntryKind::File);
        assert_eq!(
            EntryKind::parse("web_link"),
            EntryKind::Other("web_link".to_string())
        );
    }

    #[test]
    fn test_node_id_serializes_as_plain_string() {
        let item = QueueItem {
            id: NodeId::new("12345"),
            path: "/alpha".to_string(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"id":"12345","path":"/alpha"}"#);
    }

    #[test]
    fn test_file_entry_uses_camel_case_fields() {
        let file = FileEntry {
            id: NodeId::new("7"),
            file_name: "a.txt".to_string(),
            file_path: "/alpha/a.txt".to_string(),
            tags: vec![],
        };
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["fileName"], "a.txt");
        assert_eq!(value["filePath"], "/alpha/a.txt");
        assert!(value.get("tags").is_none());
    }
}
