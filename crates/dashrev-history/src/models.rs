//! Data model shared by the history components and their collaborators

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::DisplayTimezone;

/// One saved state of a document, as listed in the revision log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    /// Server-assigned identifier, increasing with every save
    pub id: i64,
    /// Document this revision belongs to
    #[serde(rename = "dashboardId")]
    pub document_id: i64,
    /// Version number, strictly increasing with `id`
    pub version: u32,
    /// Version this revision was derived from (0 for an initial or overwriting save)
    #[serde(default)]
    pub parent_version: u32,
    /// When the revision was saved
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    /// Who saved the revision
    #[serde(default)]
    pub created_by: String,
    /// Commit message, possibly empty until materialized
    #[serde(default)]
    pub message: String,
    /// Version this entry was restored from, when it resulted from a restore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_from: Option<u32>,
    /// Transient "marked for comparison" flag, never sent over the wire
    #[serde(skip)]
    pub checked: bool,
}

impl Revision {
    /// Whether this is the root entry of the history
    pub fn is_initial(&self) -> bool {
        self.version == 1
    }

    /// Message to display for this revision when none was entered
    pub fn default_message(&self) -> String {
        if self.is_initial() {
            return "Initial save".to_string();
        }
        if let Some(from) = self.restored_from.filter(|v| *v > 0) {
            return format!("Restored from version {from}");
        }
        if self.parent_version == 0 {
            return "Overwritten".to_string();
        }
        "Saved".to_string()
    }

    /// Replace an empty message with its readable default
    pub fn materialize_message(&mut self) {
        if self.message.is_empty() {
            self.message = self.default_message();
        }
    }
}

/// The versioned document whose history is displayed
///
/// Owned by the host; the controller keeps a copy and hands back an updated
/// one after a restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Document id; `None` for a document that was never saved
    pub id: Option<i64>,
    /// Current version of the document
    pub version: u32,
    /// Zone in which timestamps are displayed; `None` defers to configuration
    #[serde(default)]
    pub timezone: Option<DisplayTimezone>,
}

impl DocumentRef {
    /// Reference to a saved document
    pub fn new(id: i64, version: u32) -> Self {
        Self {
            id: Some(id),
            version,
            timezone: None,
        }
    }

    /// Set the display timezone
    pub fn with_timezone(mut self, timezone: DisplayTimezone) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// Id usable for backend calls; zero counts as absent
    pub fn backend_id(&self) -> Option<i64> {
        self.id.filter(|id| *id != 0)
    }
}

/// Named rendering of a diff
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DiffFormat {
    /// Summary of changed paths
    #[default]
    Basic,
    /// Full annotated document
    Html,
    /// Raw JSON delta
    Json,
    /// Any other server-side view
    Custom(String),
}

impl DiffFormat {
    /// Wire name of the format
    pub fn as_str(&self) -> &str {
        match self {
            DiffFormat::Basic => "basic",
            DiffFormat::Html => "html",
            DiffFormat::Json => "json",
            DiffFormat::Custom(name) => name,
        }
    }
}

impl fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "basic" => DiffFormat::Basic,
            "html" => DiffFormat::Html,
            "json" => DiffFormat::Json,
            _ => DiffFormat::Custom(s.trim().to_string()),
        })
    }
}

impl From<&str> for DiffFormat {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(format) => format,
            Err(never) => match never {},
        }
    }
}

impl Serialize for DiffFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DiffFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(DiffFormat::from(name.as_str()))
    }
}

/// Opaque diff content handed to the rendering collaborator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffPayload(pub serde_json::Value);

impl DiffPayload {
    /// Payload returned when there is nothing to compare
    pub fn empty() -> Self {
        Self(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Whether the payload carries no content
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Payload as text when the format renders to markup
    pub fn as_text(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl From<String> for DiffPayload {
    fn from(text: String) -> Self {
        Self(serde_json::Value::String(text))
    }
}

impl From<serde_json::Value> for DiffPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Document returned by a successful restore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoredDocument {
    /// Full document body at the new version
    pub dashboard: serde_json::Value,
    /// Host metadata for the document
    #[serde(default)]
    pub meta: serde_json::Value,
    /// Version created by the restore
    pub version: u32,
}

impl RestoredDocument {
    /// Document id carried by the restored body, if any
    pub fn document_id(&self) -> Option<i64> {
        self.dashboard.get("id").and_then(serde_json::Value::as_i64)
    }
}

/// Pagination cursor for the revision log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    /// Offset of the first revision to fetch
    pub start: usize,
    /// Maximum number of revisions per page
    pub limit: usize,
    /// Column the backend orders by
    pub order_by: String,
}

impl PageCursor {
    /// First page with the given limit and ordering
    pub fn first(limit: usize, order_by: impl Into<String>) -> Self {
        Self {
            start: 0,
            limit,
            order_by: order_by.into(),
        }
    }

    /// Cursor for the page after this one
    pub fn next(&self) -> Self {
        Self {
            start: self.start + self.limit,
            ..self.clone()
        }
    }
}
