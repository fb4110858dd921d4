//! Remote collection items.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One file of a remote item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Declared language, as reported by the service. `None` when unknown.
    #[serde(default)]
    pub language: Option<String>,
    /// URL of the raw file body.
    pub raw_url: String,
}

/// A snippet item from the remote collection.
///
/// Items are immutable snapshots fetched once per sync pass. File order
/// follows the service's listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Service-assigned identifier.
    pub id: String,
    /// Free-text description; the service sends `null` when blank.
    #[serde(default)]
    pub description: Option<String>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Browser URL of the item.
    #[serde(default)]
    pub html_url: String,
    /// Whether the item is publicly listed.
    #[serde(default = "default_public")]
    pub public: bool,
    /// Files keyed by filename.
    #[serde(default)]
    pub files: IndexMap<String, RemoteFile>,
}

fn default_public() -> bool {
    true
}

impl RemoteItem {
    /// Creates an item with no description and no files.
    pub fn new(id: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            description: None,
            updated_at,
            html_url: String::new(),
            public: true,
            files: IndexMap::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the browser URL.
    #[must_use]
    pub fn with_html_url(mut self, url: impl Into<String>) -> Self {
        self.html_url = url.into();
        self
    }

    /// Appends a file.
    #[must_use]
    pub fn with_file(
        mut self,
        filename: impl Into<String>,
        language: Option<&str>,
        raw_url: impl Into<String>,
    ) -> Self {
        self.files.insert(
            filename.into(),
            RemoteFile {
                language: language.map(str::to_owned),
                raw_url: raw_url.into(),
            },
        );
        self
    }

    /// Title of the local node mirroring this item.
    ///
    /// The description when it is not blank, else the first filename,
    /// else the item ID.
    #[must_use]
    pub fn title(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .or_else(|| self.files.keys().next().map(String::as_str))
            .unwrap_or(&self.id)
    }
}
