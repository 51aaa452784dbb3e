use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a `/api/photos` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoEntry {
    /// Stored filename within the owner's directory.
    pub name: String,
    /// Path the photo is served from, e.g. `/uploads/<storage_key>/<name>`.
    pub url: String,
    /// Last-modified time of the stored file.
    pub date: DateTime<Utc>,
}
