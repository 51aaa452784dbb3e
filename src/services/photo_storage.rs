use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use tokio::fs as async_fs;
use tokio::sync::Mutex;

use crate::models::errors::AppError;
use crate::models::photo::PhotoEntry;

/// Per-user photo directories under a single uploads root.
///
/// Directories are named by the user's storage key, not their email, so no
/// untrusted identity string ever becomes part of a filesystem path.
#[derive(Debug)]
pub struct PhotoStorage {
    uploads_dir: PathBuf,
    // Serializes writes within one user's directory. Distinct users never
    // contend with each other.
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Reduces a client-supplied filename to a safe single path segment.
///
/// Path separators and anything outside a conservative character set are
/// replaced; a name that reduces to nothing (or was pure traversal like
/// `..`) is rejected outright.
fn sanitize_file_name(original: &str) -> Result<String, AppError> {
    // Keep only the final path segment of whatever the client sent.
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        return Err(AppError::validation_failed("Invalid file name"));
    }
    Ok(cleaned)
}

/// Validates a stored name supplied by the client for delete. Unlike upload
/// names these must match exactly, so anything that even looks like it could
/// escape the directory is refused rather than normalized.
fn validate_stored_name(name: &str) -> Result<(), AppError> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(AppError::validation_failed("Invalid photo name"));
    }
    Ok(())
}

impl PhotoStorage {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let uploads_dir = uploads_dir.into();

        if !uploads_dir.exists() {
            fs::create_dir_all(&uploads_dir).map_err(|e| {
                AppError::storage_failed(format!("Failed to create uploads directory: {}", e))
            })?;
        }

        Ok(Self {
            uploads_dir,
            user_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    fn user_dir(&self, storage_key: &str) -> PathBuf {
        self.uploads_dir.join(storage_key)
    }

    async fn lock_for(&self, storage_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(storage_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Creates the user's directory if it does not exist yet. Idempotent.
    pub async fn ensure_user_dir(&self, storage_key: &str) -> Result<(), AppError> {
        let dir = self.user_dir(storage_key);
        if !dir.exists() {
            async_fs::create_dir_all(&dir).await.map_err(|e| {
                AppError::storage_failed(format!("Failed to create user directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Writes `data` into the user's directory under a generated name:
    /// epoch-millis prefix plus the sanitized original name, with a counter
    /// suffix if that exact name is somehow already taken.
    pub async fn store(
        &self,
        storage_key: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, AppError> {
        let safe_name = sanitize_file_name(original_name)?;

        let lock = self.lock_for(storage_key).await;
        let _guard = lock.lock().await;

        self.ensure_user_dir(storage_key).await?;
        let dir = self.user_dir(storage_key);

        let millis = Utc::now().timestamp_millis();
        let mut stored_name = format!("{}-{}", millis, safe_name);
        let mut attempt = 1;
        while dir.join(&stored_name).exists() {
            stored_name = format!("{}-{}-{}", millis, attempt, safe_name);
            attempt += 1;
        }

        let file_path = dir.join(&stored_name);
        async_fs::write(&file_path, data)
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to write photo: {}", e)))?;

        tracing::debug!("Stored photo {} for key {}", stored_name, storage_key);
        Ok(stored_name)
    }

    /// Lists the user's photos, most recently modified first. A user whose
    /// directory does not exist yet simply has no photos.
    pub async fn list(&self, storage_key: &str) -> Result<Vec<PhotoEntry>, AppError> {
        let dir = self.user_dir(storage_key);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = async_fs::read_dir(&dir)
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to read user directory: {}", e)))?;

        let mut photos = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to read directory entry: {}", e)))?
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };

            let metadata = entry
                .metadata()
                .await
                .map_err(|e| AppError::storage_failed(format!("Failed to read metadata: {}", e)))?;
            let modified = metadata
                .modified()
                .map_err(|e| AppError::storage_failed(format!("Failed to read mtime: {}", e)))?;

            photos.push(PhotoEntry {
                url: format!("/uploads/{}/{}", storage_key, name),
                name,
                date: DateTime::<Utc>::from(modified),
            });
        }

        photos.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(photos)
    }

    /// Deletes one stored photo. The name is validated before any path is
    /// composed, so a crafted name can never reach outside the user's
    /// directory. Rejected names report as `NotFound` like any other missing
    /// photo.
    pub async fn delete(&self, storage_key: &str, name: &str) -> Result<(), AppError> {
        validate_stored_name(name).map_err(|_| AppError::NotFound)?;

        let lock = self.lock_for(storage_key).await;
        let _guard = lock.lock().await;

        let file_path = self.user_dir(storage_key).join(name);
        if !file_path.is_file() {
            return Err(AppError::NotFound);
        }

        async_fs::remove_file(&file_path)
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to delete photo: {}", e)))?;

        tracing::debug!("Deleted photo {} for key {}", name, storage_key);
        Ok(())
    }
}
