use std::{collections::HashMap, path::PathBuf};

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use tokio::fs as async_fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::errors::AppError;
use crate::models::user::UserRecord;

/// Persists the email -> user record map as a single JSON file.
///
/// Every mutation is a whole-file read-modify-write, so a single mutex covers
/// both halves. Without it, two concurrent signups for the same email could
/// both pass the existence check and one registration would be silently lost.
#[derive(Debug)]
pub struct CredentialStore {
    users_file: PathBuf,
    write_lock: Mutex<()>,
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| AppError::internal_error(format!("Failed to generate salt: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::internal_error(format!("Failed to encode salt: {}", e)))?;

    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else {
        false
    }
}

impl CredentialStore {
    pub fn new(users_file: impl Into<PathBuf>) -> Self {
        Self {
            users_file: users_file.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_users(&self) -> Result<HashMap<String, UserRecord>, AppError> {
        if !self.users_file.exists() {
            return Ok(HashMap::new());
        }

        let data = async_fs::read(&self.users_file)
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to read users file: {}", e)))?;

        serde_json::from_slice(&data)
            .map_err(|e| AppError::storage_failed(format!("Failed to parse users file: {}", e)))
    }

    /// Writes the whole map atomically: temp file in the same directory, then
    /// rename over the target. A crash mid-write never corrupts the store.
    async fn write_users(&self, users: &HashMap<String, UserRecord>) -> Result<(), AppError> {
        if let Some(dir) = self.users_file.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                async_fs::create_dir_all(dir).await.map_err(|e| {
                    AppError::storage_failed(format!("Failed to create users directory: {}", e))
                })?;
            }
        }

        let data = serde_json::to_vec_pretty(users)
            .map_err(|e| AppError::internal_error(format!("Failed to serialize users: {}", e)))?;

        let tmp_path = self.users_file.with_extension("json.tmp");
        async_fs::write(&tmp_path, &data)
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to write users file: {}", e)))?;
        async_fs::rename(&tmp_path, &self.users_file)
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to replace users file: {}", e)))
    }

    /// Registers a new user. Fails with `AlreadyExists` if the email is taken.
    ///
    /// Returns the stored record so the caller can create the user's upload
    /// directory from the freshly assigned storage key.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<UserRecord, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut users = self.read_users().await?;
        if users.contains_key(email) {
            return Err(AppError::AlreadyExists);
        }

        let record = UserRecord {
            password_hash: hash_password(password)?,
            storage_key: Uuid::new_v4().to_string(),
        };
        users.insert(email.to_string(), record.clone());
        self.write_users(&users).await?;

        tracing::info!("Created user: {}", email);
        Ok(record)
    }

    /// Checks a login attempt. A missing user and a wrong password produce the
    /// same `InvalidCredentials` error.
    pub async fn verify(&self, email: &str, password: &str) -> Result<UserRecord, AppError> {
        let users = self.read_users().await?;

        let record = users.get(email).ok_or(AppError::InvalidCredentials)?;
        if !verify_password(&record.password_hash, password) {
            return Err(AppError::InvalidCredentials);
        }

        Ok(record.clone())
    }

    /// Looks up the storage key for an already-authenticated user.
    pub async fn storage_key(&self, email: &str) -> Result<String, AppError> {
        let users = self.read_users().await?;
        users
            .get(email)
            .map(|r| r.storage_key.clone())
            .ok_or(AppError::InvalidCredentials)
    }
}
