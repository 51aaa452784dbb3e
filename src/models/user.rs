use serde::{Deserialize, Serialize};

/// Persisted record for one user in the credential file.
///
/// `storage_key` decouples the on-disk directory name from the raw email:
/// directories are named by this key, never by untrusted identity strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub password_hash: String,
    pub storage_key: String,
}

/// Request body for `/api/signup` and `/api/login`.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}
