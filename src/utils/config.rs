use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub uploads_dir: String,
    pub users_file: String,
    pub max_file_size: usize,
    pub session_ttl_seconds: u64,
    /// Set the `Secure` attribute on session cookies. Off by default for
    /// local development; must be enabled when serving behind TLS.
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            uploads_dir: "uploads".to_string(),
            users_file: "users.json".to_string(),
            max_file_size: 10 * 1024 * 1024, // 10MB
            session_ttl_seconds: 24 * 60 * 60,
            cookie_secure: false,
            cors_origins: vec!["*".to_string()],
            request_timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                config.port = port_num;
            }
        }

        if let Ok(dir) = env::var("UPLOADS_DIR") {
            config.uploads_dir = dir;
        }

        if let Ok(file) = env::var("USERS_FILE") {
            config.users_file = file;
        }

        if let Ok(max_size) = env::var("MAX_FILE_SIZE") {
            if let Ok(size) = max_size.parse::<usize>() {
                config.max_file_size = size;
            }
        }

        if let Ok(ttl) = env::var("SESSION_TTL_SECONDS") {
            if let Ok(ttl_num) = ttl.parse::<u64>() {
                config.session_ttl_seconds = ttl_num;
            }
        }

        if let Ok(secure) = env::var("COOKIE_SECURE") {
            config.cookie_secure = matches!(secure.as_str(), "1" | "true" | "yes");
        }

        if let Ok(origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = origins.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECONDS") {
            if let Ok(timeout_num) = timeout.parse::<u64>() {
                config.request_timeout_seconds = timeout_num;
            }
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
