use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub otp: OtpSettings,
    #[serde(default)]
    pub uploads: UploadsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 4200, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: true,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }

/// JWT signing and account defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,
    #[serde(default = "default_avatar_url")]
    pub default_avatar_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
            default_avatar_url: default_avatar_url(),
        }
    }
}

fn default_access_ttl() -> u64 { 24 * 60 * 60 }
fn default_refresh_ttl() -> u64 { 7 * 24 * 60 * 60 }
fn default_avatar_url() -> String { "/uploads/defaultAvatar.jpg".into() }

/// One-time code issuance and delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpSettings {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_otp_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub sms: SmsSettings,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            ttl_secs: default_otp_ttl(),
            max_attempts: default_max_attempts(),
            sms: SmsSettings::default(),
        }
    }
}

fn default_code_length() -> usize { 6 }
fn default_otp_ttl() -> u64 { 300 }
fn default_max_attempts() -> u32 { 5 }

/// SMS gateway endpoint. Without an endpoint codes are only written to the log.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_sms_timeout")]
    pub timeout_secs: u64,
}

impl Default for SmsSettings {
    fn default() -> Self {
        Self { endpoint: None, api_key: None, sender: default_sender(), timeout_secs: default_sms_timeout() }
    }
}

fn default_sender() -> String { "CarWash".into() }
fn default_sms_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self { dir: default_uploads_dir(), public_prefix: default_public_prefix() }
    }
}

fn default_uploads_dir() -> String { "uploads".into() }
fn default_public_prefix() -> String { "/uploads".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Same as [`AppConfig::load_and_validate`] but falls back to defaults plus
    /// environment variables when the config file is missing.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => {
                let mut cfg = AppConfig::default();
                cfg.server.normalize_from_env();
                cfg
            }
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.otp.normalize_from_env();
        self.otp.validate()?;
        self.uploads.normalize_from_env();
        self.uploads.validate()?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }

    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // TOML wins; DATABASE_URL only fills a missing url
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthSettings {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.access_ttl_secs == 0 || self.refresh_ttl_secs == 0 {
            return Err(anyhow!("auth token ttls must be positive seconds"));
        }
        if self.refresh_ttl_secs < self.access_ttl_secs {
            return Err(anyhow!("auth.refresh_ttl_secs must be >= access_ttl_secs"));
        }
        Ok(())
    }
}

impl OtpSettings {
    pub fn normalize_from_env(&mut self) {
        if self.sms.endpoint.is_none() {
            self.sms.endpoint = std::env::var("SMS_ENDPOINT").ok().filter(|v| !v.trim().is_empty());
        }
        if self.sms.api_key.is_none() {
            self.sms.api_key = std::env::var("SMS_API_KEY").ok().filter(|v| !v.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(4..=8).contains(&self.code_length) {
            return Err(anyhow!("otp.code_length must be in 4..=8"));
        }
        if self.ttl_secs == 0 {
            return Err(anyhow!("otp.ttl_secs must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(anyhow!("otp.max_attempts must be >= 1"));
        }
        if let Some(endpoint) = &self.sms.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(anyhow!("otp.sms.endpoint must start with http(s)"));
            }
        }
        Ok(())
    }
}

impl UploadsConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var("UPLOADS_DIR") {
            if !dir.trim().is_empty() {
                self.dir = dir;
            }
        }
        let trimmed = self.public_prefix.trim_end_matches('/');
        self.public_prefix = trimmed.to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.dir.trim().is_empty() {
            return Err(anyhow!("uploads.dir is empty"));
        }
        if !self.public_prefix.starts_with('/') || self.public_prefix.len() < 2 {
            return Err(anyhow!("uploads.public_prefix must start with '/' and name a path"));
        }
        Ok(())
    }
}
