use serde::Deserialize;

pub const DEFAULT_LOGIN_PATH: &str = "/music-connect/login";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_form_size")]
    pub max_form_size: usize,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthBackendKind {
    Http,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub backend: AuthBackendKind,
    #[serde(default)]
    pub base_url: String,
    // None keeps requests unbounded
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

// Navigation targets used by the components
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RoutesConfig {
    #[serde(default = "default_home")]
    pub home: String,
    #[serde(default = "default_login")]
    pub login: String,
    #[serde(default = "default_account")]
    pub account: String,
    #[serde(default = "default_change_password")]
    pub change_password: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            login: default_login(),
            account: default_account(),
            change_password: default_change_password(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    // Prefix of the persistent cookies standing in for local storage
    #[serde(default = "default_local_prefix")]
    pub local_prefix: String,
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_prefix: default_local_prefix(),
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HeaderConfig {
    // Disable every logout-dialog action while one of them is running
    #[serde(default)]
    pub exclusive_logout_actions: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_max_form_size() -> usize {
    64 * 1024
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_home() -> String {
    "/".to_string()
}

fn default_login() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_account() -> String {
    "/account".to_string()
}

fn default_change_password() -> String {
    "/forgot-password".to_string()
}

fn default_local_prefix() -> String {
    "ls_".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config/default")
    }

    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_file_gets_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[auth]
backend = "memory"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.auth.backend, AuthBackendKind::Memory);
        assert_eq!(config.auth.request_timeout_secs, None);
        assert_eq!(config.routes, RoutesConfig::default());
        assert_eq!(config.routes.login, "/music-connect/login");
        assert_eq!(config.storage.local_prefix, "ls_");
        assert!(!config.header.exclusive_logout_actions);
    }

    #[test]
    fn shipped_defaults_use_http_without_timeout() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default");
        let config = Config::load_from(path).unwrap();
        assert_eq!(config.auth.backend, AuthBackendKind::Http);
        assert_eq!(config.auth.request_timeout_secs, None);
        assert!(!config.header.exclusive_logout_actions);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 3000

[auth]
backend = "http"
base_url = "http://auth.internal/api"
request_timeout_secs = 5

[routes]
login = "/login"

[header]
exclusive_logout_actions = true
"#
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.auth.backend, AuthBackendKind::Http);
        assert_eq!(config.auth.request_timeout_secs, Some(5));
        assert_eq!(config.routes.login, "/login");
        assert_eq!(config.routes.home, "/");
        assert!(config.header.exclusive_logout_actions);
    }
}
