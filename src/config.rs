use std::collections::BTreeMap;

use secrecy::SecretString;

use crate::env::Environment;
use crate::error::ConfigError;

pub const BLOWFISH_SECRET_VAR: &str = "BLOWFISH_SECRET";

/// Path the application is served under, appended to the request host.
pub const BASE_PATH: &str = "/phpmyadmin/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Cookie,
    Http,
    Config,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Cookie => "cookie",
            AuthType::Http => "http",
            AuthType::Config => "config",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorReportPolicy {
    Ask,
    Always,
    Never,
}

impl ErrorReportPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorReportPolicy::Ask => "ask",
            ErrorReportPolicy::Always => "always",
            ErrorReportPolicy::Never => "never",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ExportMethod {
    #[serde(rename = "quick")]
    Quick,
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "custom-no-form")]
    CustomNoForm,
}

impl ExportMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMethod::Quick => "quick",
            ExportMethod::Custom => "custom",
            ExportMethod::CustomNoForm => "custom-no-form",
        }
    }
}

/// Secondary connection used for saved queries, bookmarks and designer
/// storage. Left empty, which keeps those features off.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ControlConnection {
    #[serde(rename = "controlhost")]
    pub host: String,
    #[serde(rename = "controlport")]
    pub port: String,
    #[serde(rename = "controluser")]
    pub user: String,
    #[serde(rename = "controlpass")]
    pub pass: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Server {
    pub auth_type: AuthType,
    pub host: String,
    pub port: u16,
    pub compress: bool,
    #[serde(rename = "AllowNoPassword")]
    pub allow_no_password: bool,
    #[serde(flatten)]
    pub control: ControlConnection,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            auth_type: AuthType::Cookie,
            host: "mariadb".to_string(),
            port: 3306,
            compress: false,
            allow_no_password: false,
            control: ControlConnection::default(),
        }
    }
}

fn default_charset() -> String {
    "utf-8".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImportSettings {
    pub charset: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            charset: default_charset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExportSettings {
    pub charset: String,
    pub method: ExportMethod,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            charset: default_charset(),
            method: ExportMethod::Quick,
        }
    }
}

fn redact<S: serde::Serializer>(_: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("********")
}

/// Startup configuration handed to phpMyAdmin.
///
/// Only built through [`ServerConfig::load`], which refuses to produce a
/// value without a usable secret. Fields are public for reading; the record
/// is shared behind an `Arc` once loaded and never changed.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConfig {
    pub servers: BTreeMap<u32, Server>,
    pub upload_dir: String,
    pub save_dir: String,
    #[serde(rename = "blowfish_secret", serialize_with = "redact")]
    pub blowfish_secret: SecretString,
    pub default_lang: String,
    pub server_default: u32,
    pub max_rows: u32,
    pub exec_time_limit: u32,
    pub send_error_reports: ErrorReportPolicy,
    pub theme_default: String,
    pub login_cookie_validity: u32,
    pub allow_third_party_framing: bool,
    pub allow_arbitrary_server: bool,
    pub navigation_tree_enable_grouping: bool,
    pub show_stats: bool,
    pub show_php_info: bool,
    pub import: ImportSettings,
    pub export: ExportSettings,
}

impl ServerConfig {
    /// Validates the shared secret and assembles the fixed configuration.
    ///
    /// Nothing else is read from `env`. A missing, empty or whitespace-only
    /// secret fails before any other field is built.
    pub fn load(env: &impl Environment) -> Result<Self, ConfigError> {
        let secret = env
            .var(BLOWFISH_SECRET_VAR)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret {
                var: BLOWFISH_SECRET_VAR,
            })?;

        Ok(Self::with_secret(SecretString::from(secret)))
    }

    fn with_secret(blowfish_secret: SecretString) -> Self {
        Self {
            servers: BTreeMap::from([(1, Server::default())]),
            upload_dir: String::new(),
            save_dir: String::new(),
            blowfish_secret,
            default_lang: "en".to_string(),
            server_default: 1,
            max_rows: 50,
            exec_time_limit: 300,
            send_error_reports: ErrorReportPolicy::Never,
            theme_default: "pmahomme".to_string(),
            login_cookie_validity: 1440,
            allow_third_party_framing: false,
            allow_arbitrary_server: false,
            navigation_tree_enable_grouping: true,
            show_stats: true,
            show_php_info: false,
            import: ImportSettings::default(),
            export: ExportSettings::default(),
        }
    }

    /// The server selected by `ServerDefault`.
    pub fn default_server(&self) -> Option<&Server> {
        self.servers.get(&self.server_default)
    }
}

/// Externally visible base URL for a request that arrived with `host`.
pub fn absolute_uri(host: &str) -> String {
    format!("http://{}{}", host, BASE_PATH)
}

/// What a single request sees: the loaded config plus its own base URL.
#[derive(Debug, serde::Serialize)]
pub struct ConfigView<'a> {
    #[serde(flatten)]
    pub config: &'a ServerConfig,
    #[serde(rename = "PmaAbsoluteUri", skip_serializing_if = "Option::is_none")]
    pub pma_absolute_uri: Option<String>,
}

impl<'a> ConfigView<'a> {
    pub fn new(config: &'a ServerConfig, host: Option<&str>) -> Self {
        Self {
            config,
            pma_absolute_uri: host.map(absolute_uri),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env_with(secret: Option<&str>) -> HashMap<String, String> {
        let mut env = HashMap::new();
        if let Some(secret) = secret {
            env.insert(BLOWFISH_SECRET_VAR.to_string(), secret.to_string());
        }
        env
    }

    #[test]
    fn load_keeps_secret_verbatim() {
        for secret in ["abc123", " padded ", "x", "ünïcødé-секрет", "a'b\\c"] {
            let config = ServerConfig::load(&env_with(Some(secret))).unwrap();
            assert_eq!(config.blowfish_secret.expose_secret(), secret);
        }
    }

    #[test]
    fn load_fails_without_secret() {
        let missing = ConfigError::MissingSecret {
            var: BLOWFISH_SECRET_VAR,
        };
        assert_eq!(ServerConfig::load(&env_with(None)).unwrap_err(), missing);
        assert_eq!(ServerConfig::load(&env_with(Some(""))).unwrap_err(), missing);
        assert_eq!(
            ServerConfig::load(&env_with(Some(" \t\n"))).unwrap_err(),
            missing
        );
    }

    #[test]
    fn missing_secret_message_tells_operator_what_to_set() {
        let err = ServerConfig::load(&env_with(None)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "BLOWFISH_SECRET environment variable is required, set it in .env!"
        );
    }

    #[test]
    fn fixed_fields_do_not_depend_on_secret() {
        for secret in ["abc123", "something else entirely"] {
            let config = ServerConfig::load(&env_with(Some(secret))).unwrap();
            assert_eq!(config.server_default, 1);
            let server = config.default_server().unwrap();
            assert_eq!(server.auth_type, AuthType::Cookie);
            assert_eq!(server.auth_type.as_str(), "cookie");
        }
    }

    #[test]
    fn abc123_scenario() {
        let config = ServerConfig::load(&env_with(Some("abc123"))).unwrap();
        assert_eq!(config.blowfish_secret.expose_secret(), "abc123");

        assert_eq!(config.servers.len(), 1);
        let server = &config.servers[&1];
        assert_eq!(server.port, 3306);
        assert_eq!(server.host, "mariadb");
        assert!(!server.compress);
        assert!(!server.allow_no_password);
        assert_eq!(server.control, ControlConnection::default());

        assert_eq!(config.upload_dir, "");
        assert_eq!(config.save_dir, "");
        assert_eq!(config.default_lang, "en");
        assert_eq!(config.max_rows, 50);
        assert_eq!(config.exec_time_limit, 300);
        assert_eq!(config.send_error_reports, ErrorReportPolicy::Never);
        assert_eq!(config.theme_default, "pmahomme");
        assert_eq!(config.login_cookie_validity, 1440);
        assert!(!config.allow_third_party_framing);
        assert!(!config.allow_arbitrary_server);
        assert!(config.navigation_tree_enable_grouping);
        assert!(config.show_stats);
        assert!(!config.show_php_info);
        assert_eq!(config.import.charset, "utf-8");
        assert_eq!(config.export.charset, "utf-8");
        assert_eq!(config.export.method, ExportMethod::Quick);
    }

    #[test]
    fn absolute_uri_wraps_host() {
        assert_eq!(absolute_uri("localhost"), "http://localhost/phpmyadmin/");
        assert_eq!(
            absolute_uri("db.example.org:8443"),
            "http://db.example.org:8443/phpmyadmin/"
        );
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = ServerConfig::load(&env_with(Some("abc123"))).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("abc123"));
    }

    #[test]
    fn view_serializes_native_keys() {
        let config = ServerConfig::load(&env_with(Some("abc123"))).unwrap();
        let value = serde_json::to_value(ConfigView::new(&config, Some("example.com"))).unwrap();

        assert_eq!(value["Servers"]["1"]["auth_type"], "cookie");
        assert_eq!(value["Servers"]["1"]["port"], 3306);
        assert_eq!(value["Servers"]["1"]["AllowNoPassword"], false);
        assert_eq!(value["Servers"]["1"]["controluser"], "");
        assert_eq!(value["ServerDefault"], 1);
        assert_eq!(value["SendErrorReports"], "never");
        assert_eq!(value["Export"]["method"], "quick");
        assert_eq!(value["blowfish_secret"], "********");
        assert_eq!(value["PmaAbsoluteUri"], "http://example.com/phpmyadmin/");

        let without_host = serde_json::to_value(ConfigView::new(&config, None)).unwrap();
        assert!(without_host.get("PmaAbsoluteUri").is_none());
    }
}
