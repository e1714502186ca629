use serde::Deserialize;

/// Top-level configuration for the client and the `moustique` binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

/// Where the messaging server listens.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// How this client presents itself and how it polls.
#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    /// Empty means "generate one".
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
    pub pickup_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub client: Option<PartialClientSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialClientSettings {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub pickup_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 33335,
            },
            client: ClientSettings {
                name: String::new(),
                username: None,
                password: None,
                timeout_secs: 10,
                pickup_interval_ms: 1000,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
