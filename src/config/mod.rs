//! Layered configuration: defaults, then `config/default.*`, then
//! `MOUSTIQUE__SECTION__KEY` environment variables.

mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{ClientSettings, LoggingSettings, ServerSettings, Settings};

/// Loads the configuration from the default file and environment variables
/// and merges it over the default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("MOUSTIQUE")
                .prefix_separator("__")
                .separator("__"),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let settings = merge(partial, Settings::default());

    if settings.client.pickup_interval_ms == 0 {
        return Err(ConfigError::Message(
            "client.pickup_interval_ms must be greater than zero".to_string(),
        ));
    }
    Ok(settings)
}

fn merge(partial: PartialSettings, default: Settings) -> Settings {
    let server = partial.server;
    let client = partial.client;
    let logging = partial.logging;

    Settings {
        server: ServerSettings {
            host: server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        client: ClientSettings {
            name: client
                .as_ref()
                .and_then(|c| c.name.clone())
                .unwrap_or(default.client.name),
            username: client
                .as_ref()
                .and_then(|c| c.username.clone())
                .or(default.client.username),
            password: client
                .as_ref()
                .and_then(|c| c.password.clone())
                .or(default.client.password),
            timeout_secs: client
                .as_ref()
                .and_then(|c| c.timeout_secs)
                .unwrap_or(default.client.timeout_secs),
            pickup_interval_ms: client
                .as_ref()
                .and_then(|c| c.pickup_interval_ms)
                .unwrap_or(default.client.pickup_interval_ms),
        },
        logging: LoggingSettings {
            level: logging
                .and_then(|l| l.level)
                .unwrap_or(default.logging.level),
        },
    }
}

#[cfg(test)]
mod tests;
