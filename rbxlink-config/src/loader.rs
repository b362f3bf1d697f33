use once_cell::sync::Lazy;
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;
use url::Url;

use super::{
    error::ConfigLoadError,
    models::{
        Config, ConfigMetadata, DEFAULT_SESSION_PATH, DEFAULT_STORE_PATH,
        DEFAULT_WEBHOOK_TIMEOUT, NotificationConfig, SessionConfig, StoreConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("rbxlink.toml"),
        PathBuf::from("config/rbxlink.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Use these values instead of reading `.env` and the process environment.
    pub env: Option<EnvConfig>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

/// A validated configuration plus anything worth telling the operator.
#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (env_config, env_file_loaded) = match &self.options.env {
            Some(env) => (env.clone(), false),
            None => {
                let loaded = self.load_env_file()?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;
        let config_present = config_path.is_some();

        let config = compose_config(
            file_config.unwrap_or_default(),
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;

        let mut warnings = ConfigWarnings::default();
        if !config_present {
            warnings.push_with_hint(
                "No rbxlink.toml detected; using environment variables and defaults",
                "Create rbxlink.toml or point RBXLINK_CONFIG at a configuration file",
            );
        }
        warnings.extend(validation::apply_guard_rails(&config)?);

        debug!(
            store = %config.store.path.display(),
            session = %config.session.path.display(),
            webhook = config.notifications.is_webhook_enabled(),
            "configuration loaded"
        );

        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let result = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match result {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let mut source = ConfigPathSource::default();

        if let Some(explicit) = &self.options.config_path {
            source.explicit = Some(explicit.clone());
        } else if let Some(from_env) = &env_config.config_path {
            source.env = Some(from_env.clone());
        } else {
            source.default = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
                .cloned();
        }

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents = fs::read_to_string(&path).map_err(|source| {
            ConfigLoadError::Io {
                path: path.clone(),
                source,
            }
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

/// Environment wins over the file, the file wins over defaults.
fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<Config, ConfigLoadError> {
    let store = StoreConfig {
        path: env
            .store_path
            .or(file.store.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
    };

    let session = SessionConfig {
        path: env
            .session_path
            .or(file.session.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH)),
    };

    let webhook_url = env
        .webhook_url
        .or(file.notifications.webhook_url)
        .map(|raw| parse_webhook_url(&raw))
        .transpose()?;

    let timeout = env
        .webhook_timeout
        .or(file.notifications.timeout)
        .map(|raw| parse_timeout(&raw))
        .transpose()?
        .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT);

    Ok(Config {
        metadata,
        store,
        session,
        notifications: NotificationConfig {
            webhook_url,
            timeout,
        },
    })
}

fn parse_webhook_url(raw: &str) -> Result<Url, ConfigLoadError> {
    Url::parse(raw).map_err(|source| ConfigLoadError::InvalidWebhookUrl {
        value: raw.to_string(),
        source,
    })
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw).map_err(|source| {
        ConfigLoadError::InvalidTimeout {
            value: raw.to_string(),
            source,
        }
    })
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        self.default
            .clone()
            .map(|path| (path, ConfigPathProvenance::Default))
    }
}

#[derive(Debug, Clone, Copy)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(
            self,
            ConfigPathProvenance::Explicit | ConfigPathProvenance::Env
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_file_values() {
        let file: FileConfig = toml::from_str(
            "[store]\npath = \"from-file.json\"\n[notifications]\ntimeout = \"10s\"\n",
        )
        .unwrap();
        let env = EnvConfig {
            store_path: Some(PathBuf::from("from-env.json")),
            ..EnvConfig::default()
        };

        let config = compose_config(file, env, ConfigMetadata::default()).unwrap();

        assert_eq!(config.store.path, PathBuf::from("from-env.json"));
        assert_eq!(config.session.path, PathBuf::from(DEFAULT_SESSION_PATH));
        assert_eq!(config.notifications.timeout, Duration::from_secs(10));
    }

    #[test]
    fn malformed_values_name_the_offender() {
        let env = EnvConfig {
            webhook_timeout: Some("soon".into()),
            ..EnvConfig::default()
        };
        let err =
            compose_config(FileConfig::default(), env, ConfigMetadata::default())
                .unwrap_err();
        assert!(matches!(err, ConfigLoadError::InvalidTimeout { ref value, .. } if value == "soon"));

        let env = EnvConfig {
            webhook_url: Some("not a url".into()),
            ..EnvConfig::default()
        };
        let err =
            compose_config(FileConfig::default(), env, ConfigMetadata::default())
                .unwrap_err();
        assert!(matches!(err, ConfigLoadError::InvalidWebhookUrl { .. }));
    }
}
