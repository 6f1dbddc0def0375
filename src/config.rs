use crate::geofence::Geofence;

pub const FEED_VARIABLE: &str = "OVERFLIGHTS_FEED";
pub const MIN_LATITUDE_VARIABLE: &str = "OVERFLIGHTS_MIN_LAT";
pub const MAX_LATITUDE_VARIABLE: &str = "OVERFLIGHTS_MAX_LAT";
pub const MIN_LONGITUDE_VARIABLE: &str = "OVERFLIGHTS_MIN_LON";
pub const MAX_LONGITUDE_VARIABLE: &str = "OVERFLIGHTS_MAX_LON";

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ApplicationConfig {
    pub feed: FeedConfig,
    pub geofence: GeofenceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ApplicationConfig {
    /// Reads the TOML file, then applies `OVERFLIGHTS_*` environment overrides.
    pub fn construct_from_path(
        path: &std::path::PathBuf,
    ) -> Result<ApplicationConfig, errors::ApplicationConfigError> {
        let string =
            std::fs::read_to_string(path).map_err(|error| errors::ApplicationConfigError::Io {
                source: error,
                path: path.clone(),
            })?;

        let mut config: ApplicationConfig =
            toml::from_str(&string).map_err(|error| errors::ApplicationConfigError::Parse {
                source: error,
                path: path.clone(),
            })?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), errors::ApplicationConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(FEED_VARIABLE) {
            self.feed = FeedConfig::from_address(&value).ok_or_else(|| {
                errors::ApplicationConfigError::InvalidOverride {
                    variable: FEED_VARIABLE,
                    value: value.clone(),
                }
            })?;
        }

        for (variable, target) in [
            (MIN_LATITUDE_VARIABLE, &mut self.geofence.min_latitude),
            (MAX_LATITUDE_VARIABLE, &mut self.geofence.max_latitude),
            (MIN_LONGITUDE_VARIABLE, &mut self.geofence.min_longitude),
            (MAX_LONGITUDE_VARIABLE, &mut self.geofence.max_longitude),
        ] {
            if let Some(value) = lookup(variable) {
                *target = value.trim().parse().map_err(|_| {
                    errors::ApplicationConfigError::InvalidOverride {
                        variable,
                        value: value.clone(),
                    }
                })?;
            }
        }
        Ok(())
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub host: String,
    pub port: u16,
}

impl FeedConfig {
    #[must_use]
    pub fn from_address(address: &str) -> Option<Self> {
        let (host, port) = address.trim().rsplit_once(':')?;
        if host.is_empty() {
            return None;
        }
        Some(FeedConfig {
            host: host.to_string(),
            port: port.parse().ok()?,
        })
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{0}:{1}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeofenceConfig {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl GeofenceConfig {
    pub fn build(&self) -> Result<Geofence, errors::ApplicationConfigError> {
        Geofence::new(
            self.min_latitude,
            self.max_latitude,
            self.min_longitude,
            self.max_longitude,
        )
        .map_err(errors::ApplicationConfigError::Geofence)
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub purge_interval_seconds: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Result<chrono::TimeDelta, errors::ApplicationConfigError> {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .ok_or_else(|| errors::ApplicationConfigError::InvalidSetting {
                setting: "cache.ttl_seconds",
                value: self.ttl_seconds.to_string(),
            })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_seconds: 600,
            purge_interval_seconds: 60,
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolverBackend {
    HolidayExtras,
    FlightAware,
}

/// Whether a failed lookup is attempted again when a later report for the
/// same flight carries its callsign.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    #[default]
    SingleAttempt,
    RetryOnNextReport,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    pub backends: Vec<ResolverBackend>,
    pub timeout_seconds: u64,
    pub workers: usize,
    pub queue_capacity: usize,
    pub policy: ResolutionPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            backends: vec![ResolverBackend::HolidayExtras],
            timeout_seconds: 10,
            workers: 2,
            queue_capacity: 64,
            policy: ResolutionPolicy::SingleAttempt,
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: std::path::PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            database_path: std::path::PathBuf::from("overflights.db"),
        }
    }
}

pub mod errors {
    use crate::geofence::GeofenceError;

    #[derive(Debug)]
    pub enum ApplicationConfigError {
        Parse {
            source: toml::de::Error,
            path: std::path::PathBuf,
        },
        Io {
            source: std::io::Error,
            path: std::path::PathBuf,
        },
        InvalidOverride {
            variable: &'static str,
            value: String,
        },
        InvalidSetting {
            setting: &'static str,
            value: String,
        },
        Geofence(GeofenceError),
    }
    impl std::fmt::Display for ApplicationConfigError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                ApplicationConfigError::Io {
                    source: error,
                    path,
                } => {
                    write!(
                        f,
                        "Failed to read config file '{}': {}",
                        path.display(),
                        error
                    )
                }
                ApplicationConfigError::Parse {
                    source: error,
                    path,
                } => {
                    write!(
                        f,
                        "Failed to parse config file '{}': {}",
                        path.display(),
                        error
                    )
                }
                ApplicationConfigError::InvalidOverride { variable, value } => {
                    write!(f, "Invalid value '{value}' for {variable}")
                }
                ApplicationConfigError::InvalidSetting { setting, value } => {
                    write!(f, "Invalid value '{value}' for {setting}")
                }
                ApplicationConfigError::Geofence(error) => write!(f, "{error}"),
            }
        }
    }
    impl std::error::Error for ApplicationConfigError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                ApplicationConfigError::Io { source: error, .. } => Some(error),
                ApplicationConfigError::Parse { source: error, .. } => Some(error),
                ApplicationConfigError::Geofence(error) => Some(error),
                ApplicationConfigError::InvalidOverride { .. }
                | ApplicationConfigError::InvalidSetting { .. } => None,
            }
        }
    }
}
