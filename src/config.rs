use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::GeoError;
use crate::models::{BoundingBox, Coordinate, DecisionBands, ServiceArea};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub service_area: ServiceAreaSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub inference: InferenceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

/// The single serviceable area this process answers for
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAreaSettings {
    pub name: String,
    pub city: Option<String>,
    #[serde(default)]
    pub pincodes: Vec<String>,
    #[serde(default)]
    pub landmarks: Vec<String>,
    pub boundary_description: Option<String>,
    pub bounding_box: Option<BoundingBox>,
    pub center: Option<Coordinate>,
    #[serde(default = "default_service_radius_km")]
    pub service_radius_km: f64,
    /// Cap for the `radius` field on nearby requests, 10 km when unset
    pub max_radius_km: Option<f64>,
}

fn default_service_radius_km() -> f64 { 5.0 }

impl ServiceAreaSettings {
    /// Validate and freeze into the runtime [`ServiceArea`]
    pub fn build(&self) -> Result<ServiceArea, GeoError> {
        if let Some(center) = self.center {
            Coordinate::new(center.latitude, center.longitude)
                .map_err(|e| GeoError::InvalidConfig(format!("service_area.center: {}", e)))?;
        }

        Ok(ServiceArea::new(
            self.name.clone(),
            self.pincodes.iter().cloned(),
            self.landmarks.clone(),
            self.bounding_box,
            self.center,
            self.service_radius_km,
        )?
        .with_city(self.city.clone())
        .with_boundary_description(self.boundary_description.clone())
        .with_max_radius_km(self.max_radius_km)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub bands: DecisionBands,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Vertex,
    #[default]
    Disabled,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceSettings {
    #[serde(default)]
    pub provider: ProviderKind,
    pub endpoint: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    #[serde(default = "default_location")]
    pub location: String,
    pub access_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Ask the provider for qualitative insight text on nearby/statistics calls
    #[serde(default = "default_true")]
    pub insights: bool,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            endpoint: None,
            model: default_model(),
            api_key: None,
            project_id: None,
            location: default_location(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            insights: true,
        }
    }
}

fn default_model() -> String { "gemini-2.0-flash".to_string() }
fn default_location() -> String { "us-central1".to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_temperature() -> f32 { 0.4 }
fn default_max_output_tokens() -> u32 { 1024 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with LOCALLOOP_)
    /// 4. Well-known variables: HOST, PORT, GEMINI_API_KEY, VERTEX_ACCESS_TOKEN,
    ///    GCP_PROJECT_ID, GCP_LOCATION
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with LOCALLOOP_)
            // e.g., LOCALLOOP__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("LOCALLOOP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LOCALLOOP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the plain environment variables the deployment scripts set
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    const OVERRIDES: [(&str, &str); 6] = [
        ("HOST", "server.host"),
        ("PORT", "server.port"),
        ("GEMINI_API_KEY", "inference.api_key"),
        ("VERTEX_ACCESS_TOKEN", "inference.access_token"),
        ("GCP_PROJECT_ID", "inference.project_id"),
        ("GCP_LOCATION", "inference.location"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in OVERRIDES {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
